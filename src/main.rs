//! Bikecast - Main Entry Point
//!
//! Training, batch-inference and serving pipeline for bike-sharing demand.

use bikecast::cli::{
    cmd_example_request, cmd_infer, cmd_prepare_data, cmd_serve, cmd_train, Cli, Commands,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bikecast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::PrepareData { quiet } => {
            cmd_prepare_data(cli.config.as_ref(), !quiet)?;
        }
        Commands::Train { model, track } => {
            cmd_train(cli.config.as_ref(), &model, track)?;
        }
        Commands::Infer { model } => {
            cmd_infer(cli.config.as_ref(), &model)?;
        }
        Commands::Serve { model, host, port } => {
            cmd_serve(cli.config.as_ref(), &model, &host, port).await?;
        }
        Commands::ExampleRequest { output } => {
            cmd_example_request(cli.config.as_ref(), &output)?;
        }
    }

    Ok(())
}
