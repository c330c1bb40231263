//! Request handlers and routing

use super::error::Result;
use super::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

/// One raw feature row, field names and types mirroring the dataset columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub season: String,
    pub month: i64,
    pub hour: i64,
    pub holiday: bool,
    pub weekday: i64,
    pub workingday: bool,
    pub weather: String,
    pub temp: f64,
    pub feel_temp: f64,
    pub humidity: f64,
    pub windspeed: f64,
}

impl PredictRequest {
    /// Decode into a one-row frame with the dataset's column layout
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        df!(
            "season" => [self.season.as_str()],
            "month" => [self.month],
            "hour" => [self.hour],
            "holiday" => [self.holiday],
            "weekday" => [self.weekday],
            "workingday" => [self.workingday],
            "weather" => [self.weather.as_str()],
            "temp" => [self.temp],
            "feel_temp" => [self.feel_temp],
            "humidity" => [self.humidity],
            "windspeed" => [self.windspeed],
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: f64,
    pub model_kind: String,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>> {
    let frame = request
        .to_frame()
        .map_err(|e| super::ServerError::BadRequest(e.to_string()))?;
    let predictions = state.adapter.predict(&frame)?;
    debug!(prediction = predictions[0], "served prediction");
    Ok(Json(PredictResponse {
        prediction: predictions[0],
        model_kind: state.adapter.kind().to_string(),
    }))
}
