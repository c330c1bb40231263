//! Small shared helpers

use std::process::Command;

/// Current git revision of the working tree, used as a reproducibility tag
/// in tracking runs. Returns `None` outside a git checkout.
pub fn git_revision_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    if hash.is_empty() {
        None
    } else {
        Some(hash.to_string())
    }
}
