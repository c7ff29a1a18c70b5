//! Input validation for controller request bodies.

use regex::Regex;
use runtime_core::Error;
use std::sync::OnceLock;

static WORKER_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn worker_id_pattern() -> &'static Regex {
    WORKER_ID_PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_\-\.]+$").unwrap())
}

/// Allows only alphanumerics, hyphens, underscores, and dots — enough to
/// keep a worker id safe to interpolate into a URL or key-index entry.
pub fn validate_worker_id(id: &str) -> Result<(), Error> {
    if id.is_empty() {
        return Err(Error::BadRequest {
            message: "worker_id cannot be empty".to_string(),
        });
    }
    if !worker_id_pattern().is_match(id) {
        return Err(Error::BadRequest {
            message: "worker_id contains invalid characters".to_string(),
        });
    }
    Ok(())
}
