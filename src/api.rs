//! Transport-agnostic caller boundary.
//!
//! Decodes a match request body, runs the engine and maps the outcome to a
//! status code and JSON body. The CLI drives it with the request file; an
//! HTTP front end would hand it the method and raw body unchanged.

use crate::error::MatchError;
use crate::matching::MatchEngine;
use crate::models::{MatchRequest, MatchedInvestor};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

/// Failure at the boundary, before or during a matching run.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid request body: {0}")]
    BadRequest(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] MatchError),

    #[error("Failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MethodNotAllowed => 405,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) | ApiError::Encode(_) => 500,
        }
    }

    /// JSON error body.
    pub fn body(&self) -> Value {
        match self {
            ApiError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            ApiError::BadRequest(e) => json!({
                "error": "Invalid request body",
                "detail": e.to_string(),
            }),
            ApiError::Internal(e) => json!({
                "error": "Internal server error",
                "detail": e.to_string(),
            }),
            ApiError::Encode(e) => json!({
                "error": "Internal server error",
                "detail": e.to_string(),
            }),
        }
    }
}

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// Decode the body and run a match. Only `POST` is accepted.
pub async fn process(
    engine: &MatchEngine,
    method: &str,
    body: &[u8],
) -> Result<Vec<MatchedInvestor>, ApiError> {
    if !method.eq_ignore_ascii_case("POST") {
        return Err(ApiError::MethodNotAllowed);
    }

    let request: MatchRequest = serde_json::from_slice(body)?;
    let profile = request.profile();
    debug!("Decoded request profile: {:?}", profile);

    Ok(engine.run(&profile).await?)
}

/// Like [`process`], but always yields a response.
pub async fn handle(engine: &MatchEngine, method: &str, body: &[u8]) -> ApiResponse {
    let outcome = process(engine, method, body)
        .await
        .and_then(|matches| serde_json::to_value(matches).map_err(ApiError::Encode));

    match outcome {
        Ok(body) => ApiResponse { status: 200, body },
        Err(e) => {
            if e.status() == 500 {
                error!("Error matching investors: {}", e);
            }
            ApiResponse {
                status: e.status(),
                body: e.body(),
            }
        }
    }
}
