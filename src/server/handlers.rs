use crate::server::AppState;
use crate::url::parse_target;
use crate::UrlError;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

pub const GENERIC_ERROR_MESSAGE: &str =
    "Please submit a valid, absolute URL such as https://example.com";

pub const RELATIVE_URL_MESSAGE: &str = "Relative URLs such as /example.html are not supported. \
     Please supply a full URL such as https://www.example.com/something";

/// Body of a rip request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RipRequest {
    #[serde(default)]
    pub target: String,
}

/// Body of a 400 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

fn bad_request(message: &str) -> Response {
    let message = if message.is_empty() {
        GENERIC_ERROR_MESSAGE
    } else {
        message
    };

    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Rip endpoint
///
/// Validates the submitted target and rips it. A target that cannot be
/// fetched still answers 200, with empty links and hostnames.
pub async fn rip_handler(State(state): State<AppState>, body: Bytes) -> Response {
    if body.is_empty() {
        tracing::warn!("Bad request with empty body received");
        return bad_request("");
    }

    let request: RipRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Bad rip request: {}", e);
            return bad_request(&e.to_string());
        }
    };

    let target = match parse_target(&request.target) {
        Ok(target) => target,
        Err(UrlError::Relative(raw)) => {
            tracing::warn!("Rejecting relative URL request: {}", raw);
            return bad_request(RELATIVE_URL_MESSAGE);
        }
        Err(e) => {
            tracing::warn!("Invalid URL requested {:?}: {}", request.target, e);
            return bad_request("");
        }
    };

    let report = state.ripper.rip(target).await;
    Json(report.result).into_response()
}

/// Rip count endpoint
pub async fn count_handler(State(state): State<AppState>) -> Response {
    match state.counter.read().await {
        Ok(count) => Json(CountResponse { count }).into_response(),
        Err(e) => {
            tracing::error!("Could not read rip count: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not get ripCount").into_response()
        }
    }
}
