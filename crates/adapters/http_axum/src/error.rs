//! HTTP error response mapping and server errors.

use std::net::SocketAddr;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sensorbridge_domain::error::BridgeError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps request and domain failures to an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// The request itself is malformed.
    BadRequest(String),
    Domain(BridgeError),
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Domain(BridgeError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(BridgeError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(err) => {
                tracing::error!(error = %err, source = ?std::error::Error::source(err), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Failures of the server itself, as opposed to a single request.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("unable to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to read the bound address")]
    LocalAddr(#[source] std::io::Error),

    #[error("server on {0} terminated with an error")]
    Serve(SocketAddr, #[source] std::io::Error),

    #[error("server task on {0} panicked or was aborted")]
    Join(SocketAddr, #[source] tokio::task::JoinError),
}

impl From<ServerError> for BridgeError {
    fn from(err: ServerError) -> Self {
        Self::Transport(Box::new(err))
    }
}
