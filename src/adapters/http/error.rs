//! HTTP error mapping.
//!
//! Converts `DeskError` into a status code and a static JSON message.
//! Internal detail (source, reason) goes to the log, never to the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::error::DeskError;

/// Error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
  pub error: &'static str,
}

/// Boundary wrapper so handlers can use `?` on `DeskError`.
#[derive(Debug)]
pub struct ApiError(pub DeskError);

impl From<DeskError> for ApiError {
  fn from(e: DeskError) -> Self {
    Self(e)
  }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self.0 {
      DeskError::DataUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
      DeskError::RemoteCallFailed(_) => StatusCode::BAD_GATEWAY,
      DeskError::RemoteTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
      DeskError::InvalidCredentials | DeskError::NotAuthenticated => StatusCode::UNAUTHORIZED,
      DeskError::EmptyTurn => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self.0, status = %status, "Request failed");
    } else {
      warn!(error = %self.0, status = %status, "Request rejected");
    }
    let body = ErrorBody {
      error: self.0.user_message(),
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_mapping() {
    let unavailable = ApiError(DeskError::data_unavailable("x.csv", "HTTP 404"));
    assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ApiError(DeskError::NotAuthenticated).status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError(DeskError::InvalidCredentials).status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError(DeskError::EmptyTurn).status(), StatusCode::BAD_REQUEST);
  }
}
