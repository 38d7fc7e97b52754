use crate::error::AssistError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

/// [`AssistError`] rendered as a JSON error response
#[derive(Debug)]
pub struct ApiError(pub AssistError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AssistError::EmptySymbols | AssistError::EmptyMessage => StatusCode::BAD_REQUEST,
            AssistError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AssistError::Busy | AssistError::NoActiveTurn => StatusCode::CONFLICT,
            AssistError::Market(e) if e.is_missing_data() => StatusCode::NOT_FOUND,
            AssistError::Market(_) | AssistError::Agent(_) => StatusCode::BAD_GATEWAY,
            AssistError::Config(_) | AssistError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AssistError> for ApiError {
    fn from(err: AssistError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, %status, "Request rejected");
        }

        let body = json!({
            "status": "error",
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketDataError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(AssistError::EmptySymbols).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(AssistError::Busy).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError(AssistError::SessionNotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(MarketDataError::Provider("boom".into()).into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(agent_core::Error::Backend("401".into()).into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
