use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

// App-level error type shared by every router.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Status { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the response for a use-case error. 5xx detail is replaced with a generic message.
    pub fn from_use_case(status: StatusCode, message: String) -> Self {
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::BAD_GATEWAY => "Payment processor unavailable".to_string(),
            _ => message,
        };
        Self::new(status, message)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

macro_rules! from_use_case_error {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<$error> for AppError {
                fn from(err: $error) -> Self {
                    AppError::from_use_case(err.status_code(), err.to_string())
                }
            }
        )+
    };
}

from_use_case_error!(
    crate::usecases::admin::AdminError,
    crate::usecases::business_discovery::DiscoveryError,
    crate::usecases::geo_ranking::RankingError,
    crate::usecases::reviews::ReviewError,
    crate::usecases::service_listing::ServiceListingError,
    crate::usecases::subscriptions::SubscriptionError,
);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Status { status, message } => (status, message),
            AppError::Internal(err) => {
                error!(error = ?err, "http: unhandled internal error");
                // Don't leak internal error detail to client
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_side_detail_is_hidden() {
        let err = AppError::from_use_case(
            StatusCode::INTERNAL_SERVER_ERROR,
            "connection refused at 10.0.0.5".to_string(),
        );
        assert_eq!(err.to_string(), "Internal server error");

        let err = AppError::from_use_case(StatusCode::BAD_GATEWAY, "stripe 500".to_string());
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Payment processor unavailable");
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = AppError::from_use_case(StatusCode::CONFLICT, "already subscribed".to_string());
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "already subscribed");
    }

    #[test]
    fn error_envelope_shape() {
        let body = serde_json::to_value(ErrorResponse {
            success: false,
            code: 404,
            message: "business not found".to_string(),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "code": 404, "message": "business not found"})
        );
    }

    #[test]
    fn use_case_errors_keep_their_status() {
        use crate::usecases::subscriptions::SubscriptionError;

        let err = AppError::from(SubscriptionError::PaymentDeclined);
        assert_eq!(err.status(), StatusCode::PAYMENT_REQUIRED);

        let err = AppError::from(SubscriptionError::Internal(anyhow::anyhow!("pool timed out")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }
}
