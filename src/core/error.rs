use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::{error, warn};

use crate::ai::AiError;
use crate::calculators::CalculatorError;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Error returned by every handler. `message` is the friendly text shown to the user.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Permission failures are reported differently from everything else
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self.status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        )
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6), extended codes included
fn is_busy(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| matches!(c & 0xff, 5 | 6))
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Data tidak ditemukan"),

            sqlx::Error::Database(db_err) if is_busy(db_err.code().as_deref()) => {
                warn!("Database busy: {}", db_err);
                Self::service_unavailable("Database sedang sibuk, coba lagi nanti")
            }

            sqlx::Error::Database(db_err) => {
                warn!("Database constraint error: {}", db_err);
                if db_err.is_unique_violation() {
                    Self::conflict("Data sudah ada")
                } else {
                    Self::bad_request("Data tidak valid")
                }
            }

            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                error!("Database pool unavailable");
                Self::service_unavailable("Database sedang tidak tersedia, coba lagi nanti")
            }

            other => {
                error!("Unexpected database error: {:?}", other);
                Self::internal_server_error("Terjadi kesalahan pada server")
            }
        }
    }
}

impl From<axum::Error> for AppError {
    fn from(err: axum::Error) -> Self {
        Self::internal_server_error("Terjadi kesalahan pada server").with_details(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request("Data yang dikirim tidak valid").with_details(err.to_string())
    }
}

impl From<CalculatorError> for AppError {
    fn from(err: CalculatorError) -> Self {
        Self::bad_request("Input perhitungan tidak valid").with_details(err.to_string())
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        error!("AI flow failed: {}", err);
        Self::service_unavailable(
            "Maaf, asisten AI sedang tidak dapat digunakan. Silakan coba lagi nanti.",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}
