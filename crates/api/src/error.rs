use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use confdesk_core::error::CoreError;
use serde_json::json;

/// Error returned by every HTTP handler.
///
/// Rendered as `{"error": <message>, "code": <CODE>}`. Internal failures
/// are logged and reach the client only as a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure outside the domain (hashing, token signing, corrupt settings).
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

/// Status, machine-readable code and client-facing message.
struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    /// Log `detail` and hide it from the client.
    fn internal(detail: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Request failed with internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl From<&CoreError> for ErrorParts {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => {
                Self::not_found(format!("{entity} with id {id} not found"))
            }
            CoreError::NotFoundByKey { entity, key } => {
                Self::not_found(format!("{entity} '{key}' not found"))
            }
            CoreError::Validation(msg) => Self::invalid(msg.as_str()),
            CoreError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "CONFLICT", msg.as_str()),
            CoreError::Unauthorized(msg) => {
                Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.as_str())
            }
            CoreError::Forbidden(msg) => {
                Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.as_str())
            }
            CoreError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<&sqlx::Error> for ErrorParts {
    /// Constraint violations are client errors: `uq_*` is 409, `ck_*` and
    /// foreign keys are 400. A missing row is 404. Anything else is 500.
    fn from(err: &sqlx::Error) -> Self {
        let db_err = match err {
            sqlx::Error::RowNotFound => return Self::not_found("Resource not found"),
            sqlx::Error::Database(db_err) => db_err,
            other => return Self::internal(other),
        };

        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.code().as_deref() {
            Some("23505") if constraint.starts_with("uq_") => {
                Self::new(StatusCode::CONFLICT, "CONFLICT", duplicate_message(constraint))
            }
            Some("23514") if constraint.starts_with("ck_") => {
                Self::invalid(format!("Value violates check constraint: {constraint}"))
            }
            Some("23503") => Self::invalid("Referenced record does not exist"),
            _ => Self::internal(db_err),
        }
    }
}

/// Response extension marking a request that failed inside the database.
///
/// Read back by the trace layer to feed [`DbMonitor`](confdesk_db::DbMonitor).
#[derive(Debug, Clone, Copy)]
pub struct DatabaseFailure;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = match &self {
            AppError::Core(core) => ErrorParts::from(core),
            AppError::Database(err) => ErrorParts::from(err),
            AppError::InternalError(msg) => ErrorParts::internal(msg),
        };
        // Constraint violations and missing rows are the client's problem.
        let db_failed = matches!(self, AppError::Database(_)) && parts.status.is_server_error();

        let body = Json(json!({ "error": parts.message, "code": parts.code }));
        let mut response = (parts.status, body).into_response();
        if db_failed {
            response.extensions_mut().insert(DatabaseFailure);
        }
        response
    }
}

/// Human wording for the unique constraints users actually hit.
fn duplicate_message(constraint: &str) -> String {
    let known = match constraint {
        "uq_users_email" => "An account with this email already exists",
        "uq_scans_meal_slot" => "Meal already served to this participant",
        "uq_resource_accesses_resource_participant" => "Resource already given to this participant",
        "uq_hotels_name" => "A hotel with this name already exists",
        "uq_resources_title" => "A resource with this title already exists",
        other => return format!("Duplicate value violates unique constraint: {other}"),
    };
    known.to_string()
}
