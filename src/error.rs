use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::ValidationErrors;

use crate::db::error::DatabaseError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error")]
    Database(DatabaseError),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        conflicting_id: Option<i64>,
    },

    #[error("Other error: {0}")]
    Other(anyhow::Error),
}

impl From<DatabaseError> for Error {
    fn from(value: DatabaseError) -> Self {
        Self::Database(value)
    }
}

fn error_body(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::Database(database_error) => match database_error {
                DatabaseError::DatabaseError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Database Error");

                    error_body(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error occurred",
                    )
                }
                DatabaseError::NotFound(resource) => {
                    error_body(StatusCode::NOT_FOUND, format!("{} not found", resource))
                }
            },
            Error::Validation(validation_error) => {
                tracing::warn!(err.msg = %validation_error, err.details = ?validation_error, "Validation Error");

                error_body(StatusCode::BAD_REQUEST, validation_error.to_string())
            }
            Error::InvalidArgument(message) => {
                tracing::warn!(err.msg = %message, "Invalid Argument");

                error_body(StatusCode::BAD_REQUEST, message)
            }
            Error::Conflict {
                message,
                conflicting_id,
            } => {
                let body = match conflicting_id {
                    Some(id) => json!({ "error": message, "conflicting_id": id }),
                    None => json!({ "error": message }),
                };

                (StatusCode::CONFLICT, Json(body)).into_response()
            }
            Error::Other(error) => {
                tracing::error!(err.msg = %error, err.details = ?error, "Other Error");

                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error occurred",
                )
            }
        }
    }
}
