use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::db::StorageError;

/// Every failure a handler can report. Each variant carries a short `error`
/// label and a human readable `message`; `Internal` also carries the
/// underlying failure text as `details`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{error}: {message}")]
    Validation { error: String, message: String },
    #[error("{error}: {message}")]
    Conflict { error: String, message: String },
    #[error("{error}: {message}")]
    NotFound { error: String, message: String },
    #[error("{error}: {message}")]
    Authentication { error: String, message: String },
    #[error("{error}: {message}")]
    Authorization { error: String, message: String },
    #[error("{error}: {message}")]
    TooManyRequests { error: String, message: String },
    #[error("{error}: {details}")]
    Internal { error: String, details: String },
}

/// Failure half of the response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn validation(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn conflict(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn not_found(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn authentication(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn internal(error: impl Into<String>, details: impl std::fmt::Display) -> Self {
        Self::Internal {
            error: error.into(),
            details: details.to_string(),
        }
    }

    pub fn missing_token() -> Self {
        Self::authentication(
            "Token de acceso requerido",
            "Debes proporcionar un token de autenticación válido",
        )
    }

    pub fn invalid_token() -> Self {
        Self::Authorization {
            error: "Token inválido".into(),
            message: "El token proporcionado no es válido o ha expirado".into(),
        }
    }

    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::validation("Datos incompletos", message)
    }

    pub fn user_not_found(id: impl std::fmt::Display) -> Self {
        Self::not_found("Usuario no encontrado", format!("No existe un usuario con ID {id}"))
    }

    /// Classifies a storage failure that slipped past the validators. A
    /// UNIQUE violation can only come from `users.email`, so it becomes the
    /// same conflict the proactive check reports.
    pub fn from_storage(label: &str, err: StorageError) -> Self {
        if err.is_unique_violation() {
            return Self::conflict("Email ya existe", "Ya existe un usuario con este email");
        }
        Self::internal(label, err)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(self) -> ErrorBody {
        let (error, message, details) = match self {
            ApiError::Validation { error, message }
            | ApiError::Conflict { error, message }
            | ApiError::NotFound { error, message }
            | ApiError::Authentication { error, message }
            | ApiError::Authorization { error, message }
            | ApiError::TooManyRequests { error, message } => (error, message, None),
            ApiError::Internal { error, details } => (
                error,
                "Algo salió mal en el servidor".to_owned(),
                Some(details),
            ),
        };
        ErrorBody {
            success: false,
            error,
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_per_category() {
        assert_eq!(ApiError::incomplete("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::conflict("a", "b").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::user_not_found(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::missing_token().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::invalid_token().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::internal("boom", "disk on fire").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_body_carries_details() {
        let body = serde_json::to_value(ApiError::internal("Error al obtener usuarios", "no such table").body())
            .unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Error al obtener usuarios");
        assert_eq!(body["details"], "no such table");
        assert!(body["message"].is_string());
    }

    #[test]
    fn client_errors_omit_details() {
        let body = serde_json::to_value(ApiError::user_not_found(999_999).body()).unwrap();
        assert_eq!(body["error"], "Usuario no encontrado");
        assert_eq!(body["message"], "No existe un usuario con ID 999999");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn non_unique_storage_failures_are_internal() {
        let err = ApiError::from_storage("Error al crear usuario", StorageError::Sqlx(sqlx::Error::RowNotFound));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
