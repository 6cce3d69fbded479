use actix_web::{
    error,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::{Display, Error};
use uuid::Uuid;

use crate::db::storage::StorageError;

#[derive(Debug, Display, Error, PartialEq, Eq, serde::Serialize)]
pub enum AppError {
    #[display(fmt = "{} {} not found", collection, id)]
    NotFound { collection: &'static str, id: Uuid },

    #[display(fmt = "{} is already booked for this time slot", resource)]
    Conflict { resource: String },

    #[display(fmt = "{}", message)]
    Validation { message: String },

    #[display(fmt = "unauthorized")]
    Unauthorized,

    #[display(fmt = "forbidden")]
    Forbidden,

    #[display(fmt = "internal error")]
    Internal,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(collection: &'static str, id: Uuid) -> Self {
        AppError::NotFound { collection, id }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::Validation { .. } => "VALIDATION",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::Internal => "INTERNAL",
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        log::error!("snapshot storage failure: {}", err);
        AppError::Internal
    }
}

#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl error::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::to_string(&body).unwrap_or_default())
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn conflict_message_names_the_resource() {
        let err = AppError::Conflict {
            resource: "Churrasqueira".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Churrasqueira is already booked for this time slot"
        );
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::not_found("events", Uuid::nil());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.kind(), "NOT_FOUND");
    }
}
