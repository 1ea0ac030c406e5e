use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::{error, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::db::DbError;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Conflict(String),
    InternalServerError(String),
    BadRequest(String),
    Validation(ValidationErrors),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    fn new(msg: &str) -> Self {
        ErrorResponse { error: msg.to_string(), details: None }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Validation(errs) => write!(f, "Validation failed: {}", errs),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(msg) => HttpResponse::NotFound().json(ErrorResponse::new(msg)),
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(ErrorResponse::new(msg)),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(ErrorResponse::new(msg)),
            AppError::InternalServerError(msg) => HttpResponse::InternalServerError().json(ErrorResponse::new(msg)),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(ErrorResponse::new(msg)),
            AppError::Validation(errs) => HttpResponse::BadRequest().json(ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(field_messages(errs)),
            }),
        }
    }
}

/// Storage failures reach callers as a conflict or a generic 500; the
/// underlying cause is only logged.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { constraint } => {
                warn!("Unique constraint violated: {:?}", constraint);
                AppError::Conflict("Resource already exists".to_string())
            }
            DbError::Other(e) => {
                error!("Storage error: {}", e);
                AppError::InternalServerError("Database error".to_string())
            }
        }
    }
}

/// Flattens nested validator output into `field.path -> messages`, e.g.
/// `exercises[0].sets`.
pub fn field_messages(errs: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect_messages("", errs, &mut out);
    out
}

fn collect_messages(prefix: &str, errs: &ValidationErrors, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errs.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = out.entry(path).or_insert_with(Vec::new);
                for e in list {
                    messages.push(
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string()),
                    );
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_messages(&format!("{}[{}]", path, idx), inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = vec![
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::InternalServerError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Validation(ValidationErrors::new()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{}", err);
            assert_eq!(err.error_response().status(), status, "{}", err);
        }
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err: AppError = DbError::UniqueViolation { constraint: Some("k".into()) }.into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = DbError::Other(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }

    #[test]
    fn messages_fall_back_to_code() {
        let mut errs = ValidationErrors::new();
        let mut sets = ValidationError::new("range");
        sets.message = Some("Sets must be a positive integer".into());
        errs.add("sets", sets);
        errs.add("name", ValidationError::new("length"));

        let flat = field_messages(&errs);
        assert_eq!(flat["sets"], vec!["Sets must be a positive integer".to_string()]);
        assert_eq!(flat["name"], vec!["length".to_string()]);
    }
}
