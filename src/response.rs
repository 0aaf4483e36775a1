use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, FieldError};

pub type ApiResult<T> = Result<T, AppError>;

/// Wire shape of every error the backend emits:
/// `{"type": ..., "message": ..., "errors": [{field, messages}]}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl ErrorBody {
    pub fn from_error(err: &AppError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.message().to_string(),
            errors: err.field_errors().to_vec(),
        }
    }
}

/// Listing envelope used when the client asks for `withCount`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedBody<T: Serialize> {
    pub data: Vec<T>,
    pub page_count: u64,
    pub total_count: u64,
    pub page: u64,
    pub limit: u64,
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        (status, Json(ErrorBody::from_error(&self))).into_response()
    }
}
