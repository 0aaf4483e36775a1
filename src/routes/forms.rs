use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde_json::{Map, Value};

use crate::{
    error::{AppError, messages},
    storage::UploadedFile,
};

/// Unified body for the account endpoints, which accept either JSON or
/// multipart form data. Text fields land in `fields`; at most one file
/// part is kept (the last one wins, matching single-file upload).
pub struct FormBody {
    pub fields: Map<String, Value>,
    pub file: Option<UploadedFile>,
}

impl FormBody {
    /// String view of a field; numbers are stringified so form and JSON
    /// clients can both send e.g. `userId`.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i32> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl<S> FromRequest<S> for FormBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|_| invalid_body())?;

            let mut fields = Map::new();
            let mut file = None;
            while let Some(part) = multipart.next_field().await.map_err(|_| invalid_body())? {
                let name = part.name().unwrap_or_default().to_string();
                if let Some(original_name) = part.file_name().map(str::to_string) {
                    let content_type = part
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = part.bytes().await.map_err(|_| invalid_body())?;
                    file = Some(UploadedFile {
                        field: name,
                        original_name,
                        content_type,
                        bytes,
                    });
                } else {
                    let value = part.text().await.map_err(|_| invalid_body())?;
                    fields.insert(name, Value::String(value));
                }
            }
            return Ok(Self { fields, file });
        }

        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|_| invalid_body())?;
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(Self { fields, file: None })
    }
}

fn invalid_body() -> AppError {
    AppError::validation("bad_request", messages::INVALID_INFO, Vec::new())
}
