use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use axum::body::Bytes;

use crate::{
    config::StorageConfig,
    error::{AppError, FieldError, messages},
};

const DOCUMENT_TYPES: &[&str] = &["pdf"];
const IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// One file lifted out of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub original_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Per-field type filtering: `document` only accepts pdf, `image` only
/// accepts jpeg|jpg|png|gif, everything else (`avatar`) passes through.
/// Both the declared mime type and the filename extension must agree.
pub fn validate_upload(file: &UploadedFile) -> Result<(), AppError> {
    match file.field.as_str() {
        "document" => check_types(file, DOCUMENT_TYPES).map_err(|allowed| {
            AppError::validation(
                "create_document_error",
                messages::INVALID_INFO,
                vec![FieldError::new(
                    "document",
                    format!("Văn bản chỉ chấp nhận file {allowed}"),
                )],
            )
        }),
        "image" => check_types(file, IMAGE_TYPES).map_err(|allowed| {
            AppError::validation(
                "create_image_error",
                messages::INVALID_INFO,
                vec![FieldError::new(
                    "thumbnail",
                    format!("Ảnh chỉ chấp nhận file {allowed}"),
                )],
            )
        }),
        _ => Ok(()),
    }
}

fn check_types(file: &UploadedFile, allowed: &[&str]) -> Result<(), String> {
    let mime_ok = allowed.iter().any(|t| file.content_type.contains(t));
    let extension = file
        .original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let ext_ok = allowed.iter().any(|t| *t == extension);

    if mime_ok && ext_ok {
        Ok(())
    } else {
        Err(allowed.join("|"))
    }
}

/// `<category-or-fieldname>/<fieldname>_<millis>_<originalname>`; the
/// category only applies to the generic `file` field.
pub fn object_key(field: &str, category: Option<&str>, original_name: &str, millis: i64) -> String {
    let prefix = match (field, category) {
        ("file", Some(category)) => category,
        _ => field,
    };
    format!("{prefix}/{field}_{millis}_{original_name}")
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores the object and returns the public URL to persist on the
    /// profile.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, AppError>;
}

/// S3-compatible store reached over plain HTTP PUT
/// (`{endpoint}/{bucket}/{key}`). The bucket is expected to accept the
/// configured credentials or an open write policy; object-store protocol
/// details stay out of this backend.
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    public_host: String,
}

impl HttpObjectStore {
    pub fn new(cfg: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            bucket: cfg.bucket.clone(),
            public_host: cfg.public_host.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, AppError> {
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);
        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type.to_string())
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|err| upload_failed(key, &err.to_string()))?;

        if !response.status().is_success() {
            return Err(upload_failed(key, response.status().as_str()));
        }

        Ok(format!("{}{}", self.public_host, key))
    }
}

fn upload_failed(key: &str, detail: &str) -> AppError {
    tracing::error!(key, detail, "object upload failed");
    AppError::persistence("upload_error", messages::PERSISTENCE)
}

/// In-memory store for tests and storage-less local runs.
#[derive(Default)]
pub struct MemoryObjectStore {
    public_host: String,
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    pub fn new(public_host: impl Into<String>) -> Self {
        Self {
            public_host: public_host.into(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .expect("store mutex poisoned")
            .contains_key(key)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Bytes, _content_type: &str) -> Result<String, AppError> {
        self.objects
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), bytes);
        Ok(format!("{}{}", self.public_host, key))
    }
}
