//! Multipart form intake
//!
//! Collects the text fields and file parts of a multipart request into a
//! form the workflow services consume.

use std::collections::HashMap;

use axum::extract::Multipart;
use warranty_service::UploadedFile;

use crate::response::{ApiError, ApiResult};

/// Accepted upload content types
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// Most files accepted in one request
const MAX_FILES: usize = 5;

/// Parsed multipart form: text fields by name plus uploaded files
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl MultipartForm {
    /// Required text field, or a validation error naming it
    pub fn require(&self, name: &str) -> ApiResult<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::invalid_body(format!("Missing field: {name}")))
    }
}

/// Read a multipart request. Parts carrying a filename are treated as
/// uploads; everything else is collected as a text field.
pub async fn read_multipart(mut multipart: Multipart) -> ApiResult<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_body(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name() {
            let original_filename = filename.to_string();
            let mime_type = field.content_type().unwrap_or_default().to_string();

            if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
                return Err(ApiError::invalid_body(format!(
                    "File type {mime_type} is not allowed. Accepted: JPEG, PNG, WebP, HEIC"
                )));
            }
            if form.files.len() >= MAX_FILES {
                return Err(ApiError::invalid_body(format!(
                    "At most {MAX_FILES} files per request"
                )));
            }

            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::invalid_body(e.to_string()))?;

            form.files.push(UploadedFile {
                original_filename,
                mime_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::invalid_body(e.to_string()))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
