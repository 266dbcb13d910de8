//! Multipart form reading shared by the upload endpoints.

use std::collections::HashMap;

use agency_core::error::CoreError;
use agency_core::files::MAX_PROJECT_FILE_BYTES;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::error::AppError;

/// Extra bytes allowed on top of the largest file for the rest of the form.
pub const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Request body limit for routes that accept a file.
pub fn upload_body_limit() -> usize {
    MAX_PROJECT_FILE_BYTES + FORM_OVERHEAD_BYTES
}

/// The `file` part of an upload form.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A parsed upload form: the `file` part plus every text field.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require_file(&mut self) -> Result<UploadedFile, AppError> {
        self.file
            .take()
            .ok_or_else(|| CoreError::invalid_field("file", "No file provided").into())
    }
}

/// Drain a multipart body into an [`UploadForm`].
pub async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                data: data.to_vec(),
            });
        } else if !name.is_empty() {
            let text = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, text);
        }
    }
    Ok(form)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CoreError::invalid_field("file", "File size too large").into()
    } else {
        AppError::BadRequest(e.to_string())
    }
}
