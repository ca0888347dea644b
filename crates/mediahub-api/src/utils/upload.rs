//! Common utilities for file upload handlers

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mediahub_core::AppError;
use std::collections::HashMap;

/// Content type assumed for a base64 `buffer` upload without `mimetype`.
const DEFAULT_BUFFER_MIME: &str = "image/jpeg";

/// One uploaded file as received, before any naming or processing.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub original_name: Option<String>,
    pub content_type: Option<String>,
}

/// Parsed multipart body: the selected file part plus every text field.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The `fordownload` flag. Any non-empty value other than `false` / `0` turns it on.
    pub fn for_download(&self) -> bool {
        self.field("fordownload")
            .map(|v| v.trim().to_ascii_lowercase())
            .is_some_and(|v| !v.is_empty() && v != "false" && v != "0")
    }

    /// The uploaded file, or one decoded from the base64 `buffer` text field.
    ///
    /// A real file part wins over `buffer`. A `buffer` that is not valid base64 is an
    /// input error rather than a missing file.
    pub fn take_file_or_buffer(&mut self) -> Result<Option<UploadedFile>, AppError> {
        if let Some(file) = self.file.take() {
            return Ok(Some(file));
        }
        let Some(encoded) = self.field("buffer").filter(|b| !b.trim().is_empty()) else {
            return Ok(None);
        };

        let data = decode_base64(encoded)?;
        tracing::debug!(
            size_bytes = data.len(),
            "Created upload from base64 buffer field"
        );
        Ok(Some(UploadedFile {
            data,
            original_name: self.field("filename").map(str::to_string),
            content_type: Some(
                self.field("mimetype")
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or(DEFAULT_BUFFER_MIME)
                    .to_string(),
            ),
        }))
    }
}

/// Standard base64, tolerating a `data:<mime>;base64,` prefix and embedded whitespace.
fn decode_base64(encoded: &str) -> Result<Vec<u8>, AppError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AppError::InvalidInput(format!("Invalid image data: {}", e)))
}

/// Reject a file larger than `max_size` bytes.
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// A body cut off by the request size limit is a 413, anything else malformed input.
fn multipart_error(err: MultipartError, what: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: request body too large", what))
    } else {
        AppError::InvalidInput(format!("{}: {}", what, err))
    }
}

/// Read a multipart body.
///
/// With `file_field` set, only a part of that name is taken as the file; otherwise
/// the first part carrying a filename is. Other file parts are drained and ignored.
pub async fn read_upload_form(
    mut multipart: Multipart,
    file_field: Option<&str>,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart"))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();
        let original_name = field.file_name().map(|s| s.to_string());

        let is_file_part = match file_field {
            Some(expected) => field_name == expected,
            None => original_name.is_some(),
        };

        if is_file_part {
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, "Failed to read file data"))?;

            if form.file.is_none() {
                form.file = Some(UploadedFile {
                    data: data.to_vec(),
                    original_name,
                    content_type,
                });
            }
        } else if original_name.is_some() {
            field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, "Failed to read file data"))?;
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(e, "Failed to read field"))?;
            form.fields.insert(field_name, value);
        }
    }

    Ok(form)
}
