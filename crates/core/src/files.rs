//! Upload rules: category classification, size limits, receipt whitelist,
//! and blob-storage placement.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::BlobResourceType;
use crate::types::DbId;
use crate::validation::FieldError;

/// Largest accepted project file (10 MB).
pub const MAX_PROJECT_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Largest accepted invoice receipt (5 MB).
pub const MAX_RECEIPT_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for invoice receipts.
pub const RECEIPT_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

/// Extensions accepted for invoice receipts, when the name carries one.
pub const RECEIPT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

/// Blob-store folder for invoice receipts.
pub const RECEIPT_FOLDER: &str = "receipts";

/// Blob-store folder for a project's files.
pub fn project_folder(project_id: DbId) -> String {
    format!("projects/{project_id}/files")
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Semantic file category shown in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileCategory {
    Image,
    #[serde(rename = "PDF")]
    Pdf,
    Word,
    Text,
    Excel,
    #[serde(rename = "CSV")]
    Csv,
    PowerPoint,
    Archive,
    Code,
    Video,
    Audio,
    Other,
}

impl FileCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Image => "Image",
            FileCategory::Pdf => "PDF",
            FileCategory::Word => "Word",
            FileCategory::Text => "Text",
            FileCategory::Excel => "Excel",
            FileCategory::Csv => "CSV",
            FileCategory::PowerPoint => "PowerPoint",
            FileCategory::Archive => "Archive",
            FileCategory::Code => "Code",
            FileCategory::Video => "Video",
            FileCategory::Audio => "Audio",
            FileCategory::Other => "Other",
        }
    }
}

/// Lower-cased extension after the last dot, if any.
pub fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

fn category_for_extension(ext: &str) -> Option<FileCategory> {
    use FileCategory::*;
    let category = match ext {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" => Image,
        "pdf" => Pdf,
        "doc" | "docx" => Word,
        "txt" => Text,
        "xls" | "xlsx" => Excel,
        "csv" => Csv,
        "ppt" | "pptx" => PowerPoint,
        "zip" | "rar" | "7z" | "tar" | "gz" => Archive,
        "js" | "ts" | "jsx" | "tsx" | "html" | "css" | "json" => Code,
        "mp4" | "avi" | "mov" | "wmv" | "flv" => Video,
        "mp3" | "wav" | "flac" | "aac" => Audio,
        _ => return None,
    };
    Some(category)
}

fn category_for_mime(mime: &str) -> FileCategory {
    use FileCategory::*;
    let mime = mime.to_ascii_lowercase();
    let has = |needle: &str| mime.contains(needle);
    if mime.starts_with("image/") {
        Image
    } else if mime.starts_with("video/") {
        Video
    } else if mime.starts_with("audio/") {
        Audio
    } else if has("pdf") {
        Pdf
    } else if has("word") || has("document") {
        Word
    } else if has("excel") || has("spreadsheet") {
        Excel
    } else if has("powerpoint") || has("presentation") {
        PowerPoint
    } else if has("zip") || has("rar") || has("archive") {
        Archive
    } else if has("text/") {
        Text
    } else {
        Other
    }
}

/// Classify by extension first, MIME type second.
pub fn classify(file_name: &str, mime_type: &str) -> FileCategory {
    extension(file_name)
        .and_then(|ext| category_for_extension(&ext))
        .unwrap_or_else(|| category_for_mime(mime_type))
}

// ---------------------------------------------------------------------------
// Upload validation
// ---------------------------------------------------------------------------

fn ensure_size(size: usize, max: usize) -> Result<(), CoreError> {
    if size == 0 {
        return Err(CoreError::invalid_field("file", "No file provided"));
    }
    if size > max {
        return Err(CoreError::invalid_field(
            "file",
            format!("File size too large. Maximum size is {}MB.", max / (1024 * 1024)),
        ));
    }
    Ok(())
}

/// Checked before anything is sent to blob storage.
pub fn validate_project_file(size: usize) -> Result<(), CoreError> {
    ensure_size(size, MAX_PROJECT_FILE_BYTES)
}

/// Receipts must be small and a JPEG, PNG, or PDF by both MIME type and name.
pub fn validate_receipt(file_name: &str, mime_type: &str, size: usize) -> Result<(), CoreError> {
    let mut errors = Vec::new();
    let mime = mime_type.trim().to_ascii_lowercase();
    let mime_ok = RECEIPT_MIME_TYPES.contains(&mime.as_str());
    let ext_ok = extension(file_name).map_or(true, |ext| RECEIPT_EXTENSIONS.contains(&ext.as_str()));
    if !mime_ok || !ext_ok {
        errors.push(FieldError::new(
            "file",
            "Invalid file type. Only JPEG, PNG, and PDF files are allowed.",
        ));
    }
    if let Err(CoreError::Validation(mut size_errors)) = ensure_size(size, MAX_RECEIPT_BYTES) {
        errors.append(&mut size_errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors))
    }
}

/// Storage resource type derived from the declared MIME type.
pub fn resource_type_for(mime_type: &str) -> BlobResourceType {
    let mime = mime_type.to_ascii_lowercase();
    if mime.starts_with("image/") {
        BlobResourceType::Image
    } else if mime.starts_with("video/") {
        BlobResourceType::Video
    } else {
        BlobResourceType::Raw
    }
}

/// Name under which a blob is stored: the display name without its extension.
pub fn storage_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}
