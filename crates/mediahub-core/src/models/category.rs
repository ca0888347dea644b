use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Kind of media handled by the service.
///
/// The category decides which extensions are valid, where uploads are stored and
/// whether the upload goes through the video transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
    Pdf,
    Doc,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown media category: {0}")]
pub struct ParseCategoryError(pub String);

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".tiff", ".svg",
];
const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".avi", ".mov", ".webm", ".mkv", ".wmv", ".flv", ".mpeg",
];
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".aac", ".ogg", ".flac", ".m4a", ".wma"];
const PDF_EXTENSIONS: &[&str] = &[".pdf"];
const DOC_EXTENSIONS: &[&str] = &[
    ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".txt", ".rtf", ".odt",
];

impl MediaCategory {
    /// Every category, in listing scan order.
    pub const ALL: [MediaCategory; 5] = [
        MediaCategory::Image,
        MediaCategory::Video,
        MediaCategory::Audio,
        MediaCategory::Pdf,
        MediaCategory::Doc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::Video => "video",
            MediaCategory::Audio => "audio",
            MediaCategory::Pdf => "pdf",
            MediaCategory::Doc => "doc",
        }
    }

    /// Capitalised name used in client messages ("Image not found").
    pub fn display_name(&self) -> &'static str {
        match self {
            MediaCategory::Image => "Image",
            MediaCategory::Video => "Video",
            MediaCategory::Audio => "Audio",
            MediaCategory::Pdf => "PDF",
            MediaCategory::Doc => "Document",
        }
    }

    /// Lowercase extensions, with the leading dot.
    pub fn valid_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaCategory::Image => IMAGE_EXTENSIONS,
            MediaCategory::Video => VIDEO_EXTENSIONS,
            MediaCategory::Audio => AUDIO_EXTENSIONS,
            MediaCategory::Pdf => PDF_EXTENSIONS,
            MediaCategory::Doc => DOC_EXTENSIONS,
        }
    }

    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaCategory::Image => ".jpg",
            MediaCategory::Video => ".mp4",
            MediaCategory::Audio => ".mp3",
            MediaCategory::Pdf => ".pdf",
            MediaCategory::Doc => ".bin",
        }
    }

    /// Case-insensitive membership test; `extension` includes the leading dot.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.valid_extensions().contains(&extension.as_str())
    }

    /// Parse the `type` segment of a download URL, which also accepts the
    /// `document` and `documents` spellings.
    pub fn from_download_type(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "document" | "documents" => Some(MediaCategory::Doc),
            other => other.parse().ok(),
        }
    }
}

impl FromStr for MediaCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(MediaCategory::Image),
            "video" => Ok(MediaCategory::Video),
            "audio" => Ok(MediaCategory::Audio),
            "pdf" => Ok(MediaCategory::Pdf),
            "doc" => Ok(MediaCategory::Doc),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
