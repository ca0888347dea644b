//! MIME type and extension tables.

/// MIME type -> extension (with leading dot). Parameters such as `; charset=` are ignored.
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/bmp", ".bmp"),
    ("image/tiff", ".tiff"),
    ("image/svg+xml", ".svg"),
    ("video/mp4", ".mp4"),
    ("video/quicktime", ".mov"),
    ("video/webm", ".webm"),
    ("video/x-msvideo", ".avi"),
    ("video/x-matroska", ".mkv"),
    ("video/x-ms-wmv", ".wmv"),
    ("video/x-flv", ".flv"),
    ("video/mpeg", ".mpeg"),
    ("audio/mpeg", ".mp3"),
    ("audio/mp3", ".mp3"),
    ("audio/wav", ".wav"),
    ("audio/x-wav", ".wav"),
    ("audio/aac", ".aac"),
    ("audio/ogg", ".ogg"),
    ("audio/flac", ".flac"),
    ("audio/mp4", ".m4a"),
    ("audio/x-m4a", ".m4a"),
    ("audio/x-ms-wma", ".wma"),
    ("application/pdf", ".pdf"),
    ("application/msword", ".doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
    ("application/vnd.ms-excel", ".xls"),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".xlsx",
    ),
    ("application/vnd.ms-powerpoint", ".ppt"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".pptx",
    ),
    ("text/plain", ".txt"),
    ("application/rtf", ".rtf"),
    ("text/rtf", ".rtf"),
    ("application/vnd.oasis.opendocument.text", ".odt"),
];

fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

pub fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    let normalized = normalize_mime_type(content_type);
    MIME_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == normalized)
        .map(|(_, ext)| *ext)
}

/// Lowercased extension of `filename` including the dot, or `None` when it has none.
/// A leading dot alone (".env") is not an extension.
pub fn extension_of(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => Some(name[idx..].to_ascii_lowercase()),
        _ => None,
    }
}

/// Content type used when serving a stored file.
pub fn content_type_for_filename(filename: &str) -> &'static str {
    let Some(extension) = extension_of(filename) else {
        return "application/octet-stream";
    };
    match extension.as_str() {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".tiff" => "image/tiff",
        ".svg" => "image/svg+xml",
        ".mpeg" => "video/mpeg",
        ".mp3" => "audio/mpeg",
        ".wav" => "audio/wav",
        ".m4a" => "audio/mp4",
        ".rtf" => "application/rtf",
        other => MIME_EXTENSIONS
            .iter()
            .find(|(_, ext)| *ext == other)
            .map(|(mime, _)| *mime)
            .unwrap_or("application/octet-stream"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_mime_strips_parameters() {
        assert_eq!(extension_for_mime("image/png"), Some(".png"));
        assert_eq!(extension_for_mime("IMAGE/JPEG; charset=binary"), Some(".jpg"));
        assert_eq!(extension_for_mime("application/x-unknown"), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("clip.MOV"), Some(".mov".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz".to_string()));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".env"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn test_content_type_for_filename() {
        assert_eq!(content_type_for_filename("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for_filename("compressed-a.mp4"), "video/mp4");
        assert_eq!(content_type_for_filename("song.mp3"), "audio/mpeg");
        assert_eq!(content_type_for_filename("notes.txt"), "text/plain");
        assert_eq!(content_type_for_filename("blob"), "application/octet-stream");
    }
}
