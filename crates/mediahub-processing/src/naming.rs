//! Stored identity for uploads: extension resolution and filename generation.
//!
//! The millisecond timestamp is the only uniqueness source. Two uploads of the
//! same kind landing in the same millisecond produce the same name and the later
//! write replaces the earlier one.

use mediahub_core::models::{extension_for_mime, extension_of};
use mediahub_core::MediaCategory;

/// Source of the millisecond timestamp embedded in generated names.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Resolve the stored extension (with leading dot) for an upload.
///
/// A recognised MIME type wins when its extension belongs to `category`; otherwise the
/// original filename's extension is kept when the category accepts it; otherwise the
/// category default is used.
pub fn resolve_extension(
    category: MediaCategory,
    mime_type: Option<&str>,
    original_name: Option<&str>,
) -> String {
    if let Some(ext) = mime_type.and_then(extension_for_mime) {
        if category.accepts_extension(ext) {
            return ext.to_string();
        }
    }

    if let Some(ext) = original_name.and_then(extension_of) {
        if category.accepts_extension(&ext) {
            return ext;
        }
    }

    category.default_extension().to_string()
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_base(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Final path component with its extension removed.
fn stem(original_name: &str) -> &str {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    match (extension_of(base), base.rfind('.')) {
        (Some(_), Some(dot)) => &base[..dot],
        _ => base,
    }
}

/// Generates stored filenames for each upload route.
#[derive(Debug, Clone, Default)]
pub struct FileNamer<C = SystemClock> {
    clock: C,
}

impl FileNamer<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> FileNamer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// `<ts><ext>` for the dedicated image route. The original name only feeds the extension.
    pub fn image_name(&self, mime_type: Option<&str>, original_name: Option<&str>) -> String {
        let ext = resolve_extension(MediaCategory::Image, mime_type, original_name);
        format!("{}{}", self.clock.now_millis(), ext)
    }

    /// `<stem>-<ts>.mp4` for the dedicated video route. The stem is everything before the
    /// first dot of the original name; the output container is always MP4.
    pub fn video_name(&self, original_name: Option<&str>) -> String {
        let base = original_name
            .map(|name| name.rsplit(['/', '\\']).next().unwrap_or(name))
            .and_then(|name| name.split('.').next())
            .filter(|stem| !stem.is_empty())
            .map(sanitize_base)
            .unwrap_or_else(|| "video".to_string());
        format!("{}-{}.mp4", base, self.clock.now_millis())
    }

    /// `<ts>-<sanitized stem><ext>` for the generic upload route.
    pub fn generic_name(
        &self,
        category: MediaCategory,
        mime_type: Option<&str>,
        original_name: Option<&str>,
    ) -> String {
        let ext = resolve_extension(category, mime_type, original_name);
        let base = original_name
            .map(stem)
            .filter(|stem| !stem.is_empty())
            .map(sanitize_base)
            .unwrap_or_else(|| "file".to_string());
        format!("{}-{}{}", self.clock.now_millis(), base, ext)
    }
}
