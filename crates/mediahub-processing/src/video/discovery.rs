//! Locating the ffmpeg binary, once, at startup.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Common install locations, probed in order after an explicit override.
pub const FFMPEG_CANDIDATES: &[&str] = &[
    "/usr/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
    "/opt/ffmpeg/bin/ffmpeg",
    "C:\\ffmpeg\\bin\\ffmpeg.exe",
    "D:\\ffmpeg\\bin\\ffmpeg.exe",
];

#[cfg(windows)]
const FFMPEG_BINARY: &str = "ffmpeg.exe";
#[cfg(not(windows))]
const FFMPEG_BINARY: &str = "ffmpeg";

/// Resolve the encoder binary: `explicit` first, then [`FFMPEG_CANDIDATES`], then `PATH`.
///
/// `None` means transcoding is unavailable for the life of the process and every video
/// upload takes the copy fallback.
pub fn discover_ffmpeg(explicit: Option<&str>) -> Option<PathBuf> {
    discover_in(explicit, FFMPEG_CANDIDATES, env::var_os("PATH").as_deref())
}

fn discover_in(
    explicit: Option<&str>,
    candidates: &[&str],
    search_path: Option<&OsStr>,
) -> Option<PathBuf> {
    if let Some(explicit) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(explicit);
        if path.is_file() {
            tracing::info!(path = %path.display(), "Using ffmpeg from FFMPEG_PATH");
            return Some(path);
        }
        tracing::warn!(
            path = %path.display(),
            "FFMPEG_PATH does not point to a file, falling back to discovery"
        );
    }

    if let Some(found) = candidates
        .iter()
        .map(Path::new)
        .find(|candidate| candidate.is_file())
    {
        tracing::info!(path = %found.display(), "Found ffmpeg at a known install location");
        return Some(found.to_path_buf());
    }

    let found = search_path.and_then(|paths| {
        env::split_paths(paths)
            .map(|dir| dir.join(FFMPEG_BINARY))
            .find(|candidate| candidate.is_file())
    });

    match &found {
        Some(path) => tracing::info!(path = %path.display(), "Found ffmpeg in PATH"),
        None => tracing::warn!(
            "ffmpeg not found; video uploads will be stored without compression"
        ),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempdir().unwrap();
        let binary = dir.path().join("my-ffmpeg");
        std::fs::write(&binary, b"").unwrap();

        let found = discover_in(binary.to_str(), &[], None);
        assert_eq!(found, Some(binary));
    }

    #[test]
    fn test_candidates_then_path() {
        let dir = tempdir().unwrap();
        let listed = dir.path().join("listed-ffmpeg");
        std::fs::write(&listed, b"").unwrap();
        let listed_str = listed.to_str().unwrap();

        let found = discover_in(Some("/definitely/missing"), &[listed_str], None);
        assert_eq!(found, Some(listed.clone()));

        let bin_dir = tempdir().unwrap();
        let on_path = bin_dir.path().join(FFMPEG_BINARY);
        std::fs::write(&on_path, b"").unwrap();
        let search = env::join_paths([PathBuf::from("/nowhere"), bin_dir.path().to_path_buf()])
            .unwrap();

        let found = discover_in(None, &["/definitely/missing"], Some(&search));
        assert_eq!(found, Some(on_path));
    }

    #[test]
    fn test_nothing_found() {
        let empty = tempdir().unwrap();
        let search = env::join_paths([empty.path()]).unwrap();
        assert_eq!(discover_in(None, &[], Some(&search)), None);
        assert_eq!(discover_in(Some("   "), &[], None), None);
    }
}
