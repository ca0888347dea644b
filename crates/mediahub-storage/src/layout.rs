//! Fixed directory conventions for every media category.

use mediahub_core::MediaCategory;

/// Filename marker for transcoder output (and its copy fallback).
pub const COMPRESSED_PREFIX: &str = "compressed-";

/// Uploads root, expressed as a directory name relative to itself.
const ROOT: &str = "";

/// One place a file of a category may live: `{dir}/{prefix}{filename}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadCandidate {
    pub dir: &'static str,
    pub prefix: &'static str,
}

const fn candidate(dir: &'static str) -> ReadCandidate {
    ReadCandidate { dir, prefix: "" }
}

/// Which upload route a write comes from.
///
/// The dedicated `/upload/image` and `/upload/video` routes and the generic
/// `/media/upload/{type}` route historically write video to different directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
    Dedicated,
    Generic,
}

#[derive(Debug)]
pub struct CategoryLayout {
    pub category: MediaCategory,
    pub dedicated_write_dir: &'static str,
    pub generic_write_dir: &'static str,
    /// Searched in order when resolving a read.
    pub read_candidates: &'static [ReadCandidate],
    /// Scanned in order when listing. Includes every historical write target.
    pub list_dirs: &'static [&'static str],
}

impl CategoryLayout {
    pub fn write_dir(&self, target: WriteTarget) -> &'static str {
        match target {
            WriteTarget::Dedicated => self.dedicated_write_dir,
            WriteTarget::Generic => self.generic_write_dir,
        }
    }
}

static IMAGE: CategoryLayout = CategoryLayout {
    category: MediaCategory::Image,
    dedicated_write_dir: "images",
    generic_write_dir: "images",
    read_candidates: &[candidate(ROOT), candidate("images"), candidate("image")],
    list_dirs: &[ROOT, "images", "image"],
};

static VIDEO: CategoryLayout = CategoryLayout {
    category: MediaCategory::Video,
    dedicated_write_dir: "video",
    generic_write_dir: "videos",
    read_candidates: &[
        candidate("video"),
        candidate("videos"),
        candidate(ROOT),
        ReadCandidate {
            dir: ROOT,
            prefix: COMPRESSED_PREFIX,
        },
    ],
    list_dirs: &["video", "videos", ROOT],
};

static AUDIO: CategoryLayout = CategoryLayout {
    category: MediaCategory::Audio,
    dedicated_write_dir: "audios",
    generic_write_dir: "audios",
    read_candidates: &[candidate("audio"), candidate("audios"), candidate(ROOT)],
    list_dirs: &["audio", "audios", ROOT],
};

static PDF: CategoryLayout = CategoryLayout {
    category: MediaCategory::Pdf,
    dedicated_write_dir: "pdfs",
    generic_write_dir: "pdfs",
    read_candidates: &[candidate("pdf"), candidate("pdfs"), candidate(ROOT)],
    list_dirs: &["pdf", "pdfs", ROOT],
};

static DOC: CategoryLayout = CategoryLayout {
    category: MediaCategory::Doc,
    dedicated_write_dir: "docs",
    generic_write_dir: "docs",
    read_candidates: &[candidate("docs"), candidate("documents"), candidate(ROOT)],
    list_dirs: &["docs", "documents", ROOT],
};

/// Process-wide, immutable storage convention table.
pub struct StorageLayout;

impl StorageLayout {
    pub fn for_category(category: MediaCategory) -> &'static CategoryLayout {
        match category {
            MediaCategory::Image => &IMAGE,
            MediaCategory::Video => &VIDEO,
            MediaCategory::Audio => &AUDIO,
            MediaCategory::Pdf => &PDF,
            MediaCategory::Doc => &DOC,
        }
    }

    /// Directories probed when deleting a video: the compressed name first, then the
    /// name as given, then the unprefixed original when the name carries the marker.
    pub fn video_delete_dirs() -> &'static [&'static str] {
        &["video", "videos", ROOT]
    }
}
