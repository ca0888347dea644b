//! Listing query parsing, sorting keys and pagination.

use serde::Serialize;
use utoipa::ToSchema;

use super::StoredMediaItem;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 10;

/// Sort order for media listings. Unknown values fall back to [`SortKey::Newest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Name,
    Size,
    Type,
}

impl SortKey {
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("oldest") => SortKey::Oldest,
            Some("name") => SortKey::Name,
            Some("size") => SortKey::Size,
            Some("type") => SortKey::Type,
            _ => SortKey::Newest,
        }
    }

    /// Stable in-place sort; ties keep scan order.
    pub fn sort(&self, items: &mut [StoredMediaItem]) {
        match self {
            SortKey::Newest => items.sort_by(|a, b| b.created.cmp(&a.created)),
            SortKey::Oldest => items.sort_by(|a, b| a.created.cmp(&b.created)),
            SortKey::Name => items.sort_by(|a, b| {
                a.filename
                    .to_lowercase()
                    .cmp(&b.filename.to_lowercase())
                    .then_with(|| a.filename.cmp(&b.filename))
            }),
            SortKey::Size => items.sort_by(|a, b| b.size.cmp(&a.size)),
            SortKey::Type => items.sort_by(|a, b| a.category.as_str().cmp(b.category.as_str())),
        }
    }
}

/// Leading-integer parse: "2", " 3abc" and "+4" parse, "abc" and "" do not.
fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (sign, digits) = match value.as_bytes().first() {
        Some(b'-') => (-1, &value[1..]),
        Some(b'+') => (1, &value[1..]),
        _ => (1, value),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| n * sign)
}

/// Requested page window. Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Missing, non-numeric, zero and negative values fall back to the defaults.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |value: Option<&str>, default: usize| {
            value
                .and_then(parse_leading_int)
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .unwrap_or(default)
        };
        Self {
            page: parse(page, DEFAULT_PAGE),
            limit: parse(limit, DEFAULT_LIMIT),
        }
    }
}

/// Pointer to a neighbouring page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageRef {
    pub page: usize,
    pub limit: usize,
}

/// One page of a media listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MediaPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<PageRef>,
    pub total: usize,
    pub pages: usize,
    #[serde(rename = "currentPage")]
    pub current_page: usize,
    pub results: Vec<StoredMediaItem>,
}

impl MediaPage {
    pub fn paginate(items: Vec<StoredMediaItem>, request: PageRequest) -> Self {
        let PageRequest { page, limit } = request;
        let total = items.len();
        let start = (page - 1).saturating_mul(limit);
        let end = page.saturating_mul(limit);

        let next = (end < total).then_some(PageRef {
            page: page + 1,
            limit,
        });
        let previous = (start > 0).then_some(PageRef {
            page: page - 1,
            limit,
        });

        let results = items
            .into_iter()
            .skip(start)
            .take(limit)
            .collect::<Vec<_>>();

        Self {
            next,
            previous,
            total,
            pages: total.div_ceil(limit),
            current_page: page,
            results,
        }
    }
}
