pub mod category;
pub mod listing;
pub mod media;
pub mod mime;

pub use category::{MediaCategory, ParseCategoryError};
pub use listing::{MediaPage, PageRef, PageRequest, SortKey};
pub use media::StoredMediaItem;
pub use mime::{content_type_for_filename, extension_for_mime, extension_of};
