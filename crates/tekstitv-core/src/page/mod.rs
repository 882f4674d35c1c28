pub mod cache;
pub mod models;
pub mod source;

pub use cache::{FetchOutcome, PageCache};
pub use models::{PageId, PageKey, PageResponse};
pub use source::{HttpPageSource, PageSource};
