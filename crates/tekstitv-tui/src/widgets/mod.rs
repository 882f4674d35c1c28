pub mod header;
pub mod links_bar;
pub mod page_view;

pub use header::HeaderWidget;
pub use links_bar::LinksBarWidget;
pub use page_view::PageViewWidget;
