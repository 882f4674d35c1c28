pub mod controller;
pub mod history;
pub mod links;
pub mod subpage;

pub use controller::{NavState, NavigationController};
pub use history::HistoryStack;
pub use links::link_targets;
pub use subpage::next_sub_page;

/// Paging direction shared by page and subpage navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Back,
}
