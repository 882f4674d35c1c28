pub mod app;
pub mod event;
pub mod input;
pub mod theme;
pub mod widgets;
