pub mod favorites;
pub mod page;
pub mod run;
