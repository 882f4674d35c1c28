pub mod config;
pub mod error;
pub mod gesture;
pub mod navigation;
pub mod page;
pub mod settings;

pub use config::{AppConfig, GestureConfig};
pub use error::{Error, PageError, PageErrorKind, Result};
pub use gesture::{GestureClassifier, SwipeDirection};
pub use navigation::{Direction, NavState, NavigationController};
pub use page::{PageCache, PageId, PageKey, PageResponse, PageSource};
pub use settings::{SettingKey, SettingValue, Settings, SettingsService, SettingsStore};
