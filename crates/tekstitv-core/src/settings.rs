use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::page::PageId;

/// Aspect ratio hint for the page view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenRatio {
    #[serde(rename = "full")]
    Full,
    #[serde(rename = "16:9")]
    SixteenNine,
    #[serde(rename = "11:8")]
    ElevenEight,
    #[serde(rename = "4:3")]
    FourThree,
    #[serde(rename = "3:2")]
    ThreeTwo,
    #[serde(rename = "1:1")]
    OneOne,
    #[serde(rename = "golden")]
    Golden,
}

impl ScreenRatio {
    /// Width/height factor, `None` for the unconstrained full view
    pub fn factor(self) -> Option<f32> {
        match self {
            ScreenRatio::Full => None,
            ScreenRatio::SixteenNine => Some(16.0 / 9.0),
            ScreenRatio::ElevenEight => Some(11.0 / 8.0),
            ScreenRatio::FourThree => Some(4.0 / 3.0),
            ScreenRatio::ThreeTwo => Some(3.0 / 2.0),
            ScreenRatio::OneOne => Some(1.0),
            ScreenRatio::Golden => Some(1.618),
        }
    }
}

/// Marker drawn next to favorite entries in the link bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteIcon {
    Heart,
    Star,
    None,
}

/// User settings, persisted one key at a time through a `SettingsStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub show_links: bool,
    pub highlight_links: bool,
    pub screen_ratio: ScreenRatio,
    pub favorite_icon: FavoriteIcon,
    /// Sorted; when non-empty it replaces the generated link list
    pub favorites: Vec<PageId>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_links: true,
            highlight_links: false,
            screen_ratio: ScreenRatio::ThreeTwo,
            favorite_icon: FavoriteIcon::Heart,
            favorites: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ShowLinks,
    HighlightLinks,
    ScreenRatio,
    FavoriteIcon,
    Favorites,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::ShowLinks,
        SettingKey::HighlightLinks,
        SettingKey::ScreenRatio,
        SettingKey::FavoriteIcon,
        SettingKey::Favorites,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ShowLinks => "show_links",
            SettingKey::HighlightLinks => "highlight_links",
            SettingKey::ScreenRatio => "screen_ratio",
            SettingKey::FavoriteIcon => "favorite_icon",
            SettingKey::Favorites => "favorites",
        }
    }
}

/// A setting value tagged with its type.
///
/// Each key has exactly one accepted variant; the pairing is validated at
/// the store boundary instead of letting loosely-typed values drift in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Ratio(ScreenRatio),
    Icon(FavoriteIcon),
    Pages(Vec<PageId>),
}

impl Settings {
    /// Read one setting as a tagged value
    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::ShowLinks => SettingValue::Bool(self.show_links),
            SettingKey::HighlightLinks => SettingValue::Bool(self.highlight_links),
            SettingKey::ScreenRatio => SettingValue::Ratio(self.screen_ratio),
            SettingKey::FavoriteIcon => SettingValue::Icon(self.favorite_icon),
            SettingKey::Favorites => SettingValue::Pages(self.favorites.clone()),
        }
    }

    /// Apply one setting, rejecting a key/value type mismatch.
    /// Favorites are normalized to sorted, duplicate-free form.
    pub fn apply(&mut self, key: SettingKey, value: SettingValue) -> Result<()> {
        match (key, value) {
            (SettingKey::ShowLinks, SettingValue::Bool(v)) => self.show_links = v,
            (SettingKey::HighlightLinks, SettingValue::Bool(v)) => self.highlight_links = v,
            (SettingKey::ScreenRatio, SettingValue::Ratio(v)) => self.screen_ratio = v,
            (SettingKey::FavoriteIcon, SettingValue::Icon(v)) => self.favorite_icon = v,
            (SettingKey::Favorites, SettingValue::Pages(mut pages)) => {
                pages.sort();
                pages.dedup();
                self.favorites = pages;
            }
            (key, value) => {
                return Err(Error::Settings(format!(
                    "type mismatch for {}: {:?}",
                    key.as_str(),
                    value
                )));
            }
        }
        Ok(())
    }
}

fn value_to_json(value: &SettingValue) -> serde_json::Value {
    match value {
        SettingValue::Bool(v) => serde_json::json!(v),
        SettingValue::Ratio(v) => serde_json::to_value(v).expect("ratio serializes"),
        SettingValue::Icon(v) => serde_json::to_value(v).expect("icon serializes"),
        SettingValue::Pages(v) => serde_json::to_value(v).expect("pages serialize"),
    }
}

fn value_from_json(key: SettingKey, json: &serde_json::Value) -> Result<SettingValue> {
    let mismatch = || Error::Settings(format!("invalid stored value for {}", key.as_str()));

    match key {
        SettingKey::ShowLinks | SettingKey::HighlightLinks => {
            json.as_bool().map(SettingValue::Bool).ok_or_else(mismatch)
        }
        SettingKey::ScreenRatio => serde_json::from_value(json.clone())
            .map(SettingValue::Ratio)
            .map_err(|_| mismatch()),
        SettingKey::FavoriteIcon => serde_json::from_value(json.clone())
            .map(SettingValue::Icon)
            .map_err(|_| mismatch()),
        SettingKey::Favorites => serde_json::from_value(json.clone())
            .map(SettingValue::Pages)
            .map_err(|_| mismatch()),
    }
}

/// Best-effort persistent key-value store for settings
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: SettingKey) -> Result<Option<SettingValue>>;
    fn set(&self, key: SettingKey, value: &SettingValue) -> Result<()>;
}

/// Settings persisted as a single JSON object on disk
pub struct JsonSettingsStore {
    path: PathBuf,
    map: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl JsonSettingsStore {
    /// Open the store, starting empty when the file does not exist yet
    pub fn open(path: PathBuf) -> Result<Self> {
        let map = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            map: Mutex::new(map),
        })
    }

    fn persist(&self, map: &BTreeMap<String, serde_json::Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get(&self, key: SettingKey) -> Result<Option<SettingValue>> {
        let map = self.map.lock().unwrap();
        map.get(key.as_str())
            .map(|json| value_from_json(key, json))
            .transpose()
    }

    fn set(&self, key: SettingKey, value: &SettingValue) -> Result<()> {
        let mut map = self.map.lock().unwrap();
        map.insert(key.as_str().to_string(), value_to_json(value));
        self.persist(&map)
    }
}

/// Volatile store for tests and ephemeral sessions
#[derive(Default)]
pub struct MemorySettingsStore {
    map: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: SettingKey) -> Result<Option<SettingValue>> {
        let map = self.map.lock().unwrap();
        map.get(key.as_str())
            .map(|json| value_from_json(key, json))
            .transpose()
    }

    fn set(&self, key: SettingKey, value: &SettingValue) -> Result<()> {
        let mut map = self.map.lock().unwrap();
        map.insert(key.as_str().to_string(), value_to_json(value));
        Ok(())
    }
}

/// Owns the in-memory settings and broadcasts changes to views.
///
/// Writes are optimistic: the in-memory value is applied and published
/// first, a persistence failure is logged and never rolled back or
/// surfaced. Mutations read-modify-write the latest published value, so
/// concurrent updaters (link bar, navbar) cannot lose each other's
/// changes to a stale captured copy.
pub struct SettingsService {
    store: Box<dyn SettingsStore>,
    tx: watch::Sender<Settings>,
}

impl SettingsService {
    /// Load persisted settings, falling back per key to defaults
    pub fn load(store: Box<dyn SettingsStore>) -> Self {
        let mut settings = Settings::default();

        for key in SettingKey::ALL {
            match store.get(key) {
                Ok(Some(value)) => {
                    if let Err(e) = settings.apply(key, value) {
                        tracing::warn!("Ignoring stored setting {}: {}", key.as_str(), e);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to read setting {}: {}", key.as_str(), e);
                }
            }
        }

        let (tx, _rx) = watch::channel(settings);
        Self { store, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    /// Apply and persist one setting. Returns an error only for a
    /// key/value type mismatch; persistence failures are logged.
    pub fn update(&self, key: SettingKey, value: SettingValue) -> Result<()> {
        let mut applied = Ok(());
        self.tx.send_modify(|settings| {
            applied = settings.apply(key, value.clone());
        });
        applied?;

        if let Err(e) = self.store.set(key, &value) {
            tracing::warn!("Failed to persist setting {}: {}", key.as_str(), e);
        }
        Ok(())
    }

    /// Add or remove a favorite page. Idempotent per direction; the set
    /// stays sorted.
    pub fn toggle_favorite(&self, page: PageId) {
        let mut favorites = Vec::new();
        self.tx.send_modify(|settings| {
            if let Some(pos) = settings.favorites.iter().position(|fav| *fav == page) {
                settings.favorites.remove(pos);
            } else {
                settings.favorites.push(page);
                settings.favorites.sort();
            }
            favorites = settings.favorites.clone();
        });

        if let Err(e) = self
            .store
            .set(SettingKey::Favorites, &SettingValue::Pages(favorites))
        {
            tracing::warn!("Failed to persist favorites: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: u16) -> PageId {
        PageId::new(n).unwrap()
    }

    #[test]
    fn test_apply_rejects_type_mismatch() {
        let mut settings = Settings::default();
        let result = settings.apply(SettingKey::ShowLinks, SettingValue::Pages(vec![]));
        assert!(result.is_err());
        assert!(settings.show_links, "mismatch must not alter state");
    }

    #[test]
    fn test_apply_normalizes_favorites() {
        let mut settings = Settings::default();
        settings
            .apply(
                SettingKey::Favorites,
                SettingValue::Pages(vec![page(300), page(150), page(300)]),
            )
            .unwrap();
        assert_eq!(settings.favorites, vec![page(150), page(300)]);
    }

    #[test]
    fn test_screen_ratio_factor() {
        assert!(ScreenRatio::Full.factor().is_none());
        let wide = ScreenRatio::SixteenNine.factor().unwrap();
        let square = ScreenRatio::OneOne.factor().unwrap();
        assert!(wide > square);
    }

    #[test]
    fn test_store_roundtrip() {
        let store = MemorySettingsStore::new();
        store
            .set(SettingKey::ScreenRatio, &SettingValue::Ratio(ScreenRatio::FourThree))
            .unwrap();

        let value = store.get(SettingKey::ScreenRatio).unwrap().unwrap();
        assert_eq!(value, SettingValue::Ratio(ScreenRatio::FourThree));

        assert!(store.get(SettingKey::Favorites).unwrap().is_none());
    }

    #[test]
    fn test_service_loads_persisted_values() {
        let store = MemorySettingsStore::new();
        store
            .set(SettingKey::ShowLinks, &SettingValue::Bool(false))
            .unwrap();
        store
            .set(
                SettingKey::Favorites,
                &SettingValue::Pages(vec![page(201), page(150)]),
            )
            .unwrap();

        let service = SettingsService::load(Box::new(store));
        let settings = service.current();
        assert!(!settings.show_links);
        assert_eq!(settings.favorites, vec![page(150), page(201)]);
    }

    #[test]
    fn test_toggle_favorite_roundtrip() {
        let service = SettingsService::load(Box::new(MemorySettingsStore::new()));
        let before = service.current().favorites;

        service.toggle_favorite(page(150));
        assert_eq!(service.current().favorites, vec![page(150)]);

        service.toggle_favorite(page(150));
        assert_eq!(service.current().favorites, before);
    }

    #[test]
    fn test_toggle_favorite_keeps_sorted() {
        let service = SettingsService::load(Box::new(MemorySettingsStore::new()));
        service.toggle_favorite(page(300));
        service.toggle_favorite(page(150));
        service.toggle_favorite(page(200));
        assert_eq!(
            service.current().favorites,
            vec![page(150), page(200), page(300)]
        );
    }

    #[test]
    fn test_json_store_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!(
            "tekstitv-settings-test-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let store = JsonSettingsStore::open(path.clone()).unwrap();
            store
                .set(SettingKey::HighlightLinks, &SettingValue::Bool(true))
                .unwrap();
        }

        let store = JsonSettingsStore::open(path.clone()).unwrap();
        let value = store.get(SettingKey::HighlightLinks).unwrap().unwrap();
        assert_eq!(value, SettingValue::Bool(true));

        let _ = std::fs::remove_file(&path);
    }
}
