use anyhow::{anyhow, Result};

use tekstitv_core::settings::JsonSettingsStore;
use tekstitv_core::{AppConfig, PageId, SettingKey, SettingValue, SettingsStore};

fn open_store(config: &AppConfig) -> Result<JsonSettingsStore> {
    Ok(JsonSettingsStore::open(config.settings_path())?)
}

fn load_favorites(store: &JsonSettingsStore) -> Result<Vec<PageId>> {
    match store.get(SettingKey::Favorites)? {
        Some(SettingValue::Pages(pages)) => Ok(pages),
        Some(_) => Err(anyhow!("favorites entry has the wrong type")),
        None => Ok(Vec::new()),
    }
}

fn save_favorites(store: &JsonSettingsStore, mut pages: Vec<PageId>) -> Result<()> {
    pages.sort();
    pages.dedup();
    store.set(SettingKey::Favorites, &SettingValue::Pages(pages))?;
    Ok(())
}

fn parse_page(number: &str) -> Result<PageId> {
    PageId::parse(number)
        .ok_or_else(|| anyhow!("invalid page number '{}' (expected 100-999)", number))
}

pub fn list(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    let favorites = load_favorites(&store)?;

    if favorites.is_empty() {
        println!("No favorites yet. Add one with: tekstitv favorites add <page>");
        return Ok(());
    }

    for page in favorites {
        println!("{}", page);
    }
    Ok(())
}

pub fn add(config: &AppConfig, number: &str) -> Result<()> {
    let page = parse_page(number)?;
    let store = open_store(config)?;
    let mut favorites = load_favorites(&store)?;

    if favorites.contains(&page) {
        println!("{} is already a favorite", page);
        return Ok(());
    }

    favorites.push(page);
    save_favorites(&store, favorites)?;
    println!("Added {}", page);
    Ok(())
}

pub fn remove(config: &AppConfig, number: &str) -> Result<()> {
    let page = parse_page(number)?;
    let store = open_store(config)?;
    let favorites = load_favorites(&store)?;

    if !favorites.contains(&page) {
        println!("{} is not a favorite", page);
        return Ok(());
    }

    let favorites = favorites.into_iter().filter(|fav| *fav != page).collect();
    save_favorites(&store, favorites)?;
    println!("Removed {}", page);
    Ok(())
}
