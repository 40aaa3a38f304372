use tracing::warn;

use super::{KeyValueStore, StorageError, THEME_KEY};
use crate::models::Theme;

/// Reads the stored theme. Absent, unknown or unreadable values fall back to dark.
pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_else(|| {
            warn!("Unknown stored theme '{raw}', using default");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            warn!("Failed to read theme preference: {e}");
            Theme::default()
        }
    }
}

pub fn save_theme(store: &dyn KeyValueStore, theme: Theme) -> Result<(), StorageError> {
    store.set(THEME_KEY, theme.as_str())
}
