//! Export, import and reset of the persisted panel configuration
//!
//! The export document carries the tool and favorites lists as the raw strings
//! found in the store, so an import writes back exactly the bytes exported.

use super::DisplaySettings;
use crate::error::{PanelError, StoreError};
use crate::favorites::FavoriteEntry;
use crate::store::{keys, PreferenceStore};
use crate::tools::ToolShortcut;
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: &str = "1.0";

/// Suggested file name for exports
pub const EXPORT_FILE_NAME: &str = "brush-toolbar-config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigBundle {
    pub version: String,
    /// Raw `user_custom_tools` value
    #[serde(default)]
    pub tools: Option<String>,
    /// Raw `brush_favorites` value
    #[serde(default)]
    pub brush_presets: Option<String>,
    #[serde(default)]
    pub display_settings: Option<DisplaySettings>,
}

/// Serialize the current configuration as a pretty-printed document
pub fn export_config<S: PreferenceStore>(
    store: &S,
    display: &DisplaySettings,
) -> Result<String, PanelError> {
    let bundle = ConfigBundle {
        version: CONFIG_VERSION.to_string(),
        tools: store.get(keys::TOOLS),
        brush_presets: store.get(keys::FAVORITES),
        display_settings: Some(*display),
    };
    let json = serde_json::to_string_pretty(&bundle).map_err(StoreError::from)?;
    tracing::info!("[Settings] Exported configuration ({} bytes)", json.len());
    Ok(json)
}

/// Apply an exported document to the store
///
/// Everything is validated before the first write: a malformed document, or
/// embedded lists that do not parse, leave the store untouched. A store
/// failure part way through restores the keys already written. Returns the
/// imported display settings, if the document had any.
pub fn import_config<S: PreferenceStore>(
    store: &S,
    document: &str,
) -> Result<Option<DisplaySettings>, PanelError> {
    let bundle: ConfigBundle = serde_json::from_str(document)
        .map_err(|e| PanelError::InvalidImport(format!("not a config document: {}", e)))?;

    if let Some(tools) = &bundle.tools {
        serde_json::from_str::<Vec<ToolShortcut>>(tools)
            .map_err(|e| PanelError::InvalidImport(format!("tool list is malformed: {}", e)))?;
    }
    if let Some(favorites) = &bundle.brush_presets {
        serde_json::from_str::<Vec<FavoriteEntry>>(favorites).map_err(|e| {
            PanelError::InvalidImport(format!("favorites list is malformed: {}", e))
        })?;
    }

    let mut writes = Vec::with_capacity(3);
    if let Some(tools) = &bundle.tools {
        writes.push((keys::TOOLS, tools.clone()));
    }
    if let Some(favorites) = &bundle.brush_presets {
        writes.push((keys::FAVORITES, favorites.clone()));
    }
    if let Some(display) = &bundle.display_settings {
        let encoded = serde_json::to_string(display).map_err(StoreError::from)?;
        writes.push((keys::DISPLAY_SETTINGS, encoded));
    }
    write_all(store, &writes)?;

    tracing::info!("[Settings] Imported configuration version {}", bundle.version);
    Ok(bundle.display_settings)
}

/// Write every pair or none of them
///
/// On a failed write the keys already written get their previous raw values
/// back (or are removed again if they were absent).
fn write_all<S: PreferenceStore>(store: &S, writes: &[(&str, String)]) -> Result<(), StoreError> {
    let previous: Vec<Option<String>> = writes.iter().map(|(key, _)| store.get(key)).collect();

    for (written, (key, value)) in writes.iter().enumerate() {
        let Err(e) = store.set(key, value) else {
            continue;
        };
        tracing::warn!("[Settings] Import failed writing `{}`, rolling back: {}", key, e);
        for ((key, _), old) in writes.iter().zip(&previous).take(written) {
            let restored = match old {
                Some(old) => store.set(key, old),
                None => store.remove(key),
            };
            if let Err(e) = restored {
                tracing::error!("[Settings] Failed to restore `{}`: {}", key, e);
            }
        }
        return Err(e);
    }
    Ok(())
}

/// Forget tools, favorites and view mode; restore default display settings
pub fn reset_to_defaults<S: PreferenceStore>(store: &S) -> Result<DisplaySettings, PanelError> {
    store.remove(keys::TOOLS)?;
    store.remove(keys::FAVORITES)?;
    store.remove(keys::VIEW_MODE)?;

    let display = DisplaySettings::default();
    display.save(store);
    tracing::info!("[Settings] Reset to defaults");
    Ok(display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const TOOLS: &str = "[{\"id\":\"brush\",\"type\":\"brush\",\"name\":\"Brush\"}]";
    const FAVORITES: &str =
        "[ {\"id\":\"17\", \"name\":\"Soft Round\",\"type\":\"brush\",\"toolId\":\"brush\"} ]";

    #[test]
    fn test_export_import_preserves_raw_strings() {
        let source = MemoryStore::new();
        source.set(keys::TOOLS, TOOLS).unwrap();
        source.set(keys::FAVORITES, FAVORITES).unwrap();
        let display = DisplaySettings {
            show_toolbar: true,
            show_presets: false,
            show_advanced: true,
        };

        let document = export_config(&source, &display).unwrap();
        let target = MemoryStore::new();
        let imported = import_config(&target, &document).unwrap();

        assert_eq!(target.get(keys::TOOLS).as_deref(), Some(TOOLS));
        assert_eq!(target.get(keys::FAVORITES).as_deref(), Some(FAVORITES));
        assert_eq!(imported, Some(display));
        assert_eq!(DisplaySettings::load(&target), display);
    }

    #[test]
    fn test_export_document_shape() {
        let store = MemoryStore::new();
        let document = export_config(&store, &DisplaySettings::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();

        assert_eq!(value["version"], CONFIG_VERSION);
        assert!(value["tools"].is_null());
        assert!(value["brushPresets"].is_null());
        assert_eq!(value["displaySettings"]["showToolbar"], true);
    }

    #[test]
    fn test_invalid_document_leaves_store_untouched() {
        let store = MemoryStore::new();
        store.set(keys::TOOLS, TOOLS).unwrap();
        let writes = store.write_count();

        let err = import_config(&store, "{ definitely not json").unwrap_err();
        assert!(matches!(err, PanelError::InvalidImport(_)));

        let half_bad = r#"{"version":"1.0","tools":"[]","brushPresets":"[{oops"}"#;
        assert!(import_config(&store, half_bad).is_err());

        assert_eq!(store.write_count(), writes);
        assert_eq!(store.get(keys::TOOLS).as_deref(), Some(TOOLS));
    }

    #[test]
    fn test_failed_write_rolls_back_import() {
        let store = MemoryStore::new();
        store.set(keys::TOOLS, TOOLS).unwrap();
        store.set(keys::FAVORITES, FAVORITES).unwrap();

        let document = r#"{
            "version": "1.0",
            "tools": "[]",
            "brushPresets": "[]",
            "displaySettings": {"showToolbar": false, "showPresets": false, "showAdvanced": false}
        }"#;
        // The tool list goes through, the favorites write fails
        store.fail_write_number(store.attempt_count() + 2);

        let err = import_config(&store, document).unwrap_err();
        assert!(matches!(err, PanelError::Store(_)));
        assert_eq!(store.get(keys::TOOLS).as_deref(), Some(TOOLS));
        assert_eq!(store.get(keys::FAVORITES).as_deref(), Some(FAVORITES));
        assert_eq!(store.get(keys::DISPLAY_SETTINGS), None);
    }

    #[test]
    fn test_failed_display_write_removes_new_keys() {
        let store = MemoryStore::new();
        let document = r#"{"version":"1.0","tools":"[]","brushPresets":"[]",
            "displaySettings":{"showToolbar":true,"showPresets":true,"showAdvanced":false}}"#;
        store.fail_write_number(store.attempt_count() + 3);

        assert!(import_config(&store, document).is_err());
        assert_eq!(store.get(keys::TOOLS), None);
        assert_eq!(store.get(keys::FAVORITES), None);
        assert_eq!(store.get(keys::DISPLAY_SETTINGS), None);
    }

    #[test]
    fn test_reset_clears_lists_and_restores_display() {
        let store = MemoryStore::new();
        store.set(keys::TOOLS, TOOLS).unwrap();
        store.set(keys::FAVORITES, FAVORITES).unwrap();
        store.set(keys::VIEW_MODE, "detail").unwrap();
        store.set(keys::LANGUAGE, "ja").unwrap();

        let display = reset_to_defaults(&store).unwrap();

        assert_eq!(display, DisplaySettings::default());
        assert_eq!(store.get(keys::TOOLS), None);
        assert_eq!(store.get(keys::FAVORITES), None);
        assert_eq!(store.get(keys::VIEW_MODE), None);
        assert_eq!(store.get(keys::LANGUAGE).as_deref(), Some("ja"));
    }
}
