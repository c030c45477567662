//! Display settings, view mode and language preference

mod transfer;

pub use transfer::{
    export_config, import_config, reset_to_defaults, ConfigBundle, CONFIG_VERSION,
    EXPORT_FILE_NAME,
};

use crate::store::{self, keys, PreferenceStore, Stored};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which panel sections are visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub show_toolbar: bool,
    pub show_presets: bool,
    pub show_advanced: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_toolbar: true,
            show_presets: true,
            show_advanced: true,
        }
    }
}

impl DisplaySettings {
    pub fn load<S: PreferenceStore>(store: &S) -> Self {
        match store::read_json(store, keys::DISPLAY_SETTINGS) {
            Stored::Value(settings) => settings,
            Stored::Missing | Stored::Corrupt => Self::default(),
        }
    }

    pub fn save<S: PreferenceStore>(&self, store: &S) -> bool {
        store::write_json(store, keys::DISPLAY_SETTINGS, self)
    }
}

/// Layout of the favorites grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Minimal,
    Detail,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Minimal => "minimal",
            ViewMode::Detail => "detail",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Minimal => ViewMode::Detail,
            ViewMode::Detail => ViewMode::Minimal,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_matches('"') {
            "minimal" => Some(ViewMode::Minimal),
            "detail" => Some(ViewMode::Detail),
            _ => None,
        }
    }

    /// Stored as the bare word; a JSON-quoted word is accepted too
    pub fn load<S: PreferenceStore>(store: &S) -> Self {
        store
            .get(keys::VIEW_MODE)
            .and_then(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    pub fn save<S: PreferenceStore>(&self, store: &S) -> bool {
        match store.set(keys::VIEW_MODE, self.as_str()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[Settings] Failed to persist view mode: {}", e);
                false
            }
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown view mode `{}`", s))
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Languages with a translation table
pub const SUPPORTED_LANGUAGES: [&str; 3] = ["zh", "en", "ja"];

const FALLBACK_LANGUAGE: &str = "en";

/// The user's language choice
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LanguageSetting {
    /// Follow the system locale
    #[default]
    Auto,
    Code(String),
}

impl LanguageSetting {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_matches('"');
        if raw == "auto" {
            return Some(Self::Auto);
        }
        let valid = !raw.is_empty()
            && raw.len() <= 16
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self::Code(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            LanguageSetting::Auto => "auto",
            LanguageSetting::Code(code) => code,
        }
    }

    pub fn load<S: PreferenceStore>(store: &S) -> Self {
        store
            .get(keys::LANGUAGE)
            .and_then(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    pub fn save<S: PreferenceStore>(&self, store: &S) -> bool {
        match store.set(keys::LANGUAGE, self.as_str()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[Settings] Failed to persist language: {}", e);
                false
            }
        }
    }

    /// Pick the language to display
    ///
    /// An explicit supported choice wins, then the primary subtag of the
    /// system locale (`zh-CN` -> `zh`), then English.
    pub fn resolve(&self, system_locale: Option<&str>) -> &'static str {
        if let LanguageSetting::Code(code) = self {
            if let Some(lang) = supported(code) {
                return lang;
            }
        }

        system_locale
            .and_then(|locale| locale.split(['-', '_']).next())
            .map(str::to_ascii_lowercase)
            .and_then(|primary| supported(&primary))
            .unwrap_or(FALLBACK_LANGUAGE)
    }
}

impl std::str::FromStr for LanguageSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid language code `{}`", s))
    }
}

fn supported(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES.into_iter().find(|lang| *lang == code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_corrupt_values_load_defaults() {
        let store = MemoryStore::new();
        store.set(keys::DISPLAY_SETTINGS, "{\"showToolbar\":").unwrap();
        store.set(keys::VIEW_MODE, "{]").unwrap();
        store.set(keys::LANGUAGE, "{\"bad\": true}").unwrap();

        assert_eq!(DisplaySettings::load(&store), DisplaySettings::default());
        assert_eq!(ViewMode::load(&store), ViewMode::Minimal);
        assert_eq!(LanguageSetting::load(&store), LanguageSetting::Auto);
    }

    #[test]
    fn test_missing_values_load_defaults() {
        let store = MemoryStore::new();
        let display = DisplaySettings::load(&store);
        assert!(display.show_toolbar && display.show_presets && display.show_advanced);
        assert_eq!(ViewMode::load(&store), ViewMode::Minimal);
        assert_eq!(LanguageSetting::load(&store).as_str(), "auto");
    }

    #[test]
    fn test_display_settings_round_trip() {
        let store = MemoryStore::new();
        let settings = DisplaySettings {
            show_toolbar: false,
            show_presets: true,
            show_advanced: false,
        };
        assert!(settings.save(&store));
        assert_eq!(
            store.get(keys::DISPLAY_SETTINGS).as_deref(),
            Some(r#"{"showToolbar":false,"showPresets":true,"showAdvanced":false}"#)
        );
        assert_eq!(DisplaySettings::load(&store), settings);
    }

    #[test]
    fn test_view_mode_stored_as_bare_word() {
        let store = MemoryStore::new();
        assert!(ViewMode::Minimal.toggled().save(&store));
        assert_eq!(store.get(keys::VIEW_MODE).as_deref(), Some("detail"));
        assert_eq!(ViewMode::load(&store), ViewMode::Detail);

        store.set(keys::VIEW_MODE, "\"detail\"").unwrap();
        assert_eq!(ViewMode::load(&store), ViewMode::Detail);
    }

    #[test]
    fn test_language_resolution() {
        assert_eq!(LanguageSetting::Code("ja".into()).resolve(Some("en-US")), "ja");
        assert_eq!(LanguageSetting::Auto.resolve(Some("zh-CN")), "zh");
        assert_eq!(LanguageSetting::Auto.resolve(Some("fr_FR")), "en");
        assert_eq!(LanguageSetting::Code("de".into()).resolve(Some("JA")), "ja");
        assert_eq!(LanguageSetting::Auto.resolve(None), "en");
    }

    #[test]
    fn test_language_round_trip() {
        let store = MemoryStore::new();
        let setting: LanguageSetting = "zh".parse().unwrap();
        assert!(setting.save(&store));
        assert_eq!(store.get(keys::LANGUAGE).as_deref(), Some("zh"));
        assert_eq!(LanguageSetting::load(&store), setting);
    }
}
