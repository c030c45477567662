//! Favorites registry
//!
//! Pinned brush and tool presets, each remembered together with the tool
//! shortcut that was active when it was pinned. The user only ever sees the
//! entries of one tool at a time, so every positional operation coming from a
//! filtered view is translated back to the master list by entry identity.

use crate::ids::IdGenerator;
use crate::store::{self, keys, PreferenceStore, Stored};
use serde::{Deserialize, Serialize};

/// Tool shortcut id assumed for entries saved without one
pub const DEFAULT_TOOL_ID: &str = "brush";

/// Tag color used when the user does not pick one
pub const DEFAULT_TAG_COLOR: &str = "#cccccc";

/// What kind of host preset a favorite re-selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresetKind {
    #[default]
    Brush,
    ToolPreset,
}

impl PresetKind {
    /// Host reference class for selecting a preset of this kind by name
    pub fn host_ref(&self) -> &'static str {
        match self {
            PresetKind::Brush => "brush",
            PresetKind::ToolPreset => "toolPreset",
        }
    }
}

/// A preset as identified by the host: enough to select it again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub kind: PresetKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub id: String,
    /// Must match a real host preset name
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: PresetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
}

impl FavoriteEntry {
    /// The tool this entry is shown under
    pub fn tool_id(&self) -> &str {
        self.tool_id.as_deref().unwrap_or(DEFAULT_TOOL_ID)
    }

    /// Short label drawn when the entry has no icon
    pub fn monogram(&self, chars: usize) -> String {
        self.name.chars().take(chars).collect()
    }

    pub fn preset(&self) -> PresetInfo {
        PresetInfo {
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}

/// A preset confirmed against the host and about to be pinned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteCandidate {
    pub name: String,
    pub kind: PresetKind,
    pub tool_id: String,
}

/// Result of activating an entry while a swap source may be pending
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Swap mode was off: the entry should be selected in the host
    Select(PresetInfo),
    /// The swap source was activated again; swap mode is off
    SwapCancelled,
    /// Two entries traded places
    Swapped,
    /// The id is not in the registry
    Unknown,
}

pub struct FavoritesRegistry<S: PreferenceStore> {
    store: S,
    entries: Vec<FavoriteEntry>,
    ids: IdGenerator,
    selected: Option<String>,
    swap_source: Option<String>,
}

impl<S: PreferenceStore> FavoritesRegistry<S> {
    /// Seed from the store; a missing or corrupt blob loads as empty
    pub fn load(store: S) -> Self {
        let entries = match store::read_json(&store, keys::FAVORITES) {
            Stored::Value(entries) => entries,
            Stored::Missing | Stored::Corrupt => Vec::new(),
        };
        tracing::debug!("[Favorites] Loaded {} entries", entries.len());

        Self {
            store,
            entries,
            ids: IdGenerator::new(),
            selected: None,
            swap_source: None,
        }
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&FavoriteEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Entries shown under `tool_id`, in master-list order
    pub fn filter_by_tool(&self, tool_id: &str) -> Vec<&FavoriteEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.tool_id() == tool_id)
            .collect()
    }

    /// Pin a preset; the caller has already checked it exists in the host
    pub fn add(
        &mut self,
        candidate: FavoriteCandidate,
        icon_key: Option<&str>,
        color: Option<&str>,
    ) -> FavoriteEntry {
        let entries = &self.entries;
        let id = self
            .ids
            .next_token(|token| entries.iter().any(|entry| entry.id == token));

        let entry = FavoriteEntry {
            id,
            name: candidate.name,
            kind: candidate.kind,
            icon_key: icon_key.filter(|key| !key.is_empty()).map(str::to_string),
            color: Some(color.unwrap_or(DEFAULT_TAG_COLOR).to_string()),
            tool_id: Some(candidate.tool_id),
        };
        tracing::info!(
            "[Favorites] Pinned `{}` under tool `{}`",
            entry.name,
            entry.tool_id()
        );

        self.entries.push(entry.clone());
        self.persist();
        entry
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.entries.remove(index);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.swap_source.as_deref() == Some(id) {
            self.swap_source = None;
        }
        self.persist();
        true
    }

    /// Move the entry at `from` to `to` in the master list
    ///
    /// Everything else keeps its relative order. Equal or out-of-range
    /// indices leave the list (and the store) untouched.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.entries.len() || to >= self.entries.len() {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.persist();
        true
    }

    /// Reorder within the view filtered by `tool_id`
    ///
    /// The dragged entry (view index `from`) is moved to the master position
    /// of the entry it was dropped on (view index `to`).
    pub fn reorder_in_view(&mut self, tool_id: &str, from: usize, to: usize) -> bool {
        if from == to {
            return false;
        }
        let (dragged, target) = {
            let view = self.filter_by_tool(tool_id);
            match (view.get(from), view.get(to)) {
                (Some(dragged), Some(target)) => (dragged.id.clone(), target.id.clone()),
                _ => return false,
            }
        };
        self.reorder_by_id(&dragged, &target)
    }

    /// Drop `dragged` onto the master position of `target`
    pub fn reorder_by_id(&mut self, dragged: &str, target: &str) -> bool {
        match (self.position(dragged), self.position(target)) {
            (Some(from), Some(to)) => self.reorder(from, to),
            _ => false,
        }
    }

    /// Exchange two entries in place
    ///
    /// Swapping an entry with itself changes nothing but leaves swap mode.
    pub fn swap(&mut self, a: &str, b: &str) -> bool {
        if a == b {
            self.swap_source = None;
            return false;
        }
        match (self.position(a), self.position(b)) {
            (Some(i), Some(j)) => {
                self.entries.swap(i, j);
                self.persist();
                true
            }
            _ => false,
        }
    }

    /// Enter swap mode with `id` as the source
    pub fn begin_swap(&mut self, id: &str) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.swap_source = Some(id.to_string());
        true
    }

    pub fn swap_source(&self) -> Option<&str> {
        self.swap_source.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Handle a click on an entry
    ///
    /// In swap mode the click completes or cancels the swap; otherwise the
    /// entry becomes the selection and its preset is returned for the host.
    pub fn activate(&mut self, id: &str) -> Activation {
        if let Some(source) = self.swap_source.take() {
            if source == id {
                return Activation::SwapCancelled;
            }
            return if self.swap(&source, id) {
                Activation::Swapped
            } else {
                Activation::Unknown
            };
        }

        match self.get(id).map(FavoriteEntry::preset) {
            Some(preset) => {
                self.selected = Some(id.to_string());
                Activation::Select(preset)
            }
            None => Activation::Unknown,
        }
    }

    fn persist(&self) {
        store::write_json(&self.store, keys::FAVORITES, &self.entries);
    }
}
