//! Panel orchestrator
//!
//! Single owner of everything the panel shows: both registries, the settings,
//! the tool dialog state and the sync engine. Flows that touch more than one
//! of them (deleting the tool being edited, pinning the host's current preset
//! under the active tool) live here so their invariants hold in one place.

use crate::error::{PanelError, Result};
use crate::favorites::{Activation, FavoriteCandidate, FavoriteEntry, FavoritesRegistry};
use crate::host::HostAdapter;
use crate::settings::{self, DisplaySettings, LanguageSetting, ViewMode};
use crate::store::PreferenceStore;
use crate::sync::PropertySyncEngine;
use crate::tools::{ToolKind, ToolRegistry, ToolShortcut};

/// Open dialogs of the tool toolbar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolDialogs {
    pub library_open: bool,
    /// Shortcut whose edit dialog is open
    pub editing: Option<String>,
    /// Shortcut awaiting delete confirmation
    pub deleting: Option<String>,
}

pub struct Panel<S: PreferenceStore, H: HostAdapter> {
    store: S,
    tools: ToolRegistry<S>,
    favorites: FavoritesRegistry<S>,
    display: DisplaySettings,
    view_mode: ViewMode,
    language: LanguageSetting,
    dialogs: ToolDialogs,
    engine: PropertySyncEngine<H>,
}

impl<S: PreferenceStore, H: HostAdapter> Panel<S, H> {
    pub fn new(store: S, engine: PropertySyncEngine<H>) -> Self {
        Self {
            tools: ToolRegistry::load(store.clone()),
            favorites: FavoritesRegistry::load(store.clone()),
            display: DisplaySettings::load(&store),
            view_mode: ViewMode::load(&store),
            language: LanguageSetting::load(&store),
            dialogs: ToolDialogs::default(),
            store,
            engine,
        }
    }

    pub fn tools(&self) -> &[ToolShortcut] {
        self.tools.tools()
    }

    pub fn favorites(&self) -> &FavoritesRegistry<S> {
        &self.favorites
    }

    /// Favorites of the active tool, in master-list order
    pub fn visible_favorites(&self) -> Vec<&FavoriteEntry> {
        self.favorites.filter_by_tool(&self.engine.active_tool())
    }

    pub fn display_settings(&self) -> DisplaySettings {
        self.display
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn language(&self) -> &LanguageSetting {
        &self.language
    }

    pub fn dialogs(&self) -> &ToolDialogs {
        &self.dialogs
    }

    pub fn engine(&self) -> &PropertySyncEngine<H> {
        &self.engine
    }

    pub fn active_tool(&self) -> String {
        self.engine.active_tool()
    }

    // Tool toolbar

    pub fn open_library(&mut self) {
        self.dialogs.library_open = true;
    }

    pub fn close_library(&mut self) {
        self.dialogs.library_open = false;
    }

    /// Add a shortcut from the library and open its edit dialog
    pub fn add_tool_from_library(&mut self, kind: ToolKind) -> ToolShortcut {
        let tool = self.tools.add(kind, None);
        self.dialogs.library_open = false;
        self.dialogs.editing = Some(tool.id.clone());
        tool
    }

    pub fn begin_edit(&mut self, id: &str) -> Result<()> {
        if self.tools.get(id).is_none() {
            return Err(PanelError::UnknownTool(id.to_string()));
        }
        self.dialogs.editing = Some(id.to_string());
        Ok(())
    }

    /// Apply the edit dialog and close it
    pub fn save_edit(&mut self, name: &str, color: Option<&str>) -> Result<()> {
        let Some(id) = self.dialogs.editing.take() else {
            return Ok(());
        };
        if self.tools.edit(&id, name, color) {
            Ok(())
        } else {
            Err(PanelError::UnknownTool(id))
        }
    }

    pub fn cancel_edit(&mut self) {
        self.dialogs.editing = None;
    }

    /// Ask for confirmation before deleting `id`
    pub fn request_delete(&mut self, id: &str) -> Result<&ToolShortcut> {
        let Some(tool) = self.tools.request_delete(id) else {
            return Err(PanelError::UnknownTool(id.to_string()));
        };
        self.dialogs.deleting = Some(id.to_string());
        Ok(tool)
    }

    /// Dismiss the confirmation; an open edit dialog stays open
    pub fn cancel_delete(&mut self) {
        self.dialogs.deleting = None;
    }

    /// Delete the shortcut awaiting confirmation
    ///
    /// Closes its edit dialog too, if that is open.
    pub fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.dialogs.deleting.take() else {
            return false;
        };
        if self.dialogs.editing.as_deref() == Some(id.as_str()) {
            self.dialogs.editing = None;
        }
        self.tools.remove(&id)
    }

    pub fn reorder_tools(&mut self, dragged: &str, target: &str) -> bool {
        self.tools.reorder_by_id(dragged, target)
    }

    /// Make `id` the active shortcut and switch the host tool
    ///
    /// A failed host call is logged; the panel still switches.
    pub async fn select_tool(&mut self, id: &str) -> Result<()> {
        let kind = self
            .tools
            .get(id)
            .map(|tool| tool.kind)
            .ok_or_else(|| PanelError::UnknownTool(id.to_string()))?;

        self.engine.set_active_tool(id);
        if let Err(e) = self.engine.host().select_tool_kind(kind).await {
            tracing::warn!("[Tools] Host did not switch to {}: {}", kind, e);
        }
        Ok(())
    }

    // Favorites

    /// Pin the preset currently selected in the host under the active tool
    pub async fn add_favorite(
        &mut self,
        name: Option<&str>,
        icon_key: Option<&str>,
        color: Option<&str>,
    ) -> Result<FavoriteEntry> {
        let preset = self
            .engine
            .current_preset()
            .await
            .ok_or(PanelError::NoPresetSelected)?;

        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(preset.name.as_str())
            .to_string();
        let candidate = FavoriteCandidate {
            name,
            kind: preset.kind,
            tool_id: self.engine.active_tool(),
        };
        Ok(self.favorites.add(candidate, icon_key, color))
    }

    pub fn remove_favorite(&mut self, id: &str) -> Result<()> {
        if self.favorites.remove(id) {
            Ok(())
        } else {
            Err(PanelError::UnknownFavorite(id.to_string()))
        }
    }

    pub fn begin_swap(&mut self, id: &str) -> Result<()> {
        if self.favorites.begin_swap(id) {
            Ok(())
        } else {
            Err(PanelError::UnknownFavorite(id.to_string()))
        }
    }

    /// Click on a favorite: finish a pending swap or select its preset
    pub async fn activate_favorite(&mut self, id: &str) -> Result<Activation> {
        let activation = self.favorites.activate(id);
        match &activation {
            Activation::Select(preset) => {
                if let Err(e) = self.engine.host().select_preset_by_name(preset).await {
                    tracing::warn!("[Favorites] Host could not select `{}`: {}", preset.name, e);
                }
            }
            Activation::Unknown => return Err(PanelError::UnknownFavorite(id.to_string())),
            Activation::SwapCancelled | Activation::Swapped => {}
        }
        Ok(activation)
    }

    /// Drag within the grid of the active tool
    pub fn reorder_favorites(&mut self, from: usize, to: usize) -> bool {
        let tool_id = self.engine.active_tool();
        self.favorites.reorder_in_view(&tool_id, from, to)
    }

    // Settings

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.set_view_mode(self.view_mode.toggled());
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        mode.save(&self.store);
    }

    pub fn set_display_settings(&mut self, display: DisplaySettings) {
        self.display = display;
        display.save(&self.store);
    }

    pub fn set_language(&mut self, language: LanguageSetting) {
        language.save(&self.store);
        self.language = language;
    }

    pub fn export_config(&self) -> Result<String> {
        settings::export_config(&self.store, &self.display)
    }

    /// Import a document and reload everything from the store
    pub fn import_config(&mut self, document: &str) -> Result<()> {
        settings::import_config(&self.store, document)?;
        self.reload();
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        settings::reset_to_defaults(&self.store)?;
        self.reload();
        Ok(())
    }

    fn reload(&mut self) {
        self.tools = ToolRegistry::load(self.store.clone());
        self.favorites = FavoritesRegistry::load(self.store.clone());
        self.display = DisplaySettings::load(&self.store);
        self.view_mode = ViewMode::load(&self.store);
        self.language = LanguageSetting::load(&self.store);
        self.dialogs = ToolDialogs::default();
    }
}
