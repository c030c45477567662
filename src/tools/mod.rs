//! Tool shortcut registry
//!
//! An ordered, user-editable list of shortcuts, each bound to one [`ToolKind`].
//! The registry is the source of truth for the session; the preference store
//! only mirrors it.

mod kind;

pub use kind::ToolKind;

use crate::ids::IdGenerator;
use crate::store::{self, keys, PreferenceStore, Stored};
use serde::{Deserialize, Serialize};

/// Color assigned to shortcuts added from the tool library
pub const DEFAULT_TOOL_COLOR: &str = "#e4e4e7";

/// A pinned tool in the toolbar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolShortcut {
    pub id: String,
    /// Immutable after creation
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ToolShortcut {
    /// The seeded shortcut for `kind`, whose id equals the kind id
    pub fn seeded(kind: ToolKind) -> Self {
        Self {
            id: kind.id().to_string(),
            kind,
            name: kind.default_name().to_string(),
            color: None,
        }
    }
}

/// The six shortcuts present on first run
pub fn default_tools() -> Vec<ToolShortcut> {
    ToolKind::ALL.into_iter().map(ToolShortcut::seeded).collect()
}

pub struct ToolRegistry<S: PreferenceStore> {
    store: S,
    tools: Vec<ToolShortcut>,
    ids: IdGenerator,
}

impl<S: PreferenceStore> ToolRegistry<S> {
    /// Seed the registry from the store
    ///
    /// A missing list is replaced by the defaults, which are written back once.
    /// A corrupt list also falls back to the defaults.
    pub fn load(store: S) -> Self {
        let (tools, seeded) = match store::read_json(&store, keys::TOOLS) {
            Stored::Value(tools) => (tools, false),
            Stored::Missing => (default_tools(), true),
            Stored::Corrupt => (default_tools(), false),
        };

        let registry = Self {
            store,
            tools,
            ids: IdGenerator::new(),
        };
        if seeded {
            tracing::info!("[Tools] Seeding {} default shortcuts", registry.tools.len());
            registry.persist();
        }
        registry
    }

    pub fn tools(&self) -> &[ToolShortcut] {
        &self.tools
    }

    pub fn get(&self, id: &str) -> Option<&ToolShortcut> {
        self.tools.iter().find(|tool| tool.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tools.iter().position(|tool| tool.id == id)
    }

    /// Append a new shortcut for `kind`, as picked from the tool library
    pub fn add(&mut self, kind: ToolKind, name: Option<&str>) -> ToolShortcut {
        let tools = &self.tools;
        let token = self.ids.next_token(|token| {
            let id = format!("{}-{}", kind.id(), token);
            tools.iter().any(|tool| tool.id == id)
        });

        let tool = ToolShortcut {
            id: format!("{}-{}", kind.id(), token),
            kind,
            name: name.unwrap_or(kind.default_name()).to_string(),
            color: Some(DEFAULT_TOOL_COLOR.to_string()),
        };
        tracing::info!("[Tools] Added `{}` ({})", tool.id, kind);
        self.tools.push(tool.clone());
        self.persist();
        tool
    }

    /// Rename or recolor a shortcut; `id` and `kind` never change
    pub fn edit(&mut self, id: &str, name: &str, color: Option<&str>) -> bool {
        let Some(tool) = self.tools.iter_mut().find(|tool| tool.id == id) else {
            tracing::warn!("[Tools] Edit of unknown shortcut `{}` ignored", id);
            return false;
        };
        tool.name = name.to_string();
        tool.color = color.map(str::to_string);
        self.persist();
        true
    }

    /// Look up the shortcut a delete confirmation should describe
    ///
    /// Does not mutate; the actual deletion is [`ToolRegistry::remove`].
    pub fn request_delete(&self, id: &str) -> Option<&ToolShortcut> {
        self.get(id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tools.len();
        self.tools.retain(|tool| tool.id != id);
        if self.tools.len() == before {
            return false;
        }
        tracing::info!("[Tools] Removed `{}`", id);
        self.persist();
        true
    }

    /// Move the shortcut at `from` to `to`, shifting the ones in between
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.tools.len() || to >= self.tools.len() {
            return false;
        }
        let tool = self.tools.remove(from);
        self.tools.insert(to, tool);
        self.persist();
        true
    }

    /// Drop `dragged` onto the position of `target`
    pub fn reorder_by_id(&mut self, dragged: &str, target: &str) -> bool {
        match (self.position(dragged), self.position(target)) {
            (Some(from), Some(to)) => self.reorder(from, to),
            _ => false,
        }
    }

    fn persist(&self) {
        store::write_json(&self.store, keys::TOOLS, &self.tools);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ids(registry: &ToolRegistry<MemoryStore>) -> Vec<&str> {
        registry.tools().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_first_run_seeds_six_defaults() {
        let store = MemoryStore::new();
        let registry = ToolRegistry::load(store.clone());

        assert_eq!(
            ids(&registry),
            vec!["brush", "eraser", "mixer", "smudge", "pencil", "clone"]
        );
        assert_eq!(registry.get("mixer").unwrap().name, "Mixer Brush");
        assert_eq!(store.write_count(), 1);
        assert!(store.get(keys::TOOLS).is_some());
    }

    #[test]
    fn test_existing_list_is_not_reseeded() {
        let store = MemoryStore::new();
        store
            .set(keys::TOOLS, r#"[{"id":"pencil","type":"pencil","name":"Sketch"}]"#)
            .unwrap();

        let registry = ToolRegistry::load(store.clone());
        assert_eq!(ids(&registry), vec!["pencil"]);
        assert_eq!(registry.tools()[0].name, "Sketch");
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_corrupt_list_falls_back_to_defaults() {
        let store = MemoryStore::new();
        store.set(keys::TOOLS, "[{\"id\":").unwrap();

        let registry = ToolRegistry::load(store.clone());
        assert_eq!(registry.tools(), default_tools().as_slice());
    }

    #[test]
    fn test_add_uses_kind_prefixed_id_and_library_color() {
        let store = MemoryStore::new();
        let mut registry = ToolRegistry::load(store.clone());

        let a = registry.add(ToolKind::Eraser, None);
        let b = registry.add(ToolKind::Eraser, Some("Soft Eraser"));

        assert!(a.id.starts_with("eraser-"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "Eraser");
        assert_eq!(b.name, "Soft Eraser");
        assert_eq!(a.color.as_deref(), Some(DEFAULT_TOOL_COLOR));
        assert_eq!(registry.tools().len(), 8);

        let reloaded = ToolRegistry::load(store);
        assert_eq!(reloaded.tools(), registry.tools());
    }

    #[test]
    fn test_edit_keeps_id_and_kind() {
        let mut registry = ToolRegistry::load(MemoryStore::new());
        assert!(registry.edit("smudge", "Blend", Some("#22c55e")));

        let tool = registry.get("smudge").unwrap();
        assert_eq!(tool.kind, ToolKind::Smudge);
        assert_eq!(tool.name, "Blend");
        assert_eq!(tool.color.as_deref(), Some("#22c55e"));

        assert!(!registry.edit("missing", "x", None));
    }

    #[test]
    fn test_request_delete_does_not_mutate() {
        let store = MemoryStore::new();
        let registry = ToolRegistry::load(store.clone());
        let writes = store.write_count();

        assert_eq!(registry.request_delete("clone").unwrap().kind, ToolKind::Clone);
        assert!(registry.request_delete("nope").is_none());
        assert_eq!(registry.tools().len(), 6);
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn test_remove() {
        let mut registry = ToolRegistry::load(MemoryStore::new());
        assert!(registry.remove("eraser"));
        assert!(!registry.remove("eraser"));
        assert_eq!(registry.tools().len(), 5);
    }

    #[test]
    fn test_reorder_moves_single_element() {
        let store = MemoryStore::new();
        let mut registry = ToolRegistry::load(store.clone());

        assert!(registry.reorder(0, 3));
        assert_eq!(
            ids(&registry),
            vec!["eraser", "mixer", "smudge", "brush", "pencil", "clone"]
        );

        let writes = store.write_count();
        assert!(!registry.reorder(2, 2));
        assert!(!registry.reorder(0, 6));
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn test_reorder_by_id() {
        let mut registry = ToolRegistry::load(MemoryStore::new());
        assert!(registry.reorder_by_id("clone", "brush"));
        assert_eq!(
            ids(&registry),
            vec!["clone", "brush", "eraser", "mixer", "smudge", "pencil"]
        );
        assert!(!registry.reorder_by_id("clone", "ghost"));
    }
}
