//! Tool kinds and their host class names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of host tools a shortcut can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Brush,
    Eraser,
    Mixer,
    Smudge,
    Pencil,
    Clone,
}

impl ToolKind {
    /// Every kind, in tool-library order
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Mixer,
        ToolKind::Smudge,
        ToolKind::Pencil,
        ToolKind::Clone,
    ];

    /// Stable id, also the persisted `type` value
    pub fn id(&self) -> &'static str {
        match self {
            ToolKind::Brush => "brush",
            ToolKind::Eraser => "eraser",
            ToolKind::Mixer => "mixer",
            ToolKind::Smudge => "smudge",
            ToolKind::Pencil => "pencil",
            ToolKind::Clone => "clone",
        }
    }

    /// Host class reference used to select the tool
    pub fn host_class(&self) -> &'static str {
        match self {
            ToolKind::Brush => "paintbrushTool",
            ToolKind::Eraser => "eraserTool",
            ToolKind::Mixer => "wetBrushTool",
            ToolKind::Smudge => "smudgeTool",
            ToolKind::Pencil => "pencilTool",
            ToolKind::Clone => "cloneStampTool",
        }
    }

    /// Reverse of [`ToolKind::host_class`]
    pub fn from_host_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.host_class() == class)
    }

    /// Display name a fresh shortcut starts with
    pub fn default_name(&self) -> &'static str {
        match self {
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Mixer => "Mixer Brush",
            ToolKind::Smudge => "Smudge",
            ToolKind::Pencil => "Pencil",
            ToolKind::Clone => "Clone Stamp",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| format!("unknown tool kind `{}`", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_class_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_host_class(kind.host_class()), Some(kind));
        }
        assert_eq!(ToolKind::from_host_class("moveTool"), None);
    }

    #[test]
    fn test_mixer_maps_to_wet_brush() {
        assert_eq!(ToolKind::Mixer.host_class(), "wetBrushTool");
        assert_eq!("mixer".parse::<ToolKind>(), Ok(ToolKind::Mixer));
        assert!("lasso".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&ToolKind::Clone).unwrap();
        assert_eq!(json, "\"clone\"");
        for kind in ToolKind::ALL {
            let encoded = serde_json::to_string(&kind).unwrap();
            assert_eq!(encoded, format!("\"{}\"", kind.id()));
        }
    }
}
