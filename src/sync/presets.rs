//! Last selected preset, as seen in host notifications

use crate::favorites::PresetInfo;

/// Remembers the preset most recently selected in the host
///
/// Reading the preset back from the tool options is a full round trip, so the
/// engine answers from here when it can. Any tool switch makes the entry
/// meaningless and must invalidate it.
#[derive(Debug, Clone, Default)]
pub struct PresetCache {
    last: Option<PresetInfo>,
}

impl PresetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, preset: PresetInfo) {
        self.last = Some(preset);
    }

    pub fn get(&self) -> Option<&PresetInfo> {
        self.last.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::PresetKind;

    #[test]
    fn test_record_and_invalidate() {
        let mut cache = PresetCache::new();
        assert!(cache.get().is_none());

        cache.record(PresetInfo {
            name: "Chalk".into(),
            kind: PresetKind::Brush,
        });
        cache.record(PresetInfo {
            name: "Ink".into(),
            kind: PresetKind::ToolPreset,
        });
        assert_eq!(cache.get().map(|p| p.name.as_str()), Some("Ink"));

        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
