//! Host descriptor mapping
//!
//! The host describes tool options as loosely structured JSON: values are
//! either bare numbers or unit objects (`{"_unit": "percentUnit", "_value": 40}`),
//! some fields live inside a `brush` object on one tool and at the top level on
//! another, and shape dynamics keep a jitter/minimum pair in a nested object
//! while mirroring the minimums at the top level. The tables below list, per
//! field, every place it may appear, in priority order.

use super::{HostEvent, HostEventKind};
use crate::brush::{BrushProperty, BrushPropertiesReport, ShapeDynamicsField, ShapeDynamicsReport};
use crate::favorites::{PresetInfo, PresetKind};
use crate::tools::ToolKind;
use serde_json::{json, Map, Value};

pub type KeyPath = &'static [&'static str];

pub const PERCENT_UNIT: &str = "percentUnit";
pub const PIXELS_UNIT: &str = "pixelsUnit";
pub const ANGLE_UNIT: &str = "angleUnit";

/// Where a scalar property is read from and written to
pub struct PropertySlot {
    pub property: BrushProperty,
    pub unit: &'static str,
    /// Read candidates; the first one is also the write location
    pub candidates: &'static [KeyPath],
}

pub const PROPERTY_SLOTS: [PropertySlot; 6] = [
    PropertySlot {
        property: BrushProperty::Size,
        unit: PIXELS_UNIT,
        candidates: &[&["brush", "diameter"], &["diameter"]],
    },
    PropertySlot {
        property: BrushProperty::Opacity,
        unit: PERCENT_UNIT,
        candidates: &[&["opacity"]],
    },
    PropertySlot {
        property: BrushProperty::Flow,
        unit: PERCENT_UNIT,
        candidates: &[&["flow"]],
    },
    PropertySlot {
        property: BrushProperty::Angle,
        unit: ANGLE_UNIT,
        candidates: &[&["brush", "angle"], &["angle"]],
    },
    PropertySlot {
        property: BrushProperty::Hardness,
        unit: PERCENT_UNIT,
        candidates: &[&["brush", "hardness"]],
    },
    PropertySlot {
        property: BrushProperty::Spacing,
        unit: PERCENT_UNIT,
        candidates: &[&["brush", "spacing"]],
    },
];

/// Where a shape dynamics value lives
pub struct DynamicsSlot {
    pub field: ShapeDynamicsField,
    /// Nested object holding the jitter/minimum pair
    pub container: &'static str,
    /// `jitter` or `minimum`
    pub member: &'static str,
    /// Top-level duplicate the host UI reads from
    pub mirror: Option<&'static str>,
}

/// Nested object name for size variation
pub const SIZE_VARIATION: &str = "$szVr";
/// Class tag of a freshly created variation object
pub const VARIATION_CLASS: &str = "$brVr";
/// Control type tag inside a variation object
pub const CONTROL_TYPE: &str = "$bVTy";

pub const DYNAMICS_SLOTS: [DynamicsSlot; 5] = [
    DynamicsSlot {
        field: ShapeDynamicsField::SizeJitter,
        container: SIZE_VARIATION,
        member: "jitter",
        mirror: None,
    },
    DynamicsSlot {
        field: ShapeDynamicsField::MinDiameter,
        container: SIZE_VARIATION,
        member: "minimum",
        mirror: Some("minimumDiameter"),
    },
    DynamicsSlot {
        field: ShapeDynamicsField::AngleJitter,
        container: "angleDynamics",
        member: "jitter",
        mirror: None,
    },
    DynamicsSlot {
        field: ShapeDynamicsField::RoundnessJitter,
        container: "roundnessDynamics",
        member: "jitter",
        mirror: None,
    },
    DynamicsSlot {
        field: ShapeDynamicsField::MinRoundness,
        container: "roundnessDynamics",
        member: "minimum",
        mirror: Some("minimumRoundness"),
    },
];

/// Keys in a `set` event's `to` object that always concern shape dynamics
const DYNAMICS_EVENT_KEYS: [&str; 7] = [
    "jitter",
    "minimumDiameter",
    "minimumRoundness",
    "angleDynamics",
    "roundnessDynamics",
    SIZE_VARIATION,
    VARIATION_CLASS,
];

pub fn property_slot(property: BrushProperty) -> &'static PropertySlot {
    match property {
        BrushProperty::Size => &PROPERTY_SLOTS[0],
        BrushProperty::Opacity => &PROPERTY_SLOTS[1],
        BrushProperty::Flow => &PROPERTY_SLOTS[2],
        BrushProperty::Angle => &PROPERTY_SLOTS[3],
        BrushProperty::Hardness => &PROPERTY_SLOTS[4],
        BrushProperty::Spacing => &PROPERTY_SLOTS[5],
    }
}

pub fn dynamics_slot(field: ShapeDynamicsField) -> &'static DynamicsSlot {
    match field {
        ShapeDynamicsField::SizeJitter => &DYNAMICS_SLOTS[0],
        ShapeDynamicsField::MinDiameter => &DYNAMICS_SLOTS[1],
        ShapeDynamicsField::AngleJitter => &DYNAMICS_SLOTS[2],
        ShapeDynamicsField::RoundnessJitter => &DYNAMICS_SLOTS[3],
        ShapeDynamicsField::MinRoundness => &DYNAMICS_SLOTS[4],
    }
}

/// A `{_unit, _value}` object
pub fn unit_value(unit: &str, value: i32) -> Value {
    json!({ "_unit": unit, "_value": value })
}

/// The tool options bag, unwrapping the occasional double nesting
pub fn tool_options_root(options: &Value) -> &Value {
    match options.get("currentToolOptions") {
        Some(inner) if inner.is_object() => inner,
        _ => options,
    }
}

/// A bare number or the `_value` of a unit object
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("_value").and_then(Value::as_f64),
        _ => None,
    }
}

pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(*key))
}

/// First non-zero candidate, else the first one present
///
/// The host sometimes leaves a stale zero in the nested location while the
/// top-level duplicate carries the real value.
pub fn resolve<P: AsRef<[&'static str]>>(root: &Value, candidates: &[P]) -> Option<f64> {
    let mut first_present = None;
    for path in candidates {
        if let Some(value) = lookup(root, path.as_ref()).and_then(numeric) {
            if value != 0.0 {
                return Some(value);
            }
            first_present.get_or_insert(value);
        }
    }
    first_present
}

pub fn parse_brush_properties(options: &Value) -> BrushPropertiesReport {
    let root = tool_options_root(options);
    let mut report = BrushPropertiesReport::default();
    for slot in &PROPERTY_SLOTS {
        report.set(slot.property, resolve(root, slot.candidates));
    }
    report
}

fn dynamics_candidates(slot: &DynamicsSlot) -> Vec<Vec<&'static str>> {
    let mut candidates = vec![vec![slot.container, slot.member]];
    if let Some(mirror) = slot.mirror {
        candidates.push(vec![mirror]);
    }
    candidates
}

pub fn parse_shape_dynamics(options: &Value) -> ShapeDynamicsReport {
    let root = tool_options_root(options);
    let mut report = ShapeDynamicsReport::default();
    for slot in &DYNAMICS_SLOTS {
        report.set(slot.field, resolve(root, &dynamics_candidates(slot)));
    }
    report
}

/// The preset the tool options name: a tool preset title, else the brush name
pub fn parse_preset_info(options: &Value) -> Option<PresetInfo> {
    let root = tool_options_root(options);

    if let Some(name) = root.get("$TpNm").and_then(Value::as_str) {
        return Some(PresetInfo {
            name: name.to_string(),
            kind: PresetKind::ToolPreset,
        });
    }

    lookup(root, &["brush", "name"])
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(|name| PresetInfo {
            name: name.to_string(),
            kind: PresetKind::Brush,
        })
}

/// Copy of `options` with one shape dynamics value replaced
///
/// Sibling members of the nested object survive, a missing partner member is
/// added as zero, the control type tag is kept, and minimums are written to
/// both the nested object and their top-level mirror.
pub fn patch_shape_dynamics(options: &Value, field: ShapeDynamicsField, value: i32) -> Value {
    let slot = dynamics_slot(field);
    let value = field.normalize(f64::from(value));

    let mut patch = match tool_options_root(options) {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let mut nested = match patch.get(slot.container) {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    if slot.container == SIZE_VARIATION && !nested.contains_key("_obj") {
        nested.insert("_obj".into(), Value::from(VARIATION_CLASS));
    }
    nested.insert(slot.member.into(), unit_value(PERCENT_UNIT, value));
    for member in ["jitter", "minimum"] {
        nested
            .entry(member)
            .or_insert_with(|| unit_value(PERCENT_UNIT, 0));
    }
    patch.insert(slot.container.into(), Value::Object(nested));

    if let Some(mirror) = slot.mirror {
        patch.insert(mirror.into(), unit_value(PERCENT_UNIT, value));
    }
    patch.insert("_obj".into(), Value::from("currentToolOptions"));

    Value::Object(patch)
}

/// Write a scalar property into a tool options bag at its primary location
pub fn apply_brush_property(options: &mut Value, property: BrushProperty, value: i32) {
    let slot = property_slot(property);
    let Some((leaf, parents)) = slot.candidates[0].split_last() else {
        return;
    };

    if !options.is_object() {
        *options = Value::Object(Map::new());
    }
    let mut node = options;
    for key in parents {
        let Value::Object(map) = node else {
            return;
        };
        node = map
            .entry(*key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
    }
    if let Value::Object(map) = node {
        map.insert((*leaf).to_string(), unit_value(slot.unit, value));
    }
}

/// What a `select` notification switched to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionTarget {
    Preset(PresetInfo),
    Tool(ToolKind),
    /// A tool the panel has no shortcut kind for, by host class
    OtherTool(String),
}

fn target_refs(descriptor: &Value) -> &[Value] {
    descriptor
        .get("_target")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Inspect a `select` notification's first target
pub fn selection_target(event: &HostEvent) -> Option<SelectionTarget> {
    if event.kind != HostEventKind::Select {
        return None;
    }
    let first = target_refs(&event.descriptor).first()?;
    let reference = first.get("_ref").and_then(Value::as_str)?;
    let name = first.get("_name").and_then(Value::as_str);

    match (reference, name) {
        ("brush", Some(name)) => Some(SelectionTarget::Preset(PresetInfo {
            name: name.to_string(),
            kind: PresetKind::Brush,
        })),
        ("toolPreset", Some(name)) => Some(SelectionTarget::Preset(PresetInfo {
            name: name.to_string(),
            kind: PresetKind::ToolPreset,
        })),
        _ => {
            if let Some(kind) = ToolKind::from_host_class(reference) {
                Some(SelectionTarget::Tool(kind))
            } else if reference.to_ascii_lowercase().contains("tool") {
                Some(SelectionTarget::OtherTool(reference.to_string()))
            } else {
                None
            }
        }
    }
}

/// Whether a notification may have changed what the property panel shows
pub fn wants_refresh(event: &HostEvent) -> bool {
    match event.kind {
        HostEventKind::Select | HostEventKind::Reset => true,
        HostEventKind::Set => {
            let touches_tool = target_refs(&event.descriptor).iter().any(|target| {
                let reference = target.get("_ref").and_then(Value::as_str).unwrap_or("");
                let property = target.get("_property").and_then(Value::as_str);
                reference == "brush"
                    || property == Some("currentToolOptions")
                    || reference.contains("brush")
                    || reference.contains("Tool")
            });
            if touches_tool {
                return true;
            }

            event
                .descriptor
                .get("to")
                .and_then(Value::as_object)
                .map_or(false, |to| DYNAMICS_EVENT_KEYS.iter().any(|key| to.contains_key(*key)))
        }
    }
}
