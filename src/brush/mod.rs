//! Brush properties: the live snapshot, partial host reports, and the numeric
//! policy applied to user edits

mod defaults;

pub use defaults::PropertyDefaults;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar brush property set with one host call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BrushProperty {
    Size,
    Opacity,
    Flow,
    Angle,
    Hardness,
    Spacing,
}

impl BrushProperty {
    pub const ALL: [BrushProperty; 6] = [
        BrushProperty::Size,
        BrushProperty::Opacity,
        BrushProperty::Flow,
        BrushProperty::Angle,
        BrushProperty::Hardness,
        BrushProperty::Spacing,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            BrushProperty::Size => "size",
            BrushProperty::Opacity => "opacity",
            BrushProperty::Flow => "flow",
            BrushProperty::Angle => "angle",
            BrushProperty::Hardness => "hardness",
            BrushProperty::Spacing => "spacing",
        }
    }

    /// Round a user-entered value and clamp it into the range the host accepts
    ///
    /// Size is at least one pixel, spacing is 1..=1000, angle is only rounded,
    /// everything else is a 0..=100 percentage.
    pub fn normalize(&self, value: f64) -> i32 {
        let rounded = round(value);
        match self {
            BrushProperty::Size => rounded.max(1),
            BrushProperty::Angle => rounded,
            BrushProperty::Spacing => rounded.clamp(1, 1000),
            BrushProperty::Opacity | BrushProperty::Flow | BrushProperty::Hardness => {
                rounded.clamp(0, 100)
            }
        }
    }
}

impl fmt::Display for BrushProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One value of the shape dynamics cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeDynamicsField {
    SizeJitter,
    MinDiameter,
    AngleJitter,
    RoundnessJitter,
    MinRoundness,
}

impl ShapeDynamicsField {
    pub const ALL: [ShapeDynamicsField; 5] = [
        ShapeDynamicsField::SizeJitter,
        ShapeDynamicsField::MinDiameter,
        ShapeDynamicsField::AngleJitter,
        ShapeDynamicsField::RoundnessJitter,
        ShapeDynamicsField::MinRoundness,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ShapeDynamicsField::SizeJitter => "sizeJitter",
            ShapeDynamicsField::MinDiameter => "minDiameter",
            ShapeDynamicsField::AngleJitter => "angleJitter",
            ShapeDynamicsField::RoundnessJitter => "roundnessJitter",
            ShapeDynamicsField::MinRoundness => "minRoundness",
        }
    }

    /// All shape dynamics values are 0..=100 percentages
    pub fn normalize(&self, value: f64) -> i32 {
        round(value).clamp(0, 100)
    }
}

impl fmt::Display for ShapeDynamicsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn round(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    // `as` saturates at the i32 bounds
    value.round() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeDynamics {
    pub size_jitter: i32,
    pub min_diameter: i32,
    pub angle_jitter: i32,
    pub roundness_jitter: i32,
    pub min_roundness: i32,
}

impl Default for ShapeDynamics {
    fn default() -> Self {
        Self {
            size_jitter: PropertyDefaults::SHAPE_DYNAMICS,
            min_diameter: PropertyDefaults::SHAPE_DYNAMICS,
            angle_jitter: PropertyDefaults::SHAPE_DYNAMICS,
            roundness_jitter: PropertyDefaults::SHAPE_DYNAMICS,
            min_roundness: PropertyDefaults::SHAPE_DYNAMICS,
        }
    }
}

impl ShapeDynamics {
    pub fn get(&self, field: ShapeDynamicsField) -> i32 {
        match field {
            ShapeDynamicsField::SizeJitter => self.size_jitter,
            ShapeDynamicsField::MinDiameter => self.min_diameter,
            ShapeDynamicsField::AngleJitter => self.angle_jitter,
            ShapeDynamicsField::RoundnessJitter => self.roundness_jitter,
            ShapeDynamicsField::MinRoundness => self.min_roundness,
        }
    }

    pub fn set(&mut self, field: ShapeDynamicsField, value: i32) {
        let slot = match field {
            ShapeDynamicsField::SizeJitter => &mut self.size_jitter,
            ShapeDynamicsField::MinDiameter => &mut self.min_diameter,
            ShapeDynamicsField::AngleJitter => &mut self.angle_jitter,
            ShapeDynamicsField::RoundnessJitter => &mut self.roundness_jitter,
            ShapeDynamicsField::MinRoundness => &mut self.min_roundness,
        };
        *slot = value;
    }
}

/// What the panel currently displays for the active tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushPropertySnapshot {
    pub size: i32,
    pub opacity: i32,
    pub flow: i32,
    pub angle: i32,
    pub hardness: i32,
    pub spacing: i32,
    pub shape_dynamics: ShapeDynamics,
}

impl Default for BrushPropertySnapshot {
    fn default() -> Self {
        Self {
            size: PropertyDefaults::SIZE,
            opacity: PropertyDefaults::OPACITY,
            flow: PropertyDefaults::FLOW,
            angle: PropertyDefaults::ANGLE,
            hardness: PropertyDefaults::HARDNESS,
            spacing: PropertyDefaults::SPACING,
            shape_dynamics: ShapeDynamics::default(),
        }
    }
}

impl BrushPropertySnapshot {
    pub fn get(&self, property: BrushProperty) -> i32 {
        match property {
            BrushProperty::Size => self.size,
            BrushProperty::Opacity => self.opacity,
            BrushProperty::Flow => self.flow,
            BrushProperty::Angle => self.angle,
            BrushProperty::Hardness => self.hardness,
            BrushProperty::Spacing => self.spacing,
        }
    }

    pub fn set(&mut self, property: BrushProperty, value: i32) {
        let slot = match property {
            BrushProperty::Size => &mut self.size,
            BrushProperty::Opacity => &mut self.opacity,
            BrushProperty::Flow => &mut self.flow,
            BrushProperty::Angle => &mut self.angle,
            BrushProperty::Hardness => &mut self.hardness,
            BrushProperty::Spacing => &mut self.spacing,
        };
        *slot = value;
    }

    /// Overlay a partial host report; absent fields keep their current value
    ///
    /// Returns whether anything changed. A reported size of zero or less is
    /// treated as absent.
    pub fn merge_properties(&mut self, report: &BrushPropertiesReport) -> bool {
        let mut changed = false;
        for property in BrushProperty::ALL {
            let Some(value) = report.get(property) else {
                continue;
            };
            let value = round(value);
            if property == BrushProperty::Size && value <= 0 {
                continue;
            }
            if self.get(property) != value {
                self.set(property, value);
                changed = true;
            }
        }
        changed
    }

    /// Overlay a partial shape dynamics report
    pub fn merge_shape_dynamics(&mut self, report: &ShapeDynamicsReport) -> bool {
        let mut changed = false;
        for field in ShapeDynamicsField::ALL {
            if let Some(value) = report.get(field) {
                let value = round(value);
                if self.shape_dynamics.get(field) != value {
                    self.shape_dynamics.set(field, value);
                    changed = true;
                }
            }
        }
        changed
    }
}

/// Brush properties as reported by the host; any field may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrushPropertiesReport {
    pub size: Option<f64>,
    pub opacity: Option<f64>,
    pub flow: Option<f64>,
    pub angle: Option<f64>,
    pub hardness: Option<f64>,
    pub spacing: Option<f64>,
}

impl BrushPropertiesReport {
    pub fn get(&self, property: BrushProperty) -> Option<f64> {
        match property {
            BrushProperty::Size => self.size,
            BrushProperty::Opacity => self.opacity,
            BrushProperty::Flow => self.flow,
            BrushProperty::Angle => self.angle,
            BrushProperty::Hardness => self.hardness,
            BrushProperty::Spacing => self.spacing,
        }
    }

    pub fn set(&mut self, property: BrushProperty, value: Option<f64>) {
        let slot = match property {
            BrushProperty::Size => &mut self.size,
            BrushProperty::Opacity => &mut self.opacity,
            BrushProperty::Flow => &mut self.flow,
            BrushProperty::Angle => &mut self.angle,
            BrushProperty::Hardness => &mut self.hardness,
            BrushProperty::Spacing => &mut self.spacing,
        };
        *slot = value;
    }
}

/// Shape dynamics as reported by the host; any field may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShapeDynamicsReport {
    pub size_jitter: Option<f64>,
    pub min_diameter: Option<f64>,
    pub angle_jitter: Option<f64>,
    pub roundness_jitter: Option<f64>,
    pub min_roundness: Option<f64>,
}

impl ShapeDynamicsReport {
    pub fn get(&self, field: ShapeDynamicsField) -> Option<f64> {
        match field {
            ShapeDynamicsField::SizeJitter => self.size_jitter,
            ShapeDynamicsField::MinDiameter => self.min_diameter,
            ShapeDynamicsField::AngleJitter => self.angle_jitter,
            ShapeDynamicsField::RoundnessJitter => self.roundness_jitter,
            ShapeDynamicsField::MinRoundness => self.min_roundness,
        }
    }

    pub fn set(&mut self, field: ShapeDynamicsField, value: Option<f64>) {
        let slot = match field {
            ShapeDynamicsField::SizeJitter => &mut self.size_jitter,
            ShapeDynamicsField::MinDiameter => &mut self.min_diameter,
            ShapeDynamicsField::AngleJitter => &mut self.angle_jitter,
            ShapeDynamicsField::RoundnessJitter => &mut self.roundness_jitter,
            ShapeDynamicsField::MinRoundness => &mut self.min_roundness,
        };
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages_clamp() {
        assert_eq!(BrushProperty::Opacity.normalize(150.0), 100);
        assert_eq!(BrushProperty::Flow.normalize(-3.0), 0);
        assert_eq!(BrushProperty::Hardness.normalize(49.5), 50);
        assert_eq!(ShapeDynamicsField::MinDiameter.normalize(140.0), 100);
    }

    #[test]
    fn test_spacing_clamps_to_host_range() {
        assert_eq!(BrushProperty::Spacing.normalize(0.0), 1);
        assert_eq!(BrushProperty::Spacing.normalize(2500.0), 1000);
        assert_eq!(BrushProperty::Spacing.normalize(24.6), 25);
    }

    #[test]
    fn test_angle_is_only_rounded() {
        assert_eq!(BrushProperty::Angle.normalize(200.0), 200);
        assert_eq!(BrushProperty::Angle.normalize(-44.6), -45);
    }

    #[test]
    fn test_size_is_positive_and_unbounded() {
        assert_eq!(BrushProperty::Size.normalize(0.2), 1);
        assert_eq!(BrushProperty::Size.normalize(5000.4), 5000);
        assert_eq!(BrushProperty::Size.normalize(f64::NAN), 1);
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut snapshot = BrushPropertySnapshot::default();
        snapshot.size = 50;

        let report = BrushPropertiesReport {
            opacity: Some(40.4),
            angle: Some(-12.0),
            ..Default::default()
        };
        assert!(snapshot.merge_properties(&report));
        assert_eq!(snapshot.size, 50);
        assert_eq!(snapshot.opacity, 40);
        assert_eq!(snapshot.angle, -12);
        assert_eq!(snapshot.spacing, PropertyDefaults::SPACING);

        assert!(!snapshot.merge_properties(&report));
    }

    #[test]
    fn test_merge_ignores_zero_size() {
        let mut snapshot = BrushPropertySnapshot::default();
        let report = BrushPropertiesReport {
            size: Some(0.0),
            ..Default::default()
        };
        assert!(!snapshot.merge_properties(&report));
        assert_eq!(snapshot.size, PropertyDefaults::SIZE);
    }

    #[test]
    fn test_merge_shape_dynamics() {
        let mut snapshot = BrushPropertySnapshot::default();
        snapshot.shape_dynamics.angle_jitter = 30;

        let mut report = ShapeDynamicsReport::default();
        report.set(ShapeDynamicsField::SizeJitter, Some(10.0));
        assert!(snapshot.merge_shape_dynamics(&report));
        assert_eq!(snapshot.shape_dynamics.size_jitter, 10);
        assert_eq!(snapshot.shape_dynamics.angle_jitter, 30);
    }
}
