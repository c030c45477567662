//! HostAdapter trait - the panel's view of the painting host
//!
//! Every call is an asynchronous round trip to another process. The real
//! binding lives outside this crate; it only has to provide the raw calls
//! below; preset and property reads are derived from the tool options
//! descriptor by [`descriptor`].

pub mod descriptor;
mod memory;

pub use memory::InMemoryHost;

use crate::brush::{BrushProperty, BrushPropertiesReport, ShapeDynamicsField, ShapeDynamicsReport};
use crate::error::HostError;
use crate::favorites::PresetInfo;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use tokio::sync::mpsc;

/// Tool class reported when the host cannot tell which tool is active
pub const UNKNOWN_TOOL: &str = "unknown";

/// Notification kinds the panel listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostEventKind {
    /// A tool, brush or preset was selected
    Select,
    /// A property was set
    Set,
    /// Tool options were reset
    Reset,
}

/// Every kind the sync engine reacts to
pub const WATCHED_EVENTS: [HostEventKind; 3] =
    [HostEventKind::Select, HostEventKind::Set, HostEventKind::Reset];

/// A notification from the host
///
/// The descriptor is opaque apart from its `_target` references and, for
/// `set`, the `to` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    pub kind: HostEventKind,
    pub descriptor: Value,
}

impl HostEvent {
    pub fn new(kind: HostEventKind, descriptor: Value) -> Self {
        Self { kind, descriptor }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A live notification stream; hand the id back to `unsubscribe` when done
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: mpsc::UnboundedReceiver<HostEvent>,
}

/// Trait that every host binding implements
pub trait HostAdapter: Send + Sync + 'static {
    /// Activate the host tool behind `kind`
    fn select_tool_kind(
        &self,
        kind: ToolKind,
    ) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Class name of the active tool, e.g. `paintbrushTool`
    fn current_tool_class(&self) -> impl Future<Output = Result<String, HostError>> + Send;

    /// Select a brush or tool preset by its name
    fn select_preset_by_name(
        &self,
        preset: &PresetInfo,
    ) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Read the full `currentToolOptions` descriptor
    fn read_tool_options(&self) -> impl Future<Output = Result<Value, HostError>> + Send;

    /// Replace the tool options of `tool_class` with `options`
    fn write_tool_options(
        &self,
        tool_class: &str,
        options: Value,
    ) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Set one scalar property; `value` is already normalized
    fn set_brush_property(
        &self,
        property: BrushProperty,
        value: i32,
    ) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Start receiving notifications of the given kinds
    fn subscribe(
        &self,
        kinds: &[HostEventKind],
    ) -> impl Future<Output = Result<Subscription, HostError>> + Send;

    /// Stop a subscription; unknown ids are ignored
    fn unsubscribe(&self, id: SubscriptionId) -> impl Future<Output = ()> + Send;

    /// Active tool class, or [`UNKNOWN_TOOL`] when the host cannot say
    fn current_tool_kind(&self) -> impl Future<Output = String> + Send {
        async move {
            match self.current_tool_class().await {
                Ok(class) if !class.is_empty() => class,
                Ok(_) => UNKNOWN_TOOL.to_string(),
                Err(e) => {
                    tracing::warn!("[Host] Get current tool failed: {}", e);
                    UNKNOWN_TOOL.to_string()
                }
            }
        }
    }

    /// The preset the current tool options point at, if any
    fn current_preset_info(&self) -> impl Future<Output = Option<PresetInfo>> + Send {
        async move {
            match self.read_tool_options().await {
                Ok(options) => descriptor::parse_preset_info(&options),
                Err(e) => {
                    tracing::warn!("[Host] Preset lookup failed: {}", e);
                    None
                }
            }
        }
    }

    /// Size, opacity, flow, angle, hardness and spacing, as far as reported
    fn brush_properties(&self) -> impl Future<Output = Option<BrushPropertiesReport>> + Send {
        async move {
            match self.read_tool_options().await {
                Ok(options) => Some(descriptor::parse_brush_properties(&options)),
                Err(e) => {
                    tracing::warn!("[Host] Get brush properties failed: {}", e);
                    None
                }
            }
        }
    }

    /// Shape dynamics values, as far as reported
    fn shape_dynamics(&self) -> impl Future<Output = Option<ShapeDynamicsReport>> + Send {
        async move {
            match self.read_tool_options().await {
                Ok(options) => Some(descriptor::parse_shape_dynamics(&options)),
                Err(e) => {
                    tracing::debug!("[Host] Get shape dynamics failed: {}", e);
                    None
                }
            }
        }
    }

    /// Read-modify-write of one shape dynamics value
    ///
    /// Not atomic on its own: callers must not run two of these against the
    /// same tool concurrently (the sync engine serializes them).
    fn set_shape_dynamics_field(
        &self,
        field: ShapeDynamicsField,
        value: i32,
    ) -> impl Future<Output = Result<(), HostError>> + Send {
        async move {
            let tool_class = self.current_tool_kind().await;
            if tool_class == UNKNOWN_TOOL {
                return Err(HostError::Unavailable);
            }
            let options = self.read_tool_options().await?;
            let patched = descriptor::patch_shape_dynamics(&options, field, value);
            self.write_tool_options(&tool_class, patched).await
        }
    }
}
