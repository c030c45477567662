//! In-process host
//!
//! Keeps a tool options bag in memory and echoes notifications the way the
//! real host does when the panel changes something. Used by the CLI and the
//! tests. Tool options reads and writes yield to the scheduler (or sleep for
//! the configured latency), so interleaved read-modify-write sequences behave
//! like real round trips.

use super::descriptor;
use super::{HostAdapter, HostEvent, HostEventKind, Subscription, SubscriptionId};
use crate::brush::BrushProperty;
use crate::error::HostError;
use crate::favorites::{PresetInfo, PresetKind};
use crate::tools::ToolKind;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

struct HostState {
    tool_class: String,
    tool_options: Value,
    preset: Option<PresetInfo>,
}

struct Subscriber {
    id: SubscriptionId,
    kinds: Vec<HostEventKind>,
    sender: mpsc::UnboundedSender<HostEvent>,
}

/// Host stand-in backed by a JSON tool options bag
pub struct InMemoryHost {
    state: Mutex<HostState>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscription: AtomicU64,
    unavailable: AtomicBool,
    reject_writes: AtomicBool,
    reject_subscriptions: AtomicBool,
    /// Round trip of tool options reads and writes, in milliseconds
    latency_ms: AtomicU64,
    calls: Mutex<Vec<String>>,
}

impl InMemoryHost {
    /// A brush tool with an empty options bag
    pub fn new() -> Self {
        Self::with_tool_options(ToolKind::Brush.host_class(), json!({}))
    }

    pub fn with_tool_options(tool_class: &str, tool_options: Value) -> Self {
        Self {
            state: Mutex::new(HostState {
                tool_class: tool_class.to_string(),
                tool_options,
                preset: None,
            }),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            unavailable: AtomicBool::new(false),
            reject_writes: AtomicBool::new(false),
            reject_subscriptions: AtomicBool::new(false),
            latency_ms: AtomicU64::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every call fail, as if the host went away
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make writes fail while reads keep working
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn set_reject_subscriptions(&self, reject: bool) {
        self.reject_subscriptions.store(reject, Ordering::SeqCst);
    }

    /// Delay every tool options read and write by `latency`
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Replace the options bag without notifying anyone
    pub fn set_tool_options(&self, options: Value) {
        if let Ok(mut state) = self.state.lock() {
            state.tool_options = options;
        }
    }

    pub fn tool_options(&self) -> Value {
        self.state
            .lock()
            .map(|state| state.tool_options.clone())
            .unwrap_or(Value::Null)
    }

    pub fn tool_class(&self) -> String {
        self.state
            .lock()
            .map(|state| state.tool_class.clone())
            .unwrap_or_default()
    }

    pub fn selected_preset(&self) -> Option<PresetInfo> {
        self.state.lock().ok().and_then(|state| state.preset.clone())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }

    /// Commands received so far, oldest first
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Deliver a notification to every subscriber of its kind
    pub fn push_event(&self, event: HostEvent) {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return;
        };
        subscribers.retain(|sub| {
            if !sub.kinds.contains(&event.kind) {
                return true;
            }
            sub.sender.send(event.clone()).is_ok()
        });
    }

    async fn round_trip(&self) {
        match self.latency_ms.load(Ordering::SeqCst) {
            0 => tokio::task::yield_now().await,
            millis => tokio::time::sleep(Duration::from_millis(millis)).await,
        }
    }

    fn record(&self, command: &str) -> Result<(), HostError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.to_string());
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(HostError::Unavailable);
        }
        Ok(())
    }

    fn record_write(&self, command: &str) -> Result<(), HostError> {
        self.record(command)?;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(HostError::call_failed(command, "rejected"));
        }
        Ok(())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut HostState) -> T) -> Result<T, HostError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| HostError::Malformed("host state poisoned".into()))?;
        Ok(f(&mut state))
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostAdapter for InMemoryHost {
    async fn select_tool_kind(&self, kind: ToolKind) -> Result<(), HostError> {
        self.record_write("select")?;
        let class = kind.host_class();
        self.with_state(|state| {
            if state.tool_class != class {
                state.tool_class = class.to_string();
                state.preset = None;
            }
        })?;
        self.push_event(HostEvent::new(
            HostEventKind::Select,
            json!({ "_target": [{ "_ref": class }] }),
        ));
        Ok(())
    }

    async fn current_tool_class(&self) -> Result<String, HostError> {
        self.record("get currentToolClass")?;
        self.with_state(|state| state.tool_class.clone())
    }

    async fn select_preset_by_name(&self, preset: &PresetInfo) -> Result<(), HostError> {
        self.record_write("select")?;
        self.with_state(|state| {
            if let Value::Object(options) = &mut state.tool_options {
                match preset.kind {
                    PresetKind::ToolPreset => {
                        options.insert("$TpNm".into(), Value::from(preset.name.as_str()));
                    }
                    PresetKind::Brush => {
                        options.remove("$TpNm");
                        let brush = options.entry("brush").or_insert_with(|| json!({}));
                        if let Value::Object(brush) = brush {
                            brush.insert("name".into(), Value::from(preset.name.as_str()));
                        }
                    }
                }
            }
            state.preset = Some(preset.clone());
        })?;
        self.push_event(HostEvent::new(
            HostEventKind::Select,
            json!({ "_target": [{ "_ref": preset.kind.host_ref(), "_name": preset.name }] }),
        ));
        Ok(())
    }

    async fn read_tool_options(&self) -> Result<Value, HostError> {
        self.round_trip().await;
        self.record("get currentToolOptions")?;
        self.with_state(|state| state.tool_options.clone())
    }

    async fn write_tool_options(&self, tool_class: &str, options: Value) -> Result<(), HostError> {
        self.round_trip().await;
        self.record_write("set currentToolOptions")?;
        let to = options.clone();
        self.with_state(|state| {
            if state.tool_class != tool_class {
                return Err(HostError::call_failed(
                    "set currentToolOptions",
                    format!("{} is not the active tool", tool_class),
                ));
            }
            state.tool_options = options;
            Ok(())
        })??;

        self.push_event(HostEvent::new(
            HostEventKind::Set,
            json!({
                "_target": [{ "_ref": "property", "_property": "currentToolOptions" }],
                "to": to,
            }),
        ));
        Ok(())
    }

    async fn set_brush_property(
        &self,
        property: BrushProperty,
        value: i32,
    ) -> Result<(), HostError> {
        self.record_write(&format!("set {}", property))?;
        self.with_state(|state| {
            descriptor::apply_brush_property(&mut state.tool_options, property, value)
        })?;
        let mut to = Map::new();
        to.insert(property.key().into(), Value::from(value));
        self.push_event(HostEvent::new(
            HostEventKind::Set,
            json!({
                "_target": [{ "_ref": "brush", "_enum": "ordinal", "_value": "targetEnum" }],
                "to": to,
            }),
        ));
        Ok(())
    }

    async fn subscribe(&self, kinds: &[HostEventKind]) -> Result<Subscription, HostError> {
        self.record("subscribe")?;
        if self.reject_subscriptions.load(Ordering::SeqCst) {
            return Err(HostError::call_failed("subscribe", "notifications unsupported"));
        }

        let (sender, events) = mpsc::unbounded_channel();
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|_| HostError::Malformed("subscriber list poisoned".into()))?;
        subscribers.push(Subscriber {
            id,
            kinds: kinds.to_vec(),
            sender,
        });
        Ok(Subscription { id, events })
    }

    async fn unsubscribe(&self, id: SubscriptionId) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|sub| sub.id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::ShapeDynamicsField;
    use crate::host::UNKNOWN_TOOL;

    #[tokio::test]
    async fn test_property_write_is_readable() {
        let host = InMemoryHost::new();
        host.set_brush_property(BrushProperty::Size, 80).await.unwrap();
        host.set_brush_property(BrushProperty::Flow, 30).await.unwrap();

        let report = host.brush_properties().await.unwrap();
        assert_eq!(report.size, Some(80.0));
        assert_eq!(report.flow, Some(30.0));
        assert_eq!(report.opacity, None);
    }

    #[tokio::test]
    async fn test_unavailable_host_degrades() {
        let host = InMemoryHost::new();
        host.set_unavailable(true);

        assert_eq!(host.current_tool_kind().await, UNKNOWN_TOOL);
        assert!(host.brush_properties().await.is_none());
        assert!(host.current_preset_info().await.is_none());
        assert_eq!(
            host.set_shape_dynamics_field(ShapeDynamicsField::SizeJitter, 10).await,
            Err(HostError::Unavailable)
        );
    }

    #[tokio::test]
    async fn test_events_reach_matching_subscribers() {
        let host = InMemoryHost::new();
        let mut selects = host.subscribe(&[HostEventKind::Select]).await.unwrap();
        let mut sets = host.subscribe(&[HostEventKind::Set]).await.unwrap();
        assert_eq!(host.subscriber_count(), 2);

        host.select_tool_kind(ToolKind::Eraser).await.unwrap();
        let event = selects.events.recv().await.unwrap();
        assert_eq!(event.descriptor["_target"][0]["_ref"], "eraserTool");
        assert!(sets.events.try_recv().is_err());

        host.unsubscribe(selects.id).await;
        host.unsubscribe(sets.id).await;
        assert_eq!(host.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_preset_selection_updates_options() {
        let host = InMemoryHost::new();
        let preset = PresetInfo {
            name: "Soft Round".into(),
            kind: PresetKind::Brush,
        };
        host.select_preset_by_name(&preset).await.unwrap();

        assert_eq!(host.current_preset_info().await, Some(preset.clone()));
        assert_eq!(host.selected_preset(), Some(preset));
    }

    #[tokio::test]
    async fn test_write_for_inactive_tool_fails() {
        let host = InMemoryHost::new();
        let result = host.write_tool_options("eraserTool", json!({})).await;
        assert!(matches!(result, Err(HostError::CallFailed { .. })));
    }
}
