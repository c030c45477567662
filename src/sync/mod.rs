//! Property sync engine
//!
//! Keeps a [`BrushPropertySnapshot`] in step with the host. Host notifications
//! schedule a debounced refresh, a fixed-rate poll covers whatever the
//! notification stream misses, and user edits are applied to the snapshot
//! before the host call goes out. Refreshes only overwrite fields the host
//! actually reported, so a partial answer never clobbers an optimistic edit.

mod debounce;
mod presets;

pub use debounce::Debouncer;
pub use presets::PresetCache;

use crate::brush::{
    BrushProperty, BrushPropertiesReport, BrushPropertySnapshot, ShapeDynamicsField,
    ShapeDynamicsReport,
};
use crate::favorites::PresetInfo;
use crate::host::descriptor::{self, SelectionTarget};
use crate::host::{HostAdapter, HostEvent, SubscriptionId, WATCHED_EVENTS};
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Timing of the reconciliation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Quiet period after the last notification before refreshing
    pub debounce_ms: u64,
    /// Period of the fallback poll
    pub poll_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            poll_interval_ms: 1000,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero period would make interval_at panic
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

struct Shared<H> {
    host: Arc<H>,
    config: SyncConfig,
    snapshot: watch::Sender<BrushPropertySnapshot>,
    active_tool: watch::Sender<String>,
    presets: Mutex<PresetCache>,
    /// Held for the whole read-modify-write of the tool options bag
    tool_options: tokio::sync::Mutex<()>,
}

/// Shared handle to the engine state; clones see the same snapshot
pub struct PropertySyncEngine<H> {
    shared: Arc<Shared<H>>,
}

impl<H> Clone for PropertySyncEngine<H> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// Tool kind behind a shortcut id (`eraser`, `eraser-1712345678901`)
fn shortcut_kind(tool_id: &str) -> Option<ToolKind> {
    tool_id.split('-').next().and_then(|kind| kind.parse().ok())
}

impl<H: HostAdapter> PropertySyncEngine<H> {
    pub fn new(host: Arc<H>, config: SyncConfig) -> Self {
        let (snapshot, _) = watch::channel(BrushPropertySnapshot::default());
        let (active_tool, _) = watch::channel(ToolKind::Brush.id().to_string());
        Self {
            shared: Arc::new(Shared {
                host,
                config,
                snapshot,
                active_tool,
                presets: Mutex::new(PresetCache::new()),
                tool_options: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.shared.host
    }

    pub fn config(&self) -> SyncConfig {
        self.shared.config
    }

    pub fn snapshot(&self) -> BrushPropertySnapshot {
        *self.shared.snapshot.borrow()
    }

    /// Receiver that wakes on every snapshot change
    pub fn watch(&self) -> watch::Receiver<BrushPropertySnapshot> {
        self.shared.snapshot.subscribe()
    }

    /// Id of the tool shortcut the favorites grid is scoped to
    pub fn active_tool(&self) -> String {
        self.shared.active_tool.borrow().clone()
    }

    pub fn watch_active_tool(&self) -> watch::Receiver<String> {
        self.shared.active_tool.subscribe()
    }

    /// Switch the active tool id; a real change drops the cached preset
    pub fn set_active_tool(&self, tool_id: &str) {
        let changed = self.shared.active_tool.send_if_modified(|current| {
            if *current == tool_id {
                return false;
            }
            *current = tool_id.to_string();
            true
        });
        if changed {
            tracing::debug!("[Sync] Active tool: {}", tool_id);
            self.invalidate_preset();
        }
    }

    fn with_presets<T>(&self, f: impl FnOnce(&mut PresetCache) -> T) -> Option<T> {
        match self.shared.presets.lock() {
            Ok(mut cache) => Some(f(&mut cache)),
            Err(_) => {
                tracing::error!("[Sync] Preset cache lock poisoned");
                None
            }
        }
    }

    fn invalidate_preset(&self) {
        self.with_presets(PresetCache::invalidate);
    }

    pub fn cached_preset(&self) -> Option<PresetInfo> {
        self.with_presets(|cache| cache.get().cloned()).flatten()
    }

    /// The preset selected in the host: cache first, then a descriptor read
    pub async fn current_preset(&self) -> Option<PresetInfo> {
        if let Some(preset) = self.cached_preset() {
            return Some(preset);
        }
        let preset = self.shared.host.current_preset_info().await?;
        self.with_presets(|cache| cache.record(preset.clone()));
        Some(preset)
    }

    /// Overlay a property report; returns whether the snapshot changed
    pub fn apply_properties(&self, report: &BrushPropertiesReport) -> bool {
        self.shared
            .snapshot
            .send_if_modified(|snapshot| snapshot.merge_properties(report))
    }

    pub fn apply_shape_dynamics(&self, report: &ShapeDynamicsReport) -> bool {
        self.shared
            .snapshot
            .send_if_modified(|snapshot| snapshot.merge_shape_dynamics(report))
    }

    /// Fetch properties and shape dynamics and merge whatever came back
    pub async fn refresh(&self) -> bool {
        let host = &self.shared.host;
        let (properties, dynamics) = tokio::join!(host.brush_properties(), host.shape_dynamics());

        let mut changed = false;
        if let Some(report) = properties {
            changed |= self.apply_properties(&report);
        }
        if let Some(report) = dynamics {
            changed |= self.apply_shape_dynamics(&report);
        }
        if changed {
            tracing::debug!("[Sync] Snapshot updated");
        }
        changed
    }

    /// User edit of a scalar property
    ///
    /// The snapshot takes the normalized value immediately; a failed host
    /// write is logged and left for the next refresh to correct. Scalar
    /// properties live in the same tool options bag as shape dynamics, so
    /// the write waits for any read-modify-write in flight.
    pub async fn set_property(&self, property: BrushProperty, value: f64) -> i32 {
        let value = property.normalize(value);
        self.shared.snapshot.send_if_modified(|snapshot| {
            let changed = snapshot.get(property) != value;
            snapshot.set(property, value);
            changed
        });

        let _guard = self.shared.tool_options.lock().await;
        if let Err(e) = self.shared.host.set_brush_property(property, value).await {
            tracing::warn!("[Sync] Failed to set {} to {}: {}", property, value, e);
        }
        value
    }

    /// User edit of a shape dynamics value
    ///
    /// Writes of the tool options bag are serialized so two concurrent edits
    /// cannot read the same bag and overwrite each other.
    pub async fn set_shape_dynamics(&self, field: ShapeDynamicsField, value: f64) -> i32 {
        let value = field.normalize(value);
        self.shared.snapshot.send_if_modified(|snapshot| {
            let changed = snapshot.shape_dynamics.get(field) != value;
            snapshot.shape_dynamics.set(field, value);
            changed
        });

        let _guard = self.shared.tool_options.lock().await;
        if let Err(e) = self.shared.host.set_shape_dynamics_field(field, value).await {
            tracing::warn!("[Sync] Failed to set {} to {}: {}", field, value, e);
        }
        value
    }

    /// Track tool and preset selection; returns whether a refresh is due
    pub fn handle_event(&self, event: &HostEvent) -> bool {
        match descriptor::selection_target(event) {
            Some(SelectionTarget::Preset(preset)) => {
                tracing::debug!("[Sync] Preset selected: {}", preset.name);
                self.with_presets(|cache| cache.record(preset));
            }
            Some(SelectionTarget::Tool(kind)) => {
                // Custom shortcuts of the same kind stay active
                if shortcut_kind(&self.active_tool()) != Some(kind) {
                    self.set_active_tool(kind.id());
                } else {
                    self.invalidate_preset();
                }
            }
            Some(SelectionTarget::OtherTool(class)) => self.set_active_tool(&class),
            None => {}
        }
        descriptor::wants_refresh(event)
    }

    /// Start listening and polling
    ///
    /// Performs the initial refresh before returning. If the host refuses the
    /// subscription the session runs on the poll alone.
    pub async fn activate(&self) -> SyncSession<H> {
        let subscription = match self.shared.host.subscribe(&WATCHED_EVENTS).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                tracing::warn!("[Sync] Subscribe failed, polling only: {}", e);
                None
            }
        };

        self.refresh().await;

        let mut tasks = Vec::with_capacity(2);
        let mut subscription_id = None;

        if let Some(subscription) = subscription {
            subscription_id = Some(subscription.id);
            let mut events = subscription.events;
            let engine = self.clone();
            let refresher = self.clone();
            let debouncer = Debouncer::spawn(self.shared.config.debounce(), move || {
                let refresher = refresher.clone();
                async move {
                    refresher.refresh().await;
                }
            });

            tasks.push(tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    if engine.handle_event(&event) {
                        debouncer.trigger();
                    }
                }
                tracing::debug!("[Sync] Host notification stream closed");
            }));
        }

        let engine = self.clone();
        let period = self.shared.config.poll_interval();
        tasks.push(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                engine.refresh().await;
            }
        }));

        tracing::info!(
            "[Sync] Activated (events: {}, poll: {}ms)",
            subscription_id.is_some(),
            self.shared.config.poll_interval_ms
        );

        SyncSession {
            host: self.shared.host.clone(),
            subscription: subscription_id,
            tasks,
        }
    }
}

/// Live subscription and timers of an active engine
///
/// Dropping the session stops everything; [`SyncSession::shutdown`] does the
/// same but also waits for the host to confirm the unsubscribe.
pub struct SyncSession<H: HostAdapter> {
    host: Arc<H>,
    subscription: Option<SubscriptionId>,
    tasks: Vec<JoinHandle<()>>,
}

impl<H: HostAdapter> SyncSession<H> {
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub async fn shutdown(mut self) {
        self.abort_tasks();
        if let Some(id) = self.subscription.take() {
            self.host.unsubscribe(id).await;
        }
        tracing::info!("[Sync] Deactivated");
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl<H: HostAdapter> Drop for SyncSession<H> {
    fn drop(&mut self) {
        self.abort_tasks();
        let Some(id) = self.subscription.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let host = self.host.clone();
                handle.spawn(async move {
                    host.unsubscribe(id).await;
                });
            }
            Err(_) => {
                tracing::warn!("[Sync] Session dropped outside a runtime, subscription leaked")
            }
        }
    }
}
