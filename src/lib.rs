//! Meow Brush favorites panel core
//!
//! Tool shortcuts, pinned brush presets and a live mirror of the host's brush
//! properties. The painting host is reached through [`host::HostAdapter`];
//! everything the user configures is persisted through
//! [`store::PreferenceStore`].

pub mod brush;
pub mod error;
pub mod favorites;
pub mod host;
pub mod ids;
pub mod panel;
pub mod settings;
pub mod store;
pub mod sync;
pub mod tools;

pub use error::{HostError, PanelError, StoreError};
pub use panel::Panel;
pub use sync::{PropertySyncEngine, SyncConfig};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the log subscriber at `info`, unless `RUST_LOG` says otherwise
pub fn init_logging() {
    init_logging_with("info");
}

/// Install the log subscriber with a fallback filter
///
/// Logs go to stderr. Calling this again after a subscriber is installed
/// does nothing.
pub fn init_logging_with(default_filter: &str) {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_ok() {
        tracing::debug!("[Log] Initialized ({})", default_filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging();
        init_logging_with("debug");
    }
}
