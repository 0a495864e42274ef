//! Tracing subscriber setup for hosts embedding the engine.

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use customfly_core::config::EngineSettings;
use customfly_core::error::{CustomflyError, Result};
use customfly_execution::{ActionEvent, ActionEventLayer};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `settings.log_level`. When `feed` is given, every
/// `customfly::*` event is also forwarded to it for the live audit feed.
///
/// # Errors
///
/// Returns `Config` if a global subscriber is already installed.
pub fn init_tracing(
    settings: &EngineSettings,
    feed: Option<mpsc::UnboundedSender<ActionEvent>>,
) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(feed.map(ActionEventLayer::new))
        .try_init()
        .map_err(|e| CustomflyError::config(format!("failed to install tracing subscriber: {e}")))
}
