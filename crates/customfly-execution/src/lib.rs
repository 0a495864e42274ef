//! Executors for Customfly actions.
//!
//! One [`Executor`] implementation per target kind, collected in an
//! [`ExecutorRegistry`] keyed by [`ActionKind`](customfly_core::action::ActionKind).

pub mod asset;
pub mod bulk;
pub mod configuration;
pub mod design;
pub mod executor;
pub mod registry;
pub mod resolver;
pub mod tracing_layer;

pub use asset::{AssetExecutor, AssetOperation};
pub use bulk::BulkExecutor;
pub use configuration::ConfigurationExecutor;
pub use design::{DesignOperation, ProductDesignExecutor};
pub use executor::{Applied, Executor};
pub use registry::{ExecutorRegistry, LiveStores};
pub use resolver::{ResolutionStrategy, resolve_asset};
pub use tracing_layer::{ActionEvent, ActionEventLayer};
