//! Domain layer of the Customfly action engine.
//!
//! Holds the action and session models, the repository traits for the
//! action record store, and the interfaces of the live stores (configuration,
//! assets, product designs) that executors mutate.

pub mod action;
pub mod config;
pub mod error;
pub mod session;
pub mod store;

// Re-export common error type
pub use error::{CustomflyError, Result};
