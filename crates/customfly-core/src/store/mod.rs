//! Interfaces of the live stores that actions mutate.
//!
//! The engine never owns this data; it reaches it only through these traits
//! so that tests and embedders can inject their own implementations.

mod asset;
mod config;
mod design;

pub use asset::{Asset, AssetStore, AssetType, NewAsset};
pub use config::{ConfigStore, Fields, ProductConfig, merge_fields};
pub use design::{DesignElement, DesignPage, DesignStore};
