//! Action domain module.
//!
//! # Module Structure
//!
//! - `model`: Action record, kind/status/target types and status updates
//! - `bulk`: Per-target outcomes of bulk actions
//! - `repository`: Repository trait for the action record store
//!
//! # Usage
//!
//! ```ignore
//! use customfly_core::action::{Action, ActionKind, ActionStatus, NewAction};
//! use customfly_core::action::ActionRepository;
//! ```

mod bulk;
mod model;
mod repository;

pub use bulk::{BulkFailure, BulkResult, BulkSuccess, SUB_ACTION_IDS};
pub use model::{
    Action, ActionFilter, ActionKind, ActionOrigin, ActionStatus, ActionTarget, NewAction,
    StatusUpdate, TargetKind,
};
pub use repository::ActionRepository;
