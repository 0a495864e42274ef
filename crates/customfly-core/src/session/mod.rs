//! Session domain module.
//!
//! - `model`: Core session domain model (`Session`, `SessionStatus`)
//! - `repository`: Repository trait for session persistence

mod model;
mod repository;

pub use model::{Session, SessionStatus};
pub use repository::SessionRepository;
