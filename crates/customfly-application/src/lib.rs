//! Application layer for Customfly.
//!
//! Use cases coordinating the action store, the executor registry and the
//! session store: proposing, executing and rolling back actions, bulk
//! fan-out, recommendations and impact accounting.

pub mod action_usecase;
pub mod bulk_controller;
pub mod engine;
pub mod execution_controller;
pub mod impact_service;
pub mod recommendation_service;
pub mod session_service;
pub mod telemetry;

pub use action_usecase::ActionUseCase;
pub use bulk_controller::BulkController;
pub use engine::CustomflyEngine;
pub use execution_controller::ExecutionController;
pub use impact_service::{ImpactService, ImpactStats};
pub use recommendation_service::RecommendationService;
pub use session_service::SessionService;
pub use telemetry::init_tracing;
