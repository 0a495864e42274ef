//! Infrastructure layer: concrete stores, settings loading and file storage.

pub mod action_log;
pub mod in_memory_action_repository;
pub mod in_memory_session_repository;
pub mod in_memory_stores;
pub mod json_file_action_repository;
pub mod paths;
pub mod settings_service;
pub mod storage;

pub use crate::in_memory_action_repository::InMemoryActionRepository;
pub use crate::in_memory_session_repository::InMemorySessionRepository;
pub use crate::in_memory_stores::{InMemoryAssetStore, InMemoryConfigStore, InMemoryDesignStore};
pub use crate::json_file_action_repository::JsonFileActionRepository;
pub use crate::paths::CustomflyPaths;
pub use crate::settings_service::SettingsService;
