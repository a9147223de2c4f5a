pub mod config_service;
pub mod paths;
pub mod storage;
pub mod toml_state_repository;

pub use crate::config_service::{ConfigOverrides, ConfigService};
pub use crate::paths::MedfolioPaths;
pub use crate::toml_state_repository::TomlStateRepository;
