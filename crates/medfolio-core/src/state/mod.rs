//! Persisted client state.

pub mod model;
pub mod repository;

pub use model::{PersistedState, RestoredCredentials};
pub use repository::StateRepository;
