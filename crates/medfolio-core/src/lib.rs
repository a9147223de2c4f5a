//! Domain layer for the Medfolio client.
//!
//! Holds the models exchanged with the backend, the [`api::BackendApi`]
//! contract, persisted client state, and the shared error type. Nothing here
//! performs I/O.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod file;
pub mod profile;
pub mod schedule;
pub mod state;
pub mod time;
pub mod user;
pub mod view;

pub use api::{ApiError, ApiErrorKind, ApiResult, BackendApi, UploadRequest};
pub use error::{MedfolioError, Result};
pub use view::View;
