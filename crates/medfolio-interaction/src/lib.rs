//! HTTP transport for the Medfolio backend.
//!
//! [`HttpBackendClient`] implements [`medfolio_core::BackendApi`] over reqwest.

pub mod error_body;
pub mod http_client;

pub use http_client::HttpBackendClient;
