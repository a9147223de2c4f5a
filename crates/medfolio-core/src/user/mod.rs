//! User and session domain module.
//!
//! - `model`: user record, registration body, token response
//! - `session`: the authenticated session held by the client

mod model;
mod session;

pub use model::{NewUser, TokenResponse, User};
pub use session::Session;
