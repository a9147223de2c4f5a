//! Application layer for the Medfolio client.
//!
//! [`AppRouter`] is the entry point: it owns the [`SessionStore`] and one
//! controller per view, and is what a front end drives.

pub mod busy;
pub mod chat_format;
pub mod mount;
pub mod notification;
pub mod router;
pub mod session_store;
mod sync;
pub mod views;

pub use notification::{Notification, NotificationLevel, Notifications};
pub use router::AppRouter;
pub use session_store::SessionStore;
pub use views::ViewOutcome;
