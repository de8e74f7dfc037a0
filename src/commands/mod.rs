//! Command handlers behind [`crate::invoke`].
//!
//! Every handler takes the shared [`crate::AppState`] plus an optional JSON
//! payload and answers `Result<Value, String>`, the shape the front-end
//! bridge forwards unchanged.

pub mod auth;
pub mod orders;
pub mod refunds;
pub mod settings;
pub mod system;
