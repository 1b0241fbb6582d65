//! Client for a per-user file storage application backed by an Internet
//! Computer asset canister.
//!
//! The crate orchestrates three externally-provided capabilities: the
//! delegated identity flow ([`session`]), the remote asset store
//! ([`assets`]), and the batched progress-reporting upload transaction.
//! The [`workflows`] module composes them into the upload and listing
//! workflows; [`FileStorage`] assembles the whole client for a hosting
//! front-end.

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod session;
pub mod workflows;

pub use self::app::FileStorage;
pub use self::config::{Config, Network};
pub use self::error::ClientError;
