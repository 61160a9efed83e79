//! Core types and logic for kmremote.
//!
//! This crate talks to the web server built into Keyboard Maestro: it
//! discovers the macros the server publishes, triggers them, and reports
//! failures as a small closed set of error kinds a caller can act on.
//!
//! # Modules
//!
//! - [`config`]: Connection settings, validation and endpoint derivation
//! - [`macros`]: Macro descriptors and display helpers
//! - [`catalog`]: Scanning the server's control page for macros
//! - [`client`]: HTTP client for probe, list and execute
//! - [`error`]: Error kinds with actionable suggestions
//! - [`outcome`]: Serializable per-operation reports
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | **probe** | `GET {scheme}://{host}:{port}/` |
//! | **list** | `GET {scheme}://{host}:{port}/` |
//! | **execute** | `GET {scheme}://{host}:{port}/action.html?macro={id}` |
//!
//! The client holds no state between calls apart from its connection pool,
//! so one [`client::RemoteClient`] can be shared by any number of callers.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod macros;
pub mod outcome;
