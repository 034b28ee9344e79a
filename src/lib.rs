//! Offline-first attendance core: a local SQLite store of schools, classes,
//! students and attendance records, a push-then-pull sync engine against a
//! remote HTTP API, and a connectivity monitor that triggers sync on
//! reconnection. The presentation layer talks to it over the JSON line
//! protocol in [`ipc`].

pub mod config;
pub mod connectivity;
pub mod core;
pub mod db;
pub mod error;
pub mod ipc;
pub mod model;
pub mod recorder;
pub mod remote;
pub mod store;
pub mod sync;

pub use crate::core::Core;
