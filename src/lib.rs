//! taskdeck — client library for the client/task-management REST backend.
//!
//! The heart of the crate is the session layer ([`session`]) and the
//! authenticated client built on it ([`api::ApiClient`]): bearer-token
//! injection, single-flight refresh on 401, retry-once, and a one-shot
//! expired-session signal. [`data`] layers per-resource services with
//! refetch-after-mutation snapshots on top; the binary in `main.rs` is one
//! presentation layer over those services.

pub mod api;
pub mod config;
pub mod data;
pub mod errors;
pub mod session;
