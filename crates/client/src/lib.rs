//! `fieldsync-client` -- polling client for the controller coordination API.
//!
//! The server never pushes; clients converge by polling. This crate provides
//! the transport ([`api::HttpControllerApi`]), the pure observation diff
//! ([`snapshot`]), and the background polling loop ([`poller`]). The binary
//! entrypoint lives in `main.rs`.

pub mod api;
pub mod poller;
pub mod snapshot;

pub use api::{ClientError, ControllerApi, HttpControllerApi};
pub use poller::{ControllerPoller, PollerHandle};
pub use snapshot::{ControllerNotification, Snapshot};
