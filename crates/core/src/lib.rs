//! FieldSync domain core: controller roles, leases, and handoff negotiation.
//!
//! This crate owns the authoritative state machine for game controller
//! coordination and has no internal dependencies, so the API server, the
//! polling client, and any future tooling all share the same types and
//! transition rules.
//!
//! The state transition functions in [`lease`] and [`handoff`] are pure and
//! take an explicit `now` timestamp; [`registry::ControllerRegistry`] applies
//! them under a per-game lock. Nothing here performs I/O.

pub mod config;
pub mod error;
pub mod handoff;
pub mod lease;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod types;

pub use config::{ControllerConfig, HandoffTimeoutPolicy};
pub use error::ControllerError;
pub use lease::ClaimOutcome;
pub use registry::ControllerRegistry;
pub use state::{ControllerState, PendingHandoff, Role, RoleHolder};
