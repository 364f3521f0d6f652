//! In-process controller event bus.

pub mod bus;

pub use bus::{ControllerEvent, EventBus};
