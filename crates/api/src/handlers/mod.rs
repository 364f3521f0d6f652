//! HTTP handler functions, grouped by surface.

pub mod admin;
pub mod controller;
