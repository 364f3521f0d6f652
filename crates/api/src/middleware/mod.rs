//! Request middleware (auth extraction).

pub mod auth;
