//! Authentication building blocks (JWT claims and config).

pub mod jwt;
