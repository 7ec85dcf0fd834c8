//! Application Layer
//!
//! Wires configuration, services and dashboard state together and drives
//! them from a terminal session.

pub mod application;
pub mod console;
