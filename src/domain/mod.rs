//! Domain - Pure Data Structures and Protocol Types
//!
//! Metrics snapshots, typed backend payloads and configuration. Nothing here
//! performs I/O except config file loading.

pub mod api;
pub mod config;
pub mod metrics;
