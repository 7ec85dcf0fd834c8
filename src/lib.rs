//! GreenForce Monitor Library
//!
//! Live sustainability dashboard client: streams CO₂, waste and energy
//! metrics from the GreenForce backend, raises anomaly notices and invokes
//! the backend's analysis, forecast, history and chat actions.

pub mod app;
pub mod constants;
pub mod domain;
pub mod error;
pub mod helpers;
pub mod services;
pub mod state;
