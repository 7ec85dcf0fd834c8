//! State - Dashboard State Modules
//!
//! Each module owns one piece of view state. [`DashboardState`] ties them
//! together and is their only writer:
//!
//! ```text
//! User Action → DashboardState method → ServiceHub call → ServiceEvent → State Update → UiEvent
//! ```

pub mod analysis_state;
pub mod anomaly;
pub mod chat_state;
pub mod connection_state;
pub mod dashboard;
pub mod forecast_state;
pub mod history_state;
pub mod snapshot_store;
pub mod tabs_state;
pub mod ui_event;

pub use dashboard::DashboardState;
