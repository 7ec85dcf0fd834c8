//! Service Layer
//!
//! The service layer talks to the GreenForce backend: it owns the live push
//! channel, performs one-shot API calls and reports everything back as
//! [`ServiceEvent`]s.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ServiceHub                              │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────────┐    │
//! │  │  ApiClient  │  │  LiveFeed   │  │    Supervisor    │    │
//! │  │  (actions)  │  │  (SSE)      │  │  (health/retry)  │    │
//! │  └─────────────┘  └─────────────┘  └──────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼ ServiceEvent
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      State Layer                             │
//! │                  (DashboardState, etc.)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod api_client;
mod events;
mod hub;
mod live_feed;
mod sse;
mod supervisor;

pub use api_client::*;
pub use events::*;
pub use hub::*;
pub use live_feed::*;
pub use sse::*;
pub use supervisor::*;
