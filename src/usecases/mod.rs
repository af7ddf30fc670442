//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces. Each use case
//! is one self-contained request pass.
//!
//! Use cases:
//! - `DashboardService`: ledger load, filter and KPI aggregation
//! - `LivePositionsService`: open-holdings load, filter and summary
//! - `ChatAssistant`: context building, dispatch, transcript upkeep

pub mod chat_session;
pub mod dashboard;
pub mod live_positions;

pub use chat_session::{ChatAssistant, ChatReply};
pub use dashboard::{DashboardService, DashboardView};
pub use live_positions::{LivePositionsService, LiveView};
