//! Domain layer - Ledger, live-position and chat models.
//!
//! Pure logic only: no I/O, no clocks, no randomness. Every view here
//! recomputes deterministically from its inputs.

pub mod aggregate;
pub mod chat;
pub mod cost;
pub mod ledger;
pub mod positions;
pub mod session;
pub mod table;

// Re-export core types for convenience
pub use aggregate::{CategoryCount, InstrumentProfit, KpiSet, MonthlyProfit, aggregate};
pub use chat::{ChatTurn, Role, Transcript, build_request_context};
pub use cost::{CostEstimate, ModelRate, estimate_cost};
pub use ledger::{FilterOptions, FilterSelection, Ledger, TradeRecord};
pub use positions::{LivePositionBook, LiveSelection, LiveSummary};
pub use session::{AuthState, CredentialTable, Session};
pub use table::Table;
