//! # split-ledger
//!
//! Balance ledger and debt-settlement engine for shared expenses.
//!
//! Given the events a user takes part in and the expenses recorded in them,
//! this crate computes each participant's net balance per event, turns the
//! balances into a short list of settling payments, and rolls those payments
//! up per currency for the signed-in user.
//!
//! ## Architecture
//!
//! - **core** — Participants, events, expenses, and the per-event ledger
//! - **optimization** — Greedy settlement and per-user exposure queries
//! - **simulation** — Random snapshot generation for stress testing
//!
//! Every computation is a pure function of the snapshot it is handed.
//! Nothing is cached and nothing is persisted.

pub mod core;
pub mod optimization;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::{CurrencyCode, CurrencyFormat, SymbolFormat};
    pub use crate::core::event::Event;
    pub use crate::core::expense::{Allocation, AllocationRef, Expense, ExpensesByEvent};
    pub use crate::core::ledger::{compute_balances, Ledger};
    pub use crate::core::party::{Participant, ParticipantId, SessionIdentity};
    pub use crate::core::snapshot::Snapshot;
    pub use crate::optimization::exposure::{
        CurrencyExposure, Direction, ExposureAggregator, ExposureReport, PairwiseRecord,
    };
    pub use crate::optimization::settlement::{SettlementSolver, Transaction};
}
