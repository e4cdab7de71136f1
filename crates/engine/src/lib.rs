//! Expense lifecycle engine for Cuentas Claras.
//!
//! Owns the state of an expense (gasto) from creation through approval or
//! rejection to payment or annulment, plus the side effects of each
//! transition: correlative numbering, approval aggregation, field-change
//! history and the closed-emission guard.

pub use approvals::Approval;
pub use commands::{
    AnnulExpenseCmd, CreateExpenseCmd, DecisionCmd, ExpenseListFilter, UpdateExpenseCmd,
};
pub use context::{ApprovalPolicy, Ctx, MemberRole};
pub use emissions::EmissionStatus;
pub use error::EngineError;
pub use expenses::Expense;
pub use history::HistoryEntry;
pub use ops::{Engine, EngineBuilder};
pub use status::{ApprovalDecision, ExpenseStatus};

pub mod approvals;
pub mod categories;
mod commands;
pub mod communities;
pub mod community_members;
mod context;
pub mod cost_centers;
pub mod emission_items;
pub mod emissions;
mod error;
pub mod expense_counters;
pub mod expenses;
pub mod history;
mod ops;
pub mod providers;
pub mod purchase_documents;
mod status;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
