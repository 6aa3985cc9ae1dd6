//! Core business logic - framework-agnostic student, category, rent and payment operations.
//!
//! Everything here takes an explicit `SeaORM` connection (or transaction) and returns
//! plain models or result structs; formatting for a particular front end happens in
//! the bot layer.

/// Category (pricing tier) management
pub mod category;
/// Timeouts for store operations
pub mod deadline;
/// Payment ledger queries
pub mod history;
/// Monthly rent generation
pub mod monthly;
/// Payment processing across the four balance buckets
pub mod payment;
/// `YYYY-MM` billing periods
pub mod period;
/// Rent lookups and balance helpers
pub mod rent;
/// Per-period billing reports
pub mod report;
/// Settlement status calculation
pub mod status;
/// Student management
pub mod student;
