//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Room category commands
pub mod category;

/// General utility commands
pub mod general;

/// Billing, payment and ledger commands
pub mod rent;

/// Student admission and departure commands
pub mod student;

// Export commands
pub use category::*;
pub use general::*;
pub use rent::*;
pub use student::*;
