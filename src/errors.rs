//! Unified error types for `RentBuddy`.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are grouped
//! into a small taxonomy ([`ErrorKind`]) so that any front end can map them to a
//! user-visible outcome without matching on individual variants.

use thiserror::Error;

/// Coarse classification of an [`Error`], used by front ends to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced student, category or rent does not exist
    NotFound,
    /// Negative or non-numeric amount, overpayment, or a missing identifier
    InvalidArgument,
    /// A concurrent writer got there first (duplicate period, stale version)
    Conflict,
    /// Storage failure or timeout
    Unavailable,
}

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A student, category or rent lookup came back empty
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name (e.g. "Rent")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// An amount was negative, NaN or infinite
    #[error("Invalid amount for {field}: {amount}")]
    InvalidAmount {
        /// Bucket or field the amount was meant for
        field: &'static str,
        /// Offending value
        amount: f64,
    },

    /// A payment would push a bucket's paid total past its due total
    #[error("Overpayment on {bucket}: paying {attempted:.2} but only {outstanding:.2} is outstanding")]
    Overpayment {
        /// Bucket being overpaid
        bucket: &'static str,
        /// Amount the allocation tried to apply
        attempted: f64,
        /// Amount actually outstanding before the payment
        outstanding: f64,
    },

    /// Any other rejected input
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable reason
        message: String,
    },

    /// Optimistic concurrency or uniqueness conflict
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable reason
        message: String,
    },

    /// The store did not answer in time
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Human-readable reason
        message: String,
    },

    /// Underlying `SeaORM` failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Environment variable lookup failed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Writing into a `String` buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

impl Error {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidAmount { .. }
            | Self::Overpayment { .. }
            | Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Config { .. }
            | Self::Unavailable { .. }
            | Self::Database(_)
            | Self::EnvVar(_)
            | Self::Fmt(_)
            | Self::FrameworkError(_) => ErrorKind::Unavailable,
        }
    }

    /// HTTP-style status code for the error, for callers that speak HTTP.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidArgument => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::Unavailable => 500,
        }
    }

    /// Shorthand for a [`Error::NotFound`] keyed by a displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
