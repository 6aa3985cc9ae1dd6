//! Rent history entity - The append-only payment ledger.
//!
//! One row is written per payment. `due_*` columns hold what was still owed on
//! each bucket right before the payment; `paid_*` columns hold only what this
//! payment contributed, so summing a rent's rows reproduces its paid totals.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Payment accepted and applied
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Awaiting review
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Rejected by an administrator
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Rent history database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rent_histories")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Rent the payment was applied to
    pub rent_id: i64,
    /// Student who paid
    pub student_id: i64,
    /// Category of the rent at the time of payment
    pub category_id: i64,
    /// Billing period label of the rent, `YYYY-MM`
    pub period: String,
    /// Outstanding tariff before this payment
    pub due_rent: f64,
    /// Outstanding advance before this payment
    pub due_advance: f64,
    /// Outstanding external charges before this payment
    pub due_external: f64,
    /// Outstanding carried balance before this payment
    pub due_previous: f64,
    /// Tariff paid by this payment
    pub paid_rent: f64,
    /// Advance paid by this payment
    pub paid_advance: f64,
    /// External charges paid by this payment
    pub paid_external: f64,
    /// Carried balance paid by this payment
    pub paid_previous: f64,
    /// Payment channel
    pub paid_type: String,
    /// Approval state
    pub status: ApprovalStatus,
    /// Free-form notes (receipt number, remarks, ...)
    pub details: Option<String>,
    /// When the payment was recorded
    pub paid_at: DateTimeUtc,
}

/// Defines relationships between RentHistory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one rent
    #[sea_orm(
        belongs_to = "super::rent::Entity",
        from = "Column::RentId",
        to = "super::rent::Column::Id"
    )]
    Rent,
}

impl Related<super::rent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
