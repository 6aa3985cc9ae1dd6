//! Rent entity - One student's obligation for one billing period.
//!
//! A rent carries four independent due/paid bucket pairs (rent, advance,
//! external, previous-due). Rows are created once per student per period by
//! the monthly cycle and then mutated in place by payments; they are never
//! deleted. `version` is bumped by every payment so concurrent writers can be
//! detected with a compare-and-swap.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settlement status of a rent, derived from its buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RentStatus {
    /// Nothing paid yet
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Something paid, something still owed
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Fully settled
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl RentStatus {
    /// Lowercase label as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for RentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rent database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rents")]
pub struct Model {
    /// Unique identifier for the rent
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student this rent is billed to
    pub student_id: i64,
    /// Category the tariff was taken from
    pub category_id: i64,
    /// Billing period label, `YYYY-MM`, fixed at creation
    pub period: String,
    /// Monthly tariff due
    pub rent_amount: f64,
    /// Tariff paid so far
    pub rent_paid: f64,
    /// Advance (deposit) due
    pub advance_amount: f64,
    /// Advance paid so far
    pub advance_paid: f64,
    /// External charges due (utilities, meals, ...)
    pub external_amount: f64,
    /// External charges paid so far
    pub external_paid: f64,
    /// Balance carried over from the previous period
    pub previous_due: f64,
    /// Carried balance paid so far
    pub previous_due_paid: f64,
    /// Derived settlement status
    pub status: RentStatus,
    /// When the last payment was recorded
    pub paid_date: Option<DateTimeUtc>,
    /// Channel of the last payment (`"on hand"`, `"online"`, ...)
    pub paid_type: Option<String>,
    /// Bumped on every payment
    pub version: i32,
    /// When the rent was generated
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Rent and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each rent belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    /// One rent has many history entries
    #[sea_orm(has_many = "super::rent_history::Entity")]
    Histories,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::rent_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Histories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
