//! Student entity - A resident billed monthly under a category.
//!
//! Students are never hard-deleted; departure flips `status` to `leave` and a
//! return flips it back to `living` with a fresh `joining_date`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Residency status. Only `living` students are billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    /// Currently residing
    #[sea_orm(string_value = "living")]
    Living,
    /// Moved out
    #[sea_orm(string_value = "leave")]
    Leave,
}

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Phone number, unique, used as the login identifier
    #[sea_orm(unique)]
    pub phone: String,
    /// Full name
    pub name: String,
    /// Secondary phone for SMS notices
    pub sms_phone: Option<String>,
    /// Credential hash set by the registration portal; `None` until the student signs up
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Category the student is billed under (weak reference)
    pub category_id: i64,
    /// Residency status
    pub status: StudentStatus,
    /// Date of the most recent admission
    pub joining_date: Date,
    /// Referring student, if any
    pub reference_id: Option<i64>,
    /// Discount attached at admission, if any
    pub discount_id: Option<i64>,
    /// When the student record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many monthly rents
    #[sea_orm(has_many = "super::rent::Entity")]
    Rents,
}

impl Related<super::rent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
