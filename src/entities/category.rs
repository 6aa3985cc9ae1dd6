//! Category entity - A pricing tier students are billed under.
//!
//! The category `amount` is the monthly tariff and the only number the rent
//! cycle reads when it creates a new obligation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a category is offered to new students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    /// Category can be assigned
    #[sea_orm(string_value = "active")]
    Active,
    /// Category is retired; existing students keep it
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title (e.g., "Single Room", "Shared 4-Bed")
    #[sea_orm(unique)]
    pub title: String,
    /// Monthly rent tariff
    pub amount: f64,
    /// Active/inactive flag
    pub status: CategoryStatus,
    /// Optional free-form description
    pub description: Option<String>,
}

/// Students and rents refer to categories by id only, without a foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
