//! Database configuration module for `RentBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The one constraint entities cannot
//! express, the unique `(student_id, period)` pair on rents, is added as an explicit index;
//! it is what turns a second billing run for the same month into a rejected insert.

use crate::entities::{Category, Rent, RentHistory, Student, rent};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};

const DEFAULT_DATABASE_URL: &str = "sqlite://rent_buddy.sqlite?mode=rwc";

/// Name of the unique index guarding one rent per student per period.
pub const RENT_PERIOD_INDEX: &str = "idx_rents_student_period";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set. The returned
/// handle is the only store handle the application uses; it is passed explicitly into
/// every core operation.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables (if missing) plus the rent period index.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut tables = [
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Student),
        schema.create_table_from_entity(Rent),
        schema.create_table_from_entity(RentHistory),
    ];
    for table in &mut tables {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    let rent_period_index = Index::create()
        .name(RENT_PERIOD_INDEX)
        .table(Rent)
        .col(rent::Column::StudentId)
        .col(rent::Column::Period)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&rent_period_index)).await?;

    Ok(())
}
