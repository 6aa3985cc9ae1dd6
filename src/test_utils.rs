//! Shared test utilities for `RentBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        category,
        period::Period,
        status::Buckets,
        student::{self, NewStudent},
    },
    entities::{self, CategoryStatus, RentStatus, StudentStatus},
    errors::Result,
};
use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

fn joining_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// Creates an active test category.
pub async fn create_test_category(
    db: &DatabaseConnection,
    title: &str,
    amount: f64,
) -> Result<entities::category::Model> {
    category::create_category(db, title, amount, None).await
}

/// Admits a living test student.
///
/// # Defaults
/// * `name`: "Student <phone>"
/// * `joining_date`: 2024-01-01
/// * no SMS phone, credential, reference or discount
pub async fn create_test_student(
    db: &DatabaseConnection,
    phone: &str,
    category_id: i64,
) -> Result<entities::student::Model> {
    student::create_student(
        db,
        NewStudent {
            phone: phone.to_string(),
            name: format!("Student {phone}"),
            sms_phone: None,
            password_hash: None,
            category_id,
            joining_date: joining_date(),
            reference_id: None,
            discount_id: None,
        },
    )
    .await
}

/// Inserts a living student directly, skipping the category check in
/// [`student::create_student`]. Used to simulate a student whose category was
/// removed out from under them.
pub async fn insert_orphan_student(
    db: &DatabaseConnection,
    phone: &str,
    category_id: i64,
) -> Result<entities::student::Model> {
    let orphan = entities::student::ActiveModel {
        phone: Set(phone.to_string()),
        name: Set(format!("Orphan {phone}")),
        sms_phone: Set(None),
        password_hash: Set(None),
        category_id: Set(category_id),
        status: Set(StudentStatus::Living),
        joining_date: Set(joining_date()),
        reference_id: Set(None),
        discount_id: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    orphan.insert(db).await.map_err(Into::into)
}

/// Inserts an unpaid rent with only the tariff bucket set.
pub async fn create_test_rent(
    db: &DatabaseConnection,
    student: &entities::student::Model,
    category_id: i64,
    period: Period,
    rent_amount: f64,
) -> Result<entities::rent::Model> {
    create_custom_rent(
        db,
        student,
        category_id,
        period,
        Buckets {
            rent: rent_amount,
            ..Buckets::ZERO
        },
    )
    .await
}

/// Inserts an unpaid rent with every due bucket chosen by the caller.
pub async fn create_custom_rent(
    db: &DatabaseConnection,
    student: &entities::student::Model,
    category_id: i64,
    period: Period,
    due: Buckets,
) -> Result<entities::rent::Model> {
    let rent = entities::rent::ActiveModel {
        student_id: Set(student.id),
        category_id: Set(category_id),
        period: Set(period.label()),
        rent_amount: Set(due.rent),
        rent_paid: Set(0.0),
        advance_amount: Set(due.advance),
        advance_paid: Set(0.0),
        external_amount: Set(due.external),
        external_paid: Set(0.0),
        previous_due: Set(due.previous_due),
        previous_due_paid: Set(0.0),
        status: Set(RentStatus::Unpaid),
        paid_date: Set(None),
        paid_type: Set(None),
        version: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    rent.insert(db).await.map_err(Into::into)
}

/// Sets up a test database with one category ("Standard Room", 4000.0) and one
/// living student billed under it.
pub async fn setup_with_student() -> Result<(
    DatabaseConnection,
    entities::category::Model,
    entities::student::Model,
)> {
    let db = setup_test_db().await?;
    let category = create_test_category(&db, "Standard Room", 4000.0).await?;
    let student = create_test_student(&db, "01700000001", category.id).await?;
    Ok((db, category, student))
}

/// An in-memory rent for pure calculations. Nothing is paid and the status is
/// `unpaid`.
#[must_use]
pub fn sample_rent_model(
    rent_amount: f64,
    external_amount: f64,
    previous_due: f64,
) -> entities::rent::Model {
    entities::rent::Model {
        id: 1,
        student_id: 1,
        category_id: 1,
        period: "2024-03".to_string(),
        rent_amount,
        rent_paid: 0.0,
        advance_amount: 0.0,
        advance_paid: 0.0,
        external_amount,
        external_paid: 0.0,
        previous_due,
        previous_due_paid: 0.0,
        status: RentStatus::Unpaid,
        paid_date: None,
        paid_type: None,
        version: 0,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
    }
}

/// An in-memory living student.
#[must_use]
pub fn sample_student_model(id: i64, category_id: i64) -> entities::student::Model {
    entities::student::Model {
        id,
        phone: format!("0170000{id:04}"),
        name: format!("Student {id}"),
        sms_phone: None,
        password_hash: None,
        category_id,
        status: StudentStatus::Living,
        joining_date: joining_date(),
        reference_id: None,
        discount_id: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// An in-memory active category.
#[must_use]
pub fn sample_category_model(id: i64, amount: f64) -> entities::category::Model {
    entities::category::Model {
        id,
        title: format!("Category {id}"),
        amount,
        status: CategoryStatus::Active,
        description: None,
    }
}
