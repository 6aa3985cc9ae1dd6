//! Student business logic - admissions, departures and lookups.
//!
//! Students are never hard-deleted: leaving flips the status to `leave`, returning
//! flips it back to `living` with a new joining date. Only `living` students are
//! billed by the monthly cycle.

use crate::{
    core::category,
    entities::{Student, StudentStatus, student},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Fields needed to admit a student.
#[derive(Debug, Clone)]
pub struct NewStudent {
    /// Login phone number, must be unique
    pub phone: String,
    /// Full name
    pub name: String,
    /// Secondary phone for SMS notices
    pub sms_phone: Option<String>,
    /// Credential hash produced by the registration portal, if any
    pub password_hash: Option<String>,
    /// Category to bill under
    pub category_id: i64,
    /// Admission date
    pub joining_date: NaiveDate,
    /// Referring student
    pub reference_id: Option<i64>,
    /// Discount attached at admission
    pub discount_id: Option<i64>,
}

/// Finds a student by ID.
pub async fn get_student_by_id<C>(db: &C, student_id: i64) -> Result<Option<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find_by_id(student_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a student by login phone.
pub async fn get_student_by_phone<C>(db: &C, phone: &str) -> Result<Option<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::Phone.eq(phone.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All students with the given status, ordered by name.
pub async fn find_students_by_status<C>(
    db: &C,
    status: StudentStatus,
) -> Result<Vec<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::Status.eq(status))
        .order_by_asc(student::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Admits a new student as `living`.
///
/// # Errors
/// - `InvalidArgument` when phone or name is blank
/// - `NotFound` when the category does not exist
/// - `Conflict` when the phone is already registered
pub async fn create_student<C>(db: &C, new_student: NewStudent) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    let phone = new_student.phone.trim().to_string();
    let name = new_student.name.trim().to_string();
    if phone.is_empty() {
        return Err(Error::InvalidArgument {
            message: "Student phone cannot be empty".to_string(),
        });
    }
    if name.is_empty() {
        return Err(Error::InvalidArgument {
            message: "Student name cannot be empty".to_string(),
        });
    }

    category::find_category_by_id(db, new_student.category_id)
        .await?
        .ok_or_else(|| Error::not_found("Category", new_student.category_id))?;

    if get_student_by_phone(db, &phone).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("Phone {phone} is already registered"),
        });
    }

    let student = student::ActiveModel {
        phone: Set(phone),
        name: Set(name),
        sms_phone: Set(new_student.sms_phone),
        password_hash: Set(new_student.password_hash),
        category_id: Set(new_student.category_id),
        status: Set(StudentStatus::Living),
        joining_date: Set(new_student.joining_date),
        reference_id: Set(new_student.reference_id),
        discount_id: Set(new_student.discount_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = student.insert(db).await?;
    tracing::info!(student_id = created.id, "Admitted student {}", created.name);
    Ok(created)
}

/// Marks a student as having left. Rent history is kept.
pub async fn mark_student_left<C>(db: &C, student_id: i64) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    let student = get_student_by_id(db, student_id)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?;

    let mut active_model: student::ActiveModel = student.into();
    active_model.status = Set(StudentStatus::Leave);
    active_model.update(db).await.map_err(Into::into)
}

/// Re-admits a student who left, with a new joining date.
pub async fn mark_student_returned<C>(
    db: &C,
    student_id: i64,
    joining_date: NaiveDate,
) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    let student = get_student_by_id(db, student_id)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?;

    let mut active_model: student::ActiveModel = student.into();
    active_model.status = Set(StudentStatus::Living);
    active_model.joining_date = Set(joining_date);
    active_model.update(db).await.map_err(Into::into)
}

/// Moves a student to another category. Takes effect from the next generated rent.
pub async fn change_student_category<C>(
    db: &C,
    student_id: i64,
    category_id: i64,
) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    let student = get_student_by_id(db, student_id)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?;
    category::find_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found("Category", category_id))?;

    let mut active_model: student::ActiveModel = student.into();
    active_model.category_id = Set(category_id);
    active_model.update(db).await.map_err(Into::into)
}
