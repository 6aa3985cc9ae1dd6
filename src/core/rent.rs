//! Rent lookups and balance helpers.
//!
//! Rents are only created by [`crate::core::monthly`] and only mutated by
//! [`crate::core::payment`]; this module is the read side.

use crate::{
    core::{period::Period, status::Buckets},
    entities::{Rent, RentStatus, rent},
    errors::Result,
};
use sea_orm::{QueryOrder, prelude::*};

/// Finds a rent by its unique ID.
pub async fn get_rent_by_id<C>(db: &C, rent_id: i64) -> Result<Option<rent::Model>>
where
    C: ConnectionTrait,
{
    Rent::find_by_id(rent_id).one(db).await.map_err(Into::into)
}

/// Finds the rent billed to a student for a given period.
///
/// There is at most one, guaranteed by the unique `(student_id, period)` index.
pub async fn find_rent_by_student_and_period<C>(
    db: &C,
    student_id: i64,
    period: Period,
) -> Result<Option<rent::Model>>
where
    C: ConnectionTrait,
{
    Rent::find()
        .filter(rent::Column::StudentId.eq(student_id))
        .filter(rent::Column::Period.eq(period.label()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All rents of one period, ordered by student.
pub async fn get_rents_for_period<C>(db: &C, period: Period) -> Result<Vec<rent::Model>>
where
    C: ConnectionTrait,
{
    Rent::find()
        .filter(rent::Column::Period.eq(period.label()))
        .order_by_asc(rent::Column::StudentId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All rents of one student, newest period first.
pub async fn get_rents_for_student<C>(db: &C, student_id: i64) -> Result<Vec<rent::Model>>
where
    C: ConnectionTrait,
{
    Rent::find()
        .filter(rent::Column::StudentId.eq(student_id))
        .order_by_desc(rent::Column::Period)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Rents of a student that are not fully settled, oldest first.
pub async fn get_open_rents_for_student<C>(db: &C, student_id: i64) -> Result<Vec<rent::Model>>
where
    C: ConnectionTrait,
{
    Rent::find()
        .filter(rent::Column::StudentId.eq(student_id))
        .filter(rent::Column::Status.ne(RentStatus::Paid))
        .order_by_asc(rent::Column::Period)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Total still owed on a rent across all four buckets.
#[must_use]
pub fn outstanding_balance(rent: &rent::Model) -> f64 {
    Buckets::outstanding_of(rent).total()
}

/// Amount a rent pushes into the next period's previous-due bucket.
///
/// A settled rent carries nothing. Otherwise the unpaid tariff, external charges and
/// carried balance roll forward; an unpaid advance stays on the rent it was billed on.
#[must_use]
pub fn carry_forward_amount(rent: &rent::Model) -> f64 {
    if rent.status == RentStatus::Paid {
        return 0.0;
    }
    let outstanding = Buckets::outstanding_of(rent);
    outstanding.rent + outstanding.external + outstanding.previous_due
}
