//! Payment processing - applies payments across the four balance buckets of a rent.
//!
//! Every payment runs inside one database transaction that:
//! 1. re-reads the rent,
//! 2. checks the allocation against what is still outstanding,
//! 3. writes the new paid totals and status guarded by the rent's `version`,
//! 4. appends a ledger entry with the pre-payment outstanding amounts and this
//!    payment's deltas.
//!
//! If any step fails the transaction is dropped and nothing is applied.

use crate::{
    core::{
        history::{self, NewHistoryEntry},
        status::{Buckets, EPSILON, compute_status},
    },
    entities::{ApprovalStatus, Rent, rent, rent_history},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::instrument;

/// Channel recorded when the caller does not name one.
pub const DEFAULT_PAYMENT_CHANNEL: &str = "on hand";

/// Result of a successful payment.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The rent after the payment
    pub rent: rent::Model,
    /// The ledger entry written for the payment
    pub history: rent_history::Model,
}

/// Rejects allocations with negative, NaN or infinite amounts.
pub fn validate_allocation(allocation: Buckets) -> Result<()> {
    for (field, amount) in allocation.named() {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { field, amount });
        }
    }
    Ok(())
}

/// Rejects allocations that would pay any bucket past its due amount.
pub fn check_overpayment(outstanding: Buckets, allocation: Buckets) -> Result<()> {
    for ((bucket, owed), (_, attempted)) in outstanding.named().into_iter().zip(allocation.named())
    {
        if attempted > owed + EPSILON {
            return Err(Error::Overpayment {
                bucket,
                attempted,
                outstanding: owed,
            });
        }
    }
    Ok(())
}

fn resolve_channel(channel: Option<&str>) -> String {
    channel
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_PAYMENT_CHANNEL)
        .to_string()
}

/// Applies `allocation` to a rent and records it in the ledger.
///
/// Amounts are added to the existing paid totals, so several partial payments can
/// settle a rent over time. `channel` defaults to [`DEFAULT_PAYMENT_CHANNEL`].
///
/// # Errors
/// - `InvalidAmount` for a negative or non-finite amount
/// - `NotFound` when the rent does not exist
/// - `Overpayment` when a bucket would be paid past its due amount
/// - `Conflict` when another payment changed the rent concurrently
#[instrument(skip(db, details))]
pub async fn apply_payment(
    db: &DatabaseConnection,
    rent_id: i64,
    allocation: Buckets,
    channel: Option<&str>,
    details: Option<String>,
) -> Result<PaymentOutcome> {
    validate_allocation(allocation)?;

    let txn = db.begin().await?;

    let rent = Rent::find_by_id(rent_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Rent", rent_id))?;

    let outcome = settle(&txn, rent, allocation, &resolve_channel(channel), details).await?;

    txn.commit().await?;

    tracing::info!(
        rent_id,
        status = %outcome.rent.status,
        amount = allocation.total(),
        "Payment applied"
    );
    Ok(outcome)
}

/// Pays off everything still outstanding on a rent, including advance and
/// previous-due. The resulting status is always `paid`.
///
/// # Errors
/// - `NotFound` when the rent does not exist
/// - `Conflict` when another payment changed the rent concurrently
#[instrument(skip(db, details))]
pub async fn apply_full_payment(
    db: &DatabaseConnection,
    rent_id: i64,
    channel: Option<&str>,
    details: Option<String>,
) -> Result<PaymentOutcome> {
    let txn = db.begin().await?;

    let rent = Rent::find_by_id(rent_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Rent", rent_id))?;

    let allocation = Buckets::outstanding_of(&rent);
    let outcome = settle(&txn, rent, allocation, &resolve_channel(channel), details).await?;

    txn.commit().await?;

    tracing::info!(rent_id, amount = allocation.total(), "Rent paid in full");
    Ok(outcome)
}

/// Writes the new paid totals and the ledger entry. Must run inside a transaction.
async fn settle<C>(
    db: &C,
    rent: rent::Model,
    allocation: Buckets,
    channel: &str,
    details: Option<String>,
) -> Result<PaymentOutcome>
where
    C: ConnectionTrait,
{
    let due = Buckets::due_of(&rent);
    let outstanding = Buckets::outstanding_of(&rent);
    check_overpayment(outstanding, allocation)?;

    let paid = Buckets::paid_of(&rent).plus(allocation);
    let status = compute_status(due, paid);
    let now = Utc::now();

    let changes = rent::ActiveModel {
        rent_paid: Set(paid.rent),
        advance_paid: Set(paid.advance),
        external_paid: Set(paid.external),
        previous_due_paid: Set(paid.previous_due),
        status: Set(status),
        paid_date: Set(Some(now)),
        paid_type: Set(Some(channel.to_string())),
        version: Set(rent.version + 1),
        ..Default::default()
    };

    let result = Rent::update_many()
        .set(changes)
        .filter(rent::Column::Id.eq(rent.id))
        .filter(rent::Column::Version.eq(rent.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::Conflict {
            message: format!(
                "Rent {} was modified by another payment, please retry",
                rent.id
            ),
        });
    }

    let updated = Rent::find_by_id(rent.id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Rent", rent.id))?;

    let history = history::create_rent_history(
        db,
        &updated,
        NewHistoryEntry {
            due: outstanding,
            paid: allocation,
            paid_type: channel.to_string(),
            status: ApprovalStatus::Approved,
            details,
            paid_at: now,
        },
    )
    .await?;

    Ok(PaymentOutcome {
        rent: updated,
        history,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        history::{HistoryFilter, Pagination, find_rent_history, sum_paid},
        period::Period,
    };
    use crate::entities::RentStatus;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    const fn allocation(rent: f64, advance: f64, external: f64, previous_due: f64) -> Buckets {
        Buckets {
            rent,
            advance,
            external,
            previous_due,
        }
    }

    /// Rent of 1000 with 200 external charges and 300 carried from last month.
    async fn setup_scenario_rent() -> Result<(DatabaseConnection, rent::Model)> {
        let (db, category, student) = setup_with_student().await?;
        let rent = create_custom_rent(
            &db,
            &student,
            category.id,
            Period::new(2024, 3)?,
            allocation(1000.0, 0.0, 200.0, 300.0),
        )
        .await?;
        Ok((db, rent))
    }

    #[tokio::test]
    async fn test_apply_payment_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = apply_payment(&db, 1, allocation(-1.0, 0.0, 0.0, 0.0), None, None).await;
        assert!(matches!(
            result,
            Err(Error::InvalidAmount { field: "rent", .. })
        ));

        let result =
            apply_payment(&db, 1, allocation(0.0, f64::NAN, 0.0, 0.0), None, None).await;
        assert!(matches!(
            result,
            Err(Error::InvalidAmount {
                field: "advance",
                ..
            })
        ));

        let result =
            apply_payment(&db, 1, allocation(0.0, 0.0, f64::INFINITY, 0.0), None, None).await;
        assert!(matches!(
            result,
            Err(Error::InvalidAmount {
                field: "external",
                ..
            })
        ));

        let result = apply_payment(&db, 1, allocation(0.0, 0.0, 0.0, -5.0), None, None).await;
        assert!(matches!(
            result,
            Err(Error::InvalidAmount {
                field: "previous_due",
                ..
            })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_payment_rent_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = apply_payment(&db, 999, allocation(10.0, 0.0, 0.0, 0.0), None, None).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Rent", .. })));

        let result = apply_full_payment(&db, 999, None, None).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Rent", .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_full_settlement_scenario() -> Result<()> {
        let (db, rent) = setup_scenario_rent().await?;

        let outcome = apply_payment(
            &db,
            rent.id,
            allocation(1000.0, 0.0, 200.0, 300.0),
            None,
            None,
        )
        .await?;

        assert_eq!(outcome.rent.status, RentStatus::Paid);
        assert_eq!(outcome.rent.rent_paid, 1000.0);
        assert_eq!(outcome.rent.external_paid, 200.0);
        assert_eq!(outcome.rent.previous_due_paid, 300.0);
        assert_eq!(outcome.rent.paid_type.as_deref(), Some("on hand"));
        assert!(outcome.rent.paid_date.is_some());

        let entry = &outcome.history;
        assert_eq!(entry.paid_rent, 1000.0);
        assert_eq!(entry.paid_advance, 0.0);
        assert_eq!(entry.paid_external, 200.0);
        assert_eq!(entry.paid_previous, 300.0);
        assert_eq!(entry.due_rent, 1000.0);
        assert_eq!(entry.due_external, 200.0);
        assert_eq!(entry.due_previous, 300.0);
        assert_eq!(entry.status, ApprovalStatus::Approved);
        assert_eq!(entry.period, "2024-03");
        assert_eq!(entry.rent_id, rent.id);
        assert_eq!(entry.student_id, rent.student_id);

        Ok(())
    }

    #[tokio::test]
    async fn test_partial_payment_scenario() -> Result<()> {
        let (db, rent) = setup_scenario_rent().await?;

        let outcome = apply_payment(
            &db,
            rent.id,
            allocation(500.0, 0.0, 0.0, 0.0),
            Some("online"),
            Some("bKash TX 8842".to_string()),
        )
        .await?;

        assert_eq!(outcome.rent.status, RentStatus::Partial);
        assert_eq!(outcome.rent.rent_paid, 500.0);
        assert_eq!(outcome.rent.version, rent.version + 1);
        assert_eq!(outcome.rent.paid_type.as_deref(), Some("online"));
        assert_eq!(outcome.history.details.as_deref(), Some("bKash TX 8842"));

        Ok(())
    }

    #[tokio::test]
    async fn test_due_snapshot_is_pre_payment_outstanding() -> Result<()> {
        let (db, rent) = setup_scenario_rent().await?;

        apply_payment(&db, rent.id, allocation(400.0, 0.0, 50.0, 0.0), None, None).await?;
        let second =
            apply_payment(&db, rent.id, allocation(100.0, 0.0, 0.0, 300.0), None, None).await?;

        assert_eq!(second.history.due_rent, 600.0);
        assert_eq!(second.history.due_external, 150.0);
        assert_eq!(second.history.due_previous, 300.0);
        assert_eq!(second.history.paid_rent, 100.0);
        assert_eq!(second.rent.rent_paid, 500.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_full_payment_covers_advance() -> Result<()> {
        let (db, category, student) = setup_with_student().await?;
        let rent = create_custom_rent(
            &db,
            &student,
            category.id,
            Period::new(2024, 3)?,
            allocation(1000.0, 150.0, 0.0, 0.0),
        )
        .await?;
        apply_payment(&db, rent.id, allocation(250.0, 0.0, 0.0, 0.0), None, None).await?;

        let outcome = apply_full_payment(&db, rent.id, Some("online"), None).await?;

        assert_eq!(outcome.rent.advance_paid, 150.0);
        assert_eq!(outcome.rent.rent_paid, 1000.0);
        assert_eq!(outcome.rent.status, RentStatus::Paid);
        assert_eq!(outcome.history.paid_advance, 150.0);
        assert_eq!(outcome.history.paid_rent, 750.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_full_payment_on_settled_rent_records_zero_entry() -> Result<()> {
        let (db, rent) = setup_scenario_rent().await?;
        apply_full_payment(&db, rent.id, None, None).await?;

        let again = apply_full_payment(&db, rent.id, None, None).await?;
        assert_eq!(again.rent.status, RentStatus::Paid);
        assert_eq!(again.history.paid_rent, 0.0);
        assert_eq!(again.history.due_rent, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_overpayment_is_rejected_and_nothing_changes() -> Result<()> {
        let (db, rent) = setup_scenario_rent().await?;
        apply_payment(&db, rent.id, allocation(900.0, 0.0, 0.0, 0.0), None, None).await?;

        let result =
            apply_payment(&db, rent.id, allocation(50.0, 0.0, 0.0, 301.0), None, None).await;
        assert!(matches!(
            result,
            Err(Error::Overpayment {
                bucket: "previous_due",
                ..
            })
        ));

        let result =
            apply_payment(&db, rent.id, allocation(200.0, 0.0, 0.0, 0.0), None, None).await;
        assert!(matches!(result, Err(Error::Overpayment { bucket: "rent", .. })));

        // Nothing from the rejected payments was written
        let stored = Rent::find_by_id(rent.id).one(&db).await?.unwrap();
        assert_eq!(stored.rent_paid, 900.0);
        assert_eq!(stored.previous_due_paid, 0.0);

        let page = find_rent_history(
            &db,
            &HistoryFilter {
                rent_id: Some(rent.id),
                ..HistoryFilter::default()
            },
            Pagination::default(),
        )
        .await?;
        assert_eq!(page.total_items, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_stale_version_is_a_conflict() -> Result<()> {
        let (db, rent) = setup_scenario_rent().await?;

        // Another writer bumps the version after our snapshot was taken
        apply_payment(&db, rent.id, allocation(100.0, 0.0, 0.0, 0.0), None, None).await?;
        let result = settle(
            &db,
            rent.clone(),
            allocation(100.0, 0.0, 0.0, 0.0),
            DEFAULT_PAYMENT_CHANNEL,
            None,
        )
        .await;

        assert!(matches!(result, Err(Error::Conflict { .. })));

        let stored = Rent::find_by_id(rent.id).one(&db).await?.unwrap();
        assert_eq!(stored.rent_paid, 100.0);
        assert_eq!(stored.version, rent.version + 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_reconstructs_paid_totals() -> Result<()> {
        let (db, category, student) = setup_with_student().await?;
        let rent = create_custom_rent(
            &db,
            &student,
            category.id,
            Period::new(2024, 3)?,
            allocation(1000.0, 150.0, 200.0, 300.0),
        )
        .await?;

        let payments = [
            allocation(100.0, 0.0, 0.0, 0.0),
            allocation(0.0, 50.0, 20.0, 0.0),
            allocation(0.0, 0.0, 0.0, 300.0),
            allocation(400.0, 0.0, 180.0, 0.0),
        ];
        for payment in payments {
            apply_payment(&db, rent.id, payment, None, None).await?;
        }
        apply_full_payment(&db, rent.id, None, None).await?;

        let entries = find_rent_history(
            &db,
            &HistoryFilter {
                rent_id: Some(rent.id),
                ..HistoryFilter::default()
            },
            Pagination {
                page: 1,
                per_page: 100,
            },
        )
        .await?
        .entries;
        assert_eq!(entries.len(), 5);

        let stored = Rent::find_by_id(rent.id).one(&db).await?.unwrap();
        let totals = sum_paid(&entries);
        assert_eq!(totals, Buckets::paid_of(&stored));
        assert_eq!(stored.status, RentStatus::Paid);

        Ok(())
    }

    #[test]
    fn test_resolve_channel_defaults() {
        assert_eq!(resolve_channel(None), "on hand");
        assert_eq!(resolve_channel(Some("   ")), "on hand");
        assert_eq!(resolve_channel(Some(" online ")), "online");
    }

    #[test]
    fn test_check_overpayment_allows_exact_remainder() {
        let outstanding = allocation(600.0, 0.0, 150.0, 0.0);
        assert!(check_overpayment(outstanding, outstanding).is_ok());
        assert!(check_overpayment(outstanding, Buckets::ZERO).is_ok());
        assert!(check_overpayment(outstanding, allocation(0.0, 0.01, 0.0, 0.0)).is_err());
    }
}
