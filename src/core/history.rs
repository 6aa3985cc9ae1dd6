//! Payment ledger - append and query rent history entries.
//!
//! Entries are only ever inserted (by the payment processor) and read back.

use crate::{
    core::{period::Period, status::Buckets},
    entities::{ApprovalStatus, RentHistory, rent, rent_history},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ItemsAndPagesNumber, QueryOrder, Set, prelude::*};

/// Default number of entries per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// What a new ledger entry records about one payment.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    /// Outstanding amounts right before the payment
    pub due: Buckets,
    /// Amounts this payment contributed
    pub paid: Buckets,
    /// Payment channel
    pub paid_type: String,
    /// Approval state
    pub status: ApprovalStatus,
    /// Free-form notes
    pub details: Option<String>,
    /// When the payment was recorded
    pub paid_at: DateTime<Utc>,
}

/// Appends a ledger entry for `rent`.
pub async fn create_rent_history<C>(
    db: &C,
    rent: &rent::Model,
    entry: NewHistoryEntry,
) -> Result<rent_history::Model>
where
    C: ConnectionTrait,
{
    let history = rent_history::ActiveModel {
        rent_id: Set(rent.id),
        student_id: Set(rent.student_id),
        category_id: Set(rent.category_id),
        period: Set(rent.period.clone()),
        due_rent: Set(entry.due.rent),
        due_advance: Set(entry.due.advance),
        due_external: Set(entry.due.external),
        due_previous: Set(entry.due.previous_due),
        paid_rent: Set(entry.paid.rent),
        paid_advance: Set(entry.paid.advance),
        paid_external: Set(entry.paid.external),
        paid_previous: Set(entry.paid.previous_due),
        paid_type: Set(entry.paid_type),
        status: Set(entry.status),
        details: Set(entry.details),
        paid_at: Set(entry.paid_at),
        ..Default::default()
    };

    history.insert(db).await.map_err(Into::into)
}

/// Narrows a history query. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Only entries for this rent
    pub rent_id: Option<i64>,
    /// Only entries for this student
    pub student_id: Option<i64>,
    /// Only entries for this billing period
    pub period: Option<Period>,
    /// Only entries in this approval state
    pub status: Option<ApprovalStatus>,
}

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number, starting at 1
    pub page: u64,
    /// Entries per page, at least 1
    pub per_page: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of ledger entries plus totals for navigation.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    /// Entries on this page, newest first
    pub entries: Vec<rent_history::Model>,
    /// Number of entries matching the filter
    pub total_items: u64,
    /// Number of pages at this page size
    pub total_pages: u64,
    /// The page that was returned
    pub page: u64,
    /// Page size used
    pub per_page: u64,
}

/// Queries the ledger, newest entries first.
///
/// # Errors
/// `InvalidArgument` when `page` or `per_page` is zero.
pub async fn find_rent_history<C>(
    db: &C,
    filter: &HistoryFilter,
    pagination: Pagination,
) -> Result<HistoryPage>
where
    C: ConnectionTrait,
{
    if pagination.page == 0 || pagination.per_page == 0 {
        return Err(Error::InvalidArgument {
            message: "page and per_page must both be at least 1".to_string(),
        });
    }

    let mut query = RentHistory::find();
    if let Some(rent_id) = filter.rent_id {
        query = query.filter(rent_history::Column::RentId.eq(rent_id));
    }
    if let Some(student_id) = filter.student_id {
        query = query.filter(rent_history::Column::StudentId.eq(student_id));
    }
    if let Some(period) = filter.period {
        query = query.filter(rent_history::Column::Period.eq(period.label()));
    }
    if let Some(status) = filter.status {
        query = query.filter(rent_history::Column::Status.eq(status));
    }

    let paginator = query
        .order_by_desc(rent_history::Column::PaidAt)
        .order_by_desc(rent_history::Column::Id)
        .paginate(db, pagination.per_page);

    let ItemsAndPagesNumber {
        number_of_items,
        number_of_pages,
    } = paginator.num_items_and_pages().await?;
    let entries = paginator.fetch_page(pagination.page - 1).await?;

    Ok(HistoryPage {
        entries,
        total_items: number_of_items,
        total_pages: number_of_pages,
        page: pagination.page,
        per_page: pagination.per_page,
    })
}

/// Sums the paid deltas of a set of ledger entries.
///
/// For all entries of one rent this equals the rent's paid totals.
#[must_use]
pub fn sum_paid(entries: &[rent_history::Model]) -> Buckets {
    entries.iter().fold(Buckets::ZERO, |acc, entry| {
        acc.plus(Buckets {
            rent: entry.paid_rent,
            advance: entry.paid_advance,
            external: entry.paid_external,
            previous_due: entry.paid_previous,
        })
    })
}
