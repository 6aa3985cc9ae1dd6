//! Monthly rent cycle.
//!
//! Once per calendar period every `living` student gets exactly one rent, billed at
//! their category's tariff. Whatever the student left unsettled on the previous
//! period's rent is carried into the new rent's `previous_due` bucket.
//!
//! Planning is pure ([`plan_monthly_rents`]); [`generate_monthly_rents`] loads the
//! inputs, plans, and inserts. Each insert commits on its own, so a run that stops
//! halfway can simply be started again: students already billed are skipped, and
//! the unique `(student_id, period)` index turns any concurrent duplicate into a
//! skipped conflict rather than a second rent.

use crate::{
    core::{period::Period, rent::carry_forward_amount},
    entities::{
        Category, Rent, RentStatus, Student, StudentStatus, category, rent, student,
    },
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Set, SqlErr, prelude::*};
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// A rent the cycle intends to create.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRent {
    /// Student being billed
    pub student_id: i64,
    /// Student name, for reporting
    pub student_name: String,
    /// Category the tariff comes from
    pub category_id: i64,
    /// Period being billed
    pub period: Period,
    /// Category tariff
    pub rent_amount: f64,
    /// Unsettled balance carried from the previous period
    pub previous_due: f64,
}

/// Output of [`plan_monthly_rents`].
#[derive(Debug, Clone)]
pub struct MonthlyPlan {
    /// Period being billed
    pub period: Period,
    /// Period whose balances are carried forward
    pub previous_period: Period,
    /// Rents to create
    pub rents: Vec<PlannedRent>,
    /// Living students that already have a rent for `period`
    pub already_billed: usize,
    /// Students whose category could not be found
    pub missing_category: Vec<i64>,
}

/// Plans the rents for the period containing `as_of`.
///
/// `existing_rents` should hold at least the rents of that period and the one before
/// it; rents of other periods are ignored. Students that are not `living` are
/// skipped silently.
#[must_use]
pub fn plan_monthly_rents(
    students: &[student::Model],
    categories: &[category::Model],
    existing_rents: &[rent::Model],
    as_of: NaiveDate,
) -> MonthlyPlan {
    let period = Period::from_date(as_of);
    let previous_period = period.previous();
    let current_label = period.label();
    let previous_label = previous_period.label();

    let categories: HashMap<i64, &category::Model> =
        categories.iter().map(|c| (c.id, c)).collect();
    let billed: HashSet<i64> = existing_rents
        .iter()
        .filter(|r| r.period == current_label)
        .map(|r| r.student_id)
        .collect();
    let previous: HashMap<i64, &rent::Model> = existing_rents
        .iter()
        .filter(|r| r.period == previous_label)
        .map(|r| (r.student_id, r))
        .collect();

    let mut plan = MonthlyPlan {
        period,
        previous_period,
        rents: Vec::new(),
        already_billed: 0,
        missing_category: Vec::new(),
    };

    for student in students
        .iter()
        .filter(|s| s.status == StudentStatus::Living)
    {
        if billed.contains(&student.id) {
            plan.already_billed += 1;
            continue;
        }

        let Some(category) = categories.get(&student.category_id) else {
            tracing::warn!(
                student_id = student.id,
                category_id = student.category_id,
                "Skipping student with unknown category"
            );
            plan.missing_category.push(student.id);
            continue;
        };

        let previous_due = previous
            .get(&student.id)
            .map_or(0.0, |rent| carry_forward_amount(rent));

        plan.rents.push(PlannedRent {
            student_id: student.id,
            student_name: student.name.clone(),
            category_id: category.id,
            period,
            rent_amount: category.amount,
            previous_due,
        });
    }

    plan
}

/// Outcome of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Period that was billed
    pub period: Period,
    /// Whether the run only planned
    pub dry_run: bool,
    /// Everything the run intended to create
    pub planned: Vec<PlannedRent>,
    /// Rents actually inserted (empty on a dry run)
    pub created: Vec<rent::Model>,
    /// Living students that already had a rent for the period
    pub already_billed: usize,
    /// Students skipped because their category is missing
    pub missing_category: Vec<i64>,
    /// Inserts that lost to a concurrent run and were skipped
    pub conflicts: usize,
}

fn new_rent(planned: &PlannedRent) -> rent::ActiveModel {
    rent::ActiveModel {
        student_id: Set(planned.student_id),
        category_id: Set(planned.category_id),
        period: Set(planned.period.label()),
        rent_amount: Set(planned.rent_amount),
        rent_paid: Set(0.0),
        advance_amount: Set(0.0),
        advance_paid: Set(0.0),
        external_amount: Set(0.0),
        external_paid: Set(0.0),
        previous_due: Set(planned.previous_due),
        previous_due_paid: Set(0.0),
        status: Set(RentStatus::Unpaid),
        paid_date: Set(None),
        paid_type: Set(None),
        version: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
}

/// Rents written by [`insert_planned_rents`].
#[derive(Debug, Clone, Default)]
pub struct InsertedRents {
    /// Rents actually inserted
    pub created: Vec<rent::Model>,
    /// Planned rents that already existed and were skipped
    pub conflicts: usize,
}

/// Inserts planned rents one by one, each in its own commit.
///
/// A rent that already exists for the same student and period (for example one
/// written by a concurrent run after planning) is skipped and counted as a conflict.
///
/// # Errors
/// Any other storage failure stops the loop. Rents inserted before it stay in place.
pub async fn insert_planned_rents<C>(db: &C, planned: &[PlannedRent]) -> Result<InsertedRents>
where
    C: ConnectionTrait,
{
    let mut inserted = InsertedRents::default();
    for planned in planned {
        match new_rent(planned).insert(db).await {
            Ok(rent) => inserted.created.push(rent),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                tracing::warn!(
                    student_id = planned.student_id,
                    period = %planned.period,
                    "Rent already created by a concurrent run, skipping"
                );
                inserted.conflicts += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(inserted)
}

/// Generates the rents for the period containing `as_of`.
///
/// With `dry_run` nothing is written and `created` stays empty.
///
/// # Errors
/// Any storage failure other than a duplicate `(student_id, period)` stops the run.
/// Rents inserted before the failure stay in place.
#[instrument(skip(db))]
pub async fn generate_monthly_rents(
    db: &DatabaseConnection,
    as_of: NaiveDate,
    dry_run: bool,
) -> Result<GenerationResult> {
    let period = Period::from_date(as_of);

    let students = Student::find()
        .filter(student::Column::Status.eq(StudentStatus::Living))
        .all(db)
        .await?;
    let categories = Category::find().all(db).await?;
    let existing_rents = Rent::find()
        .filter(rent::Column::Period.is_in([period.label(), period.previous().label()]))
        .all(db)
        .await?;

    let plan = plan_monthly_rents(&students, &categories, &existing_rents, as_of);

    let mut result = GenerationResult {
        period: plan.period,
        dry_run,
        planned: plan.rents,
        created: Vec::new(),
        already_billed: plan.already_billed,
        missing_category: plan.missing_category,
        conflicts: 0,
    };

    if dry_run {
        tracing::info!(
            period = %period,
            planned = result.planned.len(),
            "Dry run finished, nothing written"
        );
        return Ok(result);
    }

    let inserted = insert_planned_rents(db, &result.planned).await?;
    result.created = inserted.created;
    result.conflicts = inserted.conflicts;

    tracing::info!(
        period = %period,
        created = result.created.len(),
        already_billed = result.already_billed,
        missing_category = result.missing_category.len(),
        conflicts = result.conflicts,
        "Monthly rents generated"
    );

    Ok(result)
}

/// Formats a generation result for display.
pub fn format_generation_summary(result: &GenerationResult) -> Result<String> {
    use std::fmt::Write;

    let mut summary = format!(
        "{}Rent cycle - {} - {} planned, {} created\n",
        if result.dry_run { "[dry run] " } else { "" },
        result.period,
        result.planned.len(),
        result.created.len()
    );

    writeln!(
        summary,
        "  Already billed: {} | Missing category: {} | Conflicts: {}",
        result.already_billed,
        result.missing_category.len(),
        result.conflicts
    )?;

    for planned in &result.planned {
        write!(
            summary,
            "  {} - ${:.2}",
            planned.student_name, planned.rent_amount
        )?;
        if planned.previous_due > 0.0 {
            write!(summary, " + ${:.2} carried", planned.previous_due)?;
        }
        summary.push('\n');
    }

    if !result.missing_category.is_empty() {
        let ids: Vec<String> = result
            .missing_category
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(summary, "  Skipped students (no category): {}", ids.join(", "))?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        payment::{apply_full_payment, apply_payment},
        rent::{find_rent_by_student_and_period, get_rents_for_period},
        status::Buckets,
        student::mark_student_left,
    };
    use crate::test_utils::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[tokio::test]
    async fn test_generate_creates_one_rent_per_living_student() -> Result<()> {
        let (db, category, student) = setup_with_student().await?;
        let second = create_test_student(&db, "01700000002", category.id).await?;

        let result = generate_monthly_rents(&db, date(2024, 3, 5), false).await?;
        assert_eq!(result.period.label(), "2024-03");
        assert_eq!(result.created.len(), 2);
        assert_eq!(result.conflicts, 0);

        for id in [student.id, second.id] {
            let rent = find_rent_by_student_and_period(&db, id, result.period)
                .await?
                .unwrap();
            assert_eq!(rent.rent_amount, category.amount);
            assert_eq!(rent.previous_due, 0.0);
            assert_eq!(rent.advance_amount, 0.0);
            assert_eq!(rent.external_amount, 0.0);
            assert_eq!(rent.status, RentStatus::Unpaid);
            assert_eq!(rent.version, 0);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() -> Result<()> {
        let (db, _category, _student) = setup_with_student().await?;

        let first = generate_monthly_rents(&db, date(2024, 3, 1), false).await?;
        assert_eq!(first.created.len(), 1);

        let second = generate_monthly_rents(&db, date(2024, 3, 28), false).await?;
        assert!(second.created.is_empty());
        assert!(second.planned.is_empty());
        assert_eq!(second.already_billed, 1);

        let rents = get_rents_for_period(&db, Period::new(2024, 3)?).await?;
        assert_eq!(rents.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_unpaid_rent_is_carried_forward() -> Result<()> {
        let (db, category, student) = setup_with_student().await?;
        create_test_rent(&db, &student, category.id, Period::new(2024, 2)?, 1000.0).await?;

        let result = generate_monthly_rents(&db, date(2024, 3, 1), false).await?;
        assert_eq!(result.created.len(), 1);

        let march = &result.created[0];
        assert_eq!(march.previous_due, 1000.0);
        assert_eq!(march.rent_amount, category.amount);
        assert_eq!(march.status, RentStatus::Unpaid);

        Ok(())
    }

    #[tokio::test]
    async fn test_paid_rent_carries_nothing() -> Result<()> {
        let (db, category, student) = setup_with_student().await?;
        let february =
            create_test_rent(&db, &student, category.id, Period::new(2024, 2)?, 1000.0).await?;
        apply_full_payment(&db, february.id, None, None).await?;

        let result = generate_monthly_rents(&db, date(2024, 3, 1), false).await?;
        assert_eq!(result.created[0].previous_due, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_partial_payment_carries_the_remainder() -> Result<()> {
        let (db, category, student) = setup_with_student().await?;
        let february = create_custom_rent(
            &db,
            &student,
            category.id,
            Period::new(2024, 2)?,
            Buckets {
                rent: 1000.0,
                advance: 500.0,
                external: 200.0,
                previous_due: 300.0,
            },
        )
        .await?;
        apply_payment(
            &db,
            february.id,
            Buckets {
                rent: 400.0,
                previous_due: 300.0,
                ..Buckets::ZERO
            },
            None,
            None,
        )
        .await?;

        let result = generate_monthly_rents(&db, date(2024, 3, 1), false).await?;
        // 600 tariff + 200 external; the unpaid advance stays on February
        assert_eq!(result.created[0].previous_due, 800.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_carry_forward_compounds_across_months() -> Result<()> {
        let (db, category, _student) = setup_with_student().await?;

        generate_monthly_rents(&db, date(2024, 1, 1), false).await?;
        generate_monthly_rents(&db, date(2024, 2, 1), false).await?;
        let march = generate_monthly_rents(&db, date(2024, 3, 1), false).await?;

        assert_eq!(march.created[0].previous_due, category.amount * 2.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_year_boundary_uses_december() -> Result<()> {
        let (db, category, student) = setup_with_student().await?;
        create_test_rent(&db, &student, category.id, Period::new(2023, 12)?, 700.0).await?;

        let result = generate_monthly_rents(&db, date(2024, 1, 10), false).await?;
        assert_eq!(result.created[0].period, "2024-01");
        assert_eq!(result.created[0].previous_due, 700.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_category_is_skipped() -> Result<()> {
        let (db, category, _student) = setup_with_student().await?;
        create_test_student(&db, "01700000002", category.id).await?;
        let orphan = insert_orphan_student(&db, "01700000003", 999).await?;

        let result = generate_monthly_rents(&db, date(2024, 3, 1), false).await?;
        assert_eq!(result.created.len(), 2);
        assert_eq!(result.missing_category, vec![orphan.id]);

        let orphan_rent =
            find_rent_by_student_and_period(&db, orphan.id, result.period).await?;
        assert!(orphan_rent.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_students_on_leave_are_not_billed() -> Result<()> {
        let (db, category, student) = setup_with_student().await?;
        let staying = create_test_student(&db, "01700000002", category.id).await?;
        mark_student_left(&db, student.id).await?;

        let result = generate_monthly_rents(&db, date(2024, 3, 1), false).await?;
        assert_eq!(result.created.len(), 1);
        assert_eq!(result.created[0].student_id, staying.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_rent_written_after_planning_is_skipped_as_conflict() -> Result<()> {
        let (db, category, student) = setup_with_student().await?;
        let second = create_test_student(&db, "01700000002", category.id).await?;
        let as_of = date(2024, 3, 1);

        let students = Student::find().all(&db).await?;
        let categories = Category::find().all(&db).await?;
        let plan = plan_monthly_rents(&students, &categories, &[], as_of);
        assert_eq!(plan.rents.len(), 2);

        // A concurrent run bills the first student between planning and inserting
        let raced = create_test_rent(&db, &student, category.id, plan.period, 4000.0).await?;

        let inserted = insert_planned_rents(&db, &plan.rents).await?;
        assert_eq!(inserted.conflicts, 1);
        assert_eq!(inserted.created.len(), 1);
        assert_eq!(inserted.created[0].student_id, second.id);
        assert!(inserted.created.iter().all(|r| r.student_id != student.id));

        let rents = get_rents_for_period(&db, plan.period).await?;
        let for_student: Vec<_> = rents.iter().filter(|r| r.student_id == student.id).collect();
        assert_eq!(for_student.len(), 1);
        assert_eq!(for_student[0].id, raced.id);
        assert_eq!(rents.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() -> Result<()> {
        let (db, _category, _student) = setup_with_student().await?;

        let result = generate_monthly_rents(&db, date(2024, 3, 1), true).await?;
        assert!(result.dry_run);
        assert_eq!(result.planned.len(), 1);
        assert!(result.created.is_empty());

        let rents = get_rents_for_period(&db, result.period).await?;
        assert!(rents.is_empty());

        Ok(())
    }

    #[test]
    fn test_plan_counts_existing_rents() {
        let students = vec![sample_student_model(1, 10), sample_student_model(2, 10)];
        let categories = vec![sample_category_model(10, 4000.0)];
        let mut existing = sample_rent_model(4000.0, 0.0, 0.0);
        existing.student_id = 1;
        existing.period = "2024-03".to_string();

        let plan = plan_monthly_rents(&students, &categories, &[existing], date(2024, 3, 15));
        assert_eq!(plan.already_billed, 1);
        assert_eq!(plan.rents.len(), 1);
        assert_eq!(plan.rents[0].student_id, 2);
        assert_eq!(plan.rents[0].rent_amount, 4000.0);
        assert_eq!(plan.previous_period.label(), "2024-02");
    }

    #[test]
    fn test_plan_ignores_rents_from_older_periods() {
        let students = vec![sample_student_model(1, 10)];
        let categories = vec![sample_category_model(10, 4000.0)];
        let mut old = sample_rent_model(4000.0, 0.0, 0.0);
        old.student_id = 1;
        old.period = "2024-01".to_string();

        let plan = plan_monthly_rents(&students, &categories, &[old], date(2024, 3, 1));
        assert_eq!(plan.rents[0].previous_due, 0.0);
    }

    #[test]
    fn test_format_generation_summary() -> Result<()> {
        let result = GenerationResult {
            period: Period::new(2024, 3)?,
            dry_run: true,
            planned: vec![PlannedRent {
                student_id: 1,
                student_name: "Rahim".to_string(),
                category_id: 10,
                period: Period::new(2024, 3)?,
                rent_amount: 4000.0,
                previous_due: 1000.0,
            }],
            created: Vec::new(),
            already_billed: 2,
            missing_category: vec![7],
            conflicts: 0,
        };

        let summary = format_generation_summary(&result)?;
        assert!(summary.starts_with("[dry run] Rent cycle - 2024-03 - 1 planned, 0 created"));
        assert!(summary.contains("Already billed: 2"));
        assert!(summary.contains("Rahim - $4000.00 + $1000.00 carried"));
        assert!(summary.contains("Skipped students (no category): 7"));

        Ok(())
    }
}
