//! Period billing reports.
//!
//! Builds a per-period view of every rent with its student and outstanding balance,
//! plus the text formatting the bot layer shows. Everything here is read-only.

use crate::{
    core::{period::Period, status::Buckets},
    entities::{Rent, RentStatus, Student, rent, rent_history},
    errors::Result,
};
use sea_orm::{QueryOrder, prelude::*};

/// One rent in a period report.
#[derive(Debug, Clone)]
pub struct RentLine {
    /// The rent
    pub rent: rent::Model,
    /// Name of the billed student, if the student still exists
    pub student_name: Option<String>,
    /// Still owed across all buckets
    pub outstanding: f64,
}

/// Billing summary for one period.
#[derive(Debug, Clone)]
pub struct PeriodReport {
    /// Period reported on
    pub period: Period,
    /// One line per rent, ordered by student
    pub lines: Vec<RentLine>,
    /// Sum of all due amounts
    pub total_due: f64,
    /// Sum of all paid amounts
    pub total_paid: f64,
    /// Sum of all outstanding amounts
    pub total_outstanding: f64,
    /// Rents with nothing paid
    pub unpaid_count: usize,
    /// Rents partly paid
    pub partial_count: usize,
    /// Rents fully settled
    pub paid_count: usize,
}

/// Builds the report for `period`.
pub async fn generate_period_report<C>(db: &C, period: Period) -> Result<PeriodReport>
where
    C: ConnectionTrait,
{
    let rows = Rent::find()
        .filter(rent::Column::Period.eq(period.label()))
        .find_also_related(Student)
        .order_by_asc(rent::Column::StudentId)
        .all(db)
        .await?;

    let mut report = PeriodReport {
        period,
        lines: Vec::with_capacity(rows.len()),
        total_due: 0.0,
        total_paid: 0.0,
        total_outstanding: 0.0,
        unpaid_count: 0,
        partial_count: 0,
        paid_count: 0,
    };

    for (rent, student) in rows {
        let outstanding = Buckets::outstanding_of(&rent).total();
        report.total_due += Buckets::due_of(&rent).total();
        report.total_paid += Buckets::paid_of(&rent).total();
        report.total_outstanding += outstanding;
        match rent.status {
            RentStatus::Unpaid => report.unpaid_count += 1,
            RentStatus::Partial => report.partial_count += 1,
            RentStatus::Paid => report.paid_count += 1,
        }
        report.lines.push(RentLine {
            rent,
            student_name: student.map(|s| s.name),
            outstanding,
        });
    }

    Ok(report)
}

/// Share of the due total that has been collected, as a percentage.
///
/// A period with nothing due counts as fully collected.
#[must_use]
pub fn calculate_collection_rate(total_paid: f64, total_due: f64) -> f64 {
    if total_due <= 0.0 {
        return 100.0;
    }

    (total_paid / total_due) * 100.0
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80%`
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // clamped_progress is in [0, 100] and length is small, so the result fits in usize
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent:.1}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

const fn status_icon(status: RentStatus) -> &'static str {
    match status {
        RentStatus::Unpaid => "🔴",
        RentStatus::Partial => "🟡",
        RentStatus::Paid => "🟢",
    }
}

/// Formats a period report for display.
pub fn format_period_report(report: &PeriodReport) -> Result<String> {
    use std::fmt::Write;

    let rate = calculate_collection_rate(report.total_paid, report.total_due);
    let mut out = format!("**Rents for {}**\n", report.period);

    writeln!(
        out,
        "Collected ${:.2} of ${:.2} {}",
        report.total_paid,
        report.total_due,
        format_progress_bar(rate, None)
    )?;
    writeln!(
        out,
        "Paid: {} | Partial: {} | Unpaid: {} | Outstanding: ${:.2}\n",
        report.paid_count, report.partial_count, report.unpaid_count, report.total_outstanding
    )?;

    if report.lines.is_empty() {
        out.push_str("No rents billed for this period.\n");
        return Ok(out);
    }

    for line in &report.lines {
        let name = line.student_name.as_deref().unwrap_or("(unknown student)");
        writeln!(
            out,
            "{} #{} {} - {} | owes ${:.2}",
            status_icon(line.rent.status),
            line.rent.id,
            name,
            line.rent.status,
            line.outstanding
        )?;
    }

    Ok(out)
}

/// One-line summary of a ledger entry.
#[must_use]
pub fn format_history_entry(entry: &rent_history::Model) -> String {
    let paid =
        entry.paid_rent + entry.paid_advance + entry.paid_external + entry.paid_previous;
    let mut parts = Vec::new();
    for (label, amount) in [
        ("rent", entry.paid_rent),
        ("advance", entry.paid_advance),
        ("external", entry.paid_external),
        ("previous", entry.paid_previous),
    ] {
        if amount > 0.0 {
            parts.push(format!("{label} ${amount:.2}"));
        }
    }
    let breakdown = if parts.is_empty() {
        "nothing".to_string()
    } else {
        parts.join(", ")
    };

    format!(
        "{} | {} | ${paid:.2} ({breakdown}) via {}",
        entry.paid_at.format("%Y-%m-%d %H:%M"),
        entry.period,
        entry.paid_type
    )
}
