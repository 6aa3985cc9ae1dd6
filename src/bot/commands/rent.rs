//! Rent Discord commands - billing runs, payments, period reports and the ledger.
//!
//! Every command runs its store work under the configured timeout; a timed-out
//! operation is dropped and nothing half-finished is committed.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, fit_message, handlers::autocomplete, report_failure},
        core::{
            deadline::with_timeout,
            history::{self, HistoryFilter, Pagination},
            monthly, payment,
            period::Period,
            rent, report,
            status::Buckets,
            student,
        },
        entities::{rent as rent_entity, student as student_entity},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use sea_orm::DatabaseConnection;
    use std::fmt::Write;

    /// `None` means the current month.
    fn parse_period(period: Option<&str>) -> Result<Period> {
        period.map_or_else(
            || Ok(Period::from_date(Utc::now().date_naive())),
            str::parse::<Period>,
        )
    }

    async fn student_by_phone(
        db: &DatabaseConnection,
        phone: &str,
    ) -> Result<student_entity::Model> {
        student::get_student_by_phone(db, phone)
            .await?
            .ok_or_else(|| Error::not_found("Student", phone))
    }

    async fn rent_for(
        db: &DatabaseConnection,
        phone: &str,
        period: Period,
    ) -> Result<rent_entity::Model> {
        let student = student_by_phone(db, phone).await?;
        rent::find_rent_by_student_and_period(db, student.id, period)
            .await?
            .ok_or_else(|| Error::not_found("Rent", format!("{phone} for {period}")))
    }

    fn format_payment(outcome: &payment::PaymentOutcome) -> String {
        let rent = &outcome.rent;
        let paid = history::sum_paid(std::slice::from_ref(&outcome.history));
        format!(
            "✅ Recorded ${:.2} on rent #{} ({}) via {} - status **{}**, still owed ${:.2}",
            paid.total(),
            rent.id,
            rent.period,
            outcome.history.paid_type,
            rent.status,
            rent::outstanding_balance(rent)
        )
    }

    /// Generates this month's rents for every living student.
    ///
    /// Students already billed this month are skipped, so the command can be run again
    /// safely. With `dry_run` the plan is shown and nothing is written.
    #[poise::command(slash_command, prefix_command)]
    pub async fn generate_rents(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show what would be created"] dry_run: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let dry_run = dry_run.unwrap_or(false);
        let as_of = Utc::now().date_naive();

        let result = with_timeout(
            data.billing.store_timeout(),
            monthly::generate_monthly_rents(&data.database, as_of, dry_run),
        )
        .await;

        match result {
            Ok(result) => {
                let summary = monthly::format_generation_summary(&result)?;
                ctx.say(fit_message(summary)).await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Records a payment split across the rent buckets.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, prefix_command)]
    pub async fn pay_rent(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student phone number"]
        #[autocomplete = "autocomplete::autocomplete_student_phone"]
        phone: String,
        #[description = "Amount towards the monthly rent"] rent: Option<f64>,
        #[description = "Amount towards the advance"] advance: Option<f64>,
        #[description = "Amount towards external charges"] external: Option<f64>,
        #[description = "Amount towards the carried balance"] previous_due: Option<f64>,
        #[description = "Billing period, YYYY-MM (defaults to this month)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: Option<String>,
        #[description = "Payment channel (defaults to the configured one)"]
        #[autocomplete = "autocomplete::autocomplete_channel"]
        channel: Option<String>,
        #[description = "Notes, e.g. a transaction reference"] details: Option<String>,
    ) -> Result<()> {
        let allocation = Buckets {
            rent: rent.unwrap_or(0.0),
            advance: advance.unwrap_or(0.0),
            external: external.unwrap_or(0.0),
            previous_due: previous_due.unwrap_or(0.0),
        };
        if allocation.is_zero() {
            ctx.say("❌ Enter at least one amount to pay").await?;
            return Ok(());
        }

        let data = ctx.data();
        let db = &data.database;
        let channel = channel.unwrap_or_else(|| data.billing.default_channel.clone());

        let result = with_timeout(data.billing.store_timeout(), async {
            let period = parse_period(period.as_deref())?;
            let target = rent_for(db, &phone, period).await?;
            payment::apply_payment(db, target.id, allocation, Some(&channel), details).await
        })
        .await;

        match result {
            Ok(outcome) => {
                ctx.say(format_payment(&outcome)).await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Pays off everything still owed on a student's rent.
    #[poise::command(slash_command, prefix_command)]
    pub async fn full_pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student phone number"]
        #[autocomplete = "autocomplete::autocomplete_student_phone"]
        phone: String,
        #[description = "Billing period, YYYY-MM (defaults to this month)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: Option<String>,
        #[description = "Payment channel (defaults to the configured one)"]
        #[autocomplete = "autocomplete::autocomplete_channel"]
        channel: Option<String>,
        #[description = "Notes, e.g. a transaction reference"] details: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let channel = channel.unwrap_or_else(|| data.billing.default_channel.clone());

        let result = with_timeout(data.billing.store_timeout(), async {
            let period = parse_period(period.as_deref())?;
            let target = rent_for(db, &phone, period).await?;
            payment::apply_full_payment(db, target.id, Some(&channel), details).await
        })
        .await;

        match result {
            Ok(outcome) => {
                ctx.say(format_payment(&outcome)).await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Shows every rent of a period with collection progress.
    #[poise::command(slash_command, prefix_command)]
    pub async fn rents(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Billing period, YYYY-MM (defaults to this month)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();

        let result = with_timeout(data.billing.store_timeout(), async {
            let period = parse_period(period.as_deref())?;
            report::generate_period_report(&data.database, period).await
        })
        .await;

        match result {
            Ok(report) => {
                let text = report::format_period_report(&report)?;
                ctx.say(fit_message(text)).await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Shows the payment ledger, newest first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn rent_history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only this student's payments"]
        #[autocomplete = "autocomplete::autocomplete_student_phone"]
        phone: Option<String>,
        #[description = "Only payments for this period, YYYY-MM"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: Option<String>,
        #[description = "Page number (starts at 1)"] page: Option<u64>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = with_timeout(data.billing.store_timeout(), async {
            let mut filter = HistoryFilter::default();
            if let Some(phone) = phone.as_deref() {
                filter.student_id = Some(student_by_phone(db, phone).await?.id);
            }
            if let Some(period) = period.as_deref() {
                filter.period = Some(period.parse()?);
            }
            let pagination = Pagination {
                page: page.unwrap_or(1),
                ..Pagination::default()
            };
            history::find_rent_history(db, &filter, pagination).await
        })
        .await;

        let page = match result {
            Ok(page) => page,
            Err(e) => return report_failure(ctx, e).await,
        };

        if page.entries.is_empty() {
            ctx.say("📒 No payments recorded yet.").await?;
            return Ok(());
        }

        let mut text = format!(
            "**Payment history** (page {} of {}, {} payments)\n",
            page.page, page.total_pages, page.total_items
        );
        for entry in &page.entries {
            writeln!(text, "• {}", report::format_history_entry(entry))?;
        }
        ctx.say(fit_message(text)).await?;

        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
