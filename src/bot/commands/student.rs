//! Student Discord commands - admissions, departures, returns and listings.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, fit_message, handlers::autocomplete, report_failure},
        core::{
            category,
            deadline::with_timeout,
            student::{self, NewStudent},
        },
        entities::{StudentStatus, student as student_entity},
        errors::{Error, Result},
    };
    use chrono::{NaiveDate, Utc};
    use sea_orm::DatabaseConnection;
    use std::fmt::Write;

    /// `None` means today.
    fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
        let Some(date) = date else {
            return Ok(Utc::now().date_naive());
        };
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidArgument {
            message: format!("date must look like YYYY-MM-DD, got '{date}'"),
        })
    }

    async fn student_by_phone(
        db: &DatabaseConnection,
        phone: &str,
    ) -> Result<student_entity::Model> {
        student::get_student_by_phone(db, phone)
            .await?
            .ok_or_else(|| Error::not_found("Student", phone))
    }

    async fn category_id_by_title(db: &DatabaseConnection, title: &str) -> Result<i64> {
        category::get_category_by_title(db, title)
            .await?
            .map(|c| c.id)
            .ok_or_else(|| Error::not_found("Category", title))
    }

    /// Admits a new student. They are billed from the next rent run.
    #[poise::command(slash_command, prefix_command)]
    pub async fn add_student(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Phone number (login identifier)"] phone: String,
        #[description = "Full name"] name: String,
        #[description = "Room category"]
        #[autocomplete = "autocomplete::autocomplete_category_title"]
        category: String,
        #[description = "Phone for SMS notices, if different"] sms_phone: Option<String>,
        #[description = "Joining date, YYYY-MM-DD (defaults to today)"]
        joining_date: Option<String>,
        #[description = "Phone of the student who referred them"]
        #[autocomplete = "autocomplete::autocomplete_student_phone"]
        referred_by: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = with_timeout(data.billing.store_timeout(), async {
            let joining_date = parse_date(joining_date.as_deref())?;
            let category_id = category_id_by_title(db, &category).await?;
            let reference_id = match referred_by.as_deref() {
                Some(phone) => Some(student_by_phone(db, phone).await?.id),
                None => None,
            };
            student::create_student(
                db,
                NewStudent {
                    phone,
                    name,
                    sms_phone,
                    password_hash: None,
                    category_id,
                    joining_date,
                    reference_id,
                    discount_id: None,
                },
            )
            .await
        })
        .await;

        match result {
            Ok(student) => {
                ctx.say(format!(
                    "✅ Admitted {} ({}) under '{category}' from {}",
                    student.name, student.phone, student.joining_date
                ))
                .await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Marks a student as having left. They are no longer billed.
    #[poise::command(slash_command, prefix_command)]
    pub async fn student_leave(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student phone number"]
        #[autocomplete = "autocomplete::autocomplete_student_phone"]
        phone: String,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = with_timeout(data.billing.store_timeout(), async {
            let student = student_by_phone(db, &phone).await?;
            student::mark_student_left(db, student.id).await
        })
        .await;

        match result {
            Ok(student) => {
                ctx.say(format!("👋 {} has left; rent history is kept", student.name))
                    .await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Re-admits a student who left.
    #[poise::command(slash_command, prefix_command)]
    pub async fn student_return(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student phone number"]
        #[autocomplete = "autocomplete::autocomplete_departed_phone"]
        phone: String,
        #[description = "New joining date, YYYY-MM-DD (defaults to today)"]
        joining_date: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = with_timeout(data.billing.store_timeout(), async {
            let joining_date = parse_date(joining_date.as_deref())?;
            let student = student_by_phone(db, &phone).await?;
            student::mark_student_returned(db, student.id, joining_date).await
        })
        .await;

        match result {
            Ok(student) => {
                ctx.say(format!(
                    "✅ {} is living here again from {}",
                    student.name, student.joining_date
                ))
                .await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Moves a student to another room category from the next rent run.
    #[poise::command(slash_command, prefix_command)]
    pub async fn move_student(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student phone number"]
        #[autocomplete = "autocomplete::autocomplete_student_phone"]
        phone: String,
        #[description = "New room category"]
        #[autocomplete = "autocomplete::autocomplete_category_title"]
        category: String,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = with_timeout(data.billing.store_timeout(), async {
            let student = student_by_phone(db, &phone).await?;
            let category_id = category_id_by_title(db, &category).await?;
            student::change_student_category(db, student.id, category_id).await
        })
        .await;

        match result {
            Ok(student) => {
                ctx.say(format!("✅ {} moved to '{category}'", student.name))
                    .await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Lists students by residency status.
    #[poise::command(slash_command, prefix_command)]
    pub async fn students(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Show students who have left instead"] departed: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let status = if departed.unwrap_or(false) {
            StudentStatus::Leave
        } else {
            StudentStatus::Living
        };

        let result = with_timeout(
            data.billing.store_timeout(),
            student::find_students_by_status(&data.database, status),
        )
        .await;

        let students = match result {
            Ok(students) => students,
            Err(e) => return report_failure(ctx, e).await,
        };

        if students.is_empty() {
            ctx.say("🏠 No students found.").await?;
            return Ok(());
        }

        let heading = match status {
            StudentStatus::Living => "Living",
            StudentStatus::Leave => "Departed",
        };
        let mut text = format!("**{heading} students ({})**\n", students.len());
        for student in &students {
            writeln!(
                text,
                "• {} - {} (joined {})",
                student.name, student.phone, student.joining_date
            )?;
        }
        ctx.say(fit_message(text)).await?;

        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
