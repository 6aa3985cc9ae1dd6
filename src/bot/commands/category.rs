//! Category Discord commands - room tariffs.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, fit_message, handlers::autocomplete, report_failure},
        core::{category, deadline::with_timeout},
        entities::CategoryStatus,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Adds a room category with its monthly tariff.
    #[poise::command(slash_command, prefix_command)]
    pub async fn add_category(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category title, e.g. Single Room"] title: String,
        #[description = "Monthly rent"] amount: f64,
        #[description = "Optional description"] description: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();

        let result = with_timeout(
            data.billing.store_timeout(),
            category::create_category(&data.database, &title, amount, description),
        )
        .await;

        match result {
            Ok(category) => {
                ctx.say(format!(
                    "✅ Created category '{}' at ${:.2}/month",
                    category.title, category.amount
                ))
                .await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Changes a category's monthly tariff. Rents already generated keep their amount.
    #[poise::command(slash_command, prefix_command)]
    pub async fn set_category_amount(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category title"]
        #[autocomplete = "autocomplete::autocomplete_category_title"]
        title: String,
        #[description = "New monthly rent"] amount: f64,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let result = with_timeout(data.billing.store_timeout(), async {
            let category = category::get_category_by_title(db, &title)
                .await?
                .ok_or_else(|| Error::not_found("Category", &title))?;
            category::update_category_amount(db, category.id, amount).await
        })
        .await;

        match result {
            Ok(category) => {
                ctx.say(format!(
                    "✅ '{}' now costs ${:.2}/month from the next rent run",
                    category.title, category.amount
                ))
                .await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Activates or retires a category.
    #[poise::command(slash_command, prefix_command)]
    pub async fn set_category_active(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category title"] title: String,
        #[description = "Whether new students can be placed in it"] active: bool,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let status = if active {
            CategoryStatus::Active
        } else {
            CategoryStatus::Inactive
        };

        let result = with_timeout(data.billing.store_timeout(), async {
            let category = category::get_category_by_title(db, &title)
                .await?
                .ok_or_else(|| Error::not_found("Category", &title))?;
            category::set_category_status(db, category.id, status).await
        })
        .await;

        match result {
            Ok(category) => {
                let state = if active { "active" } else { "retired" };
                ctx.say(format!("✅ '{}' is now {state}", category.title))
                    .await?;
                Ok(())
            }
            Err(e) => report_failure(ctx, e).await,
        }
    }

    /// Lists all categories with their tariffs.
    #[poise::command(slash_command, prefix_command)]
    pub async fn categories(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();

        let result = with_timeout(
            data.billing.store_timeout(),
            category::get_all_categories(&data.database),
        )
        .await;

        let categories = match result {
            Ok(categories) => categories,
            Err(e) => return report_failure(ctx, e).await,
        };

        if categories.is_empty() {
            ctx.say("🏷️ No categories yet. Add one with `/add_category`.")
                .await?;
            return Ok(());
        }

        let mut text = String::from("**Categories**\n");
        for category in &categories {
            let marker = match category.status {
                CategoryStatus::Active => "",
                CategoryStatus::Inactive => " (retired)",
            };
            write!(text, "• {} - ${:.2}/month{marker}", category.title, category.amount)?;
            if let Some(description) = &category.description {
                write!(text, " - {description}")?;
            }
            text.push('\n');
        }
        ctx.say(fit_message(text)).await?;

        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
