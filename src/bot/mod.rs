//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord admin interface for the `RentBuddy` application,
//! including all slash commands, autocomplete handlers, and bot context management.
//! Commands only parse input, call into [`crate::core`] under the configured store
//! timeout, and format the result.

/// Discord command implementations (rent, student, category, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::BillingConfig,
    errors::{Error, ErrorKind, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Default payment channel and store timeout
    pub billing: BillingConfig,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection and
    /// billing settings.
    #[must_use]
    pub const fn new(database: DatabaseConnection, billing: BillingConfig) -> Self {
        Self { database, billing }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Discord rejects messages longer than 2000 characters.
const MAX_MESSAGE_LEN: usize = 2000;

/// Cuts `text` at a line boundary so it fits in one Discord message.
#[must_use]
pub fn fit_message(text: String) -> String {
    const MORE: char = '…';
    if text.chars().count() <= MAX_MESSAGE_LEN {
        return text;
    }

    let mut out = String::new();
    for line in text.lines() {
        // +2 for this line's newline and the trailing marker
        if out.chars().count() + line.chars().count() + 2 > MAX_MESSAGE_LEN {
            if out.is_empty() {
                // A single oversized line is cut inside the line
                out.extend(line.chars().take(MAX_MESSAGE_LEN - 1));
            }
            break;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.push(MORE);
    out
}

/// Tells the operator why a core operation failed.
///
/// Rejected input, missing records and lost races are expected outcomes and are
/// answered in the channel. Storage failures are logged as well.
pub async fn report_failure(ctx: Context<'_>, error: Error) -> Result<()> {
    let message = match error.kind() {
        ErrorKind::NotFound | ErrorKind::InvalidArgument => format!("❌ {error}"),
        ErrorKind::Conflict => format!("⚠️ {error}"),
        ErrorKind::Unavailable => {
            tracing::error!(command = %ctx.command().name, "Store failure: {error}");
            format!("⚠️ The database is unavailable right now ({error}). Try again shortly.")
        }
    };
    ctx.say(message).await?;
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                tracing::error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {e}");
            }
        }
    }
}

/// Starts the Discord client and blocks until it stops.
#[instrument(skip_all)]
pub async fn run_bot(
    token: String,
    database: DatabaseConnection,
    billing: BillingConfig,
) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::generate_rents(),
                commands::pay_rent(),
                commands::full_pay(),
                commands::rents(),
                commands::rent_history(),
                commands::add_student(),
                commands::student_leave(),
                commands::student_return(),
                commands::move_student(),
                commands::students(),
                commands::add_category(),
                commands::set_category_amount(),
                commands::set_category_active(),
                commands::categories(),
                commands::ping(),
                commands::help(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, billing))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| tracing::error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| tracing::error!("Client error: {e:?}"))?;

    Ok(())
}

pub use commands::*;
pub use handlers::*;
