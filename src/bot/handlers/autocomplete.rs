//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are best-effort: a store error or a timeout yields an empty list
//! instead of failing the interaction.

use crate::{
    bot::BotData,
    core::{category, deadline::with_timeout, period::Period, student},
    entities::StudentStatus,
    errors::Error,
};
use chrono::Utc;

/// Discord shows at most this many choices.
const MAX_CHOICES: usize = 25;

const PAYMENT_CHANNELS: [&str; 3] = ["on hand", "online", "bank"];

/// Suggests active category titles containing `partial`.
pub async fn autocomplete_category_title(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let data = ctx.data();
    let Ok(categories) = with_timeout(
        data.billing.store_timeout(),
        category::get_active_categories(&data.database),
    )
    .await
    else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = categories
        .into_iter()
        .filter(|c| c.title.to_lowercase().contains(&partial_lower))
        .map(|c| c.title)
        .take(MAX_CHOICES)
        .collect();

    matching.sort();
    matching
}

/// Suggests phones of living students whose phone or name contains `partial`.
pub async fn autocomplete_student_phone(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let data = ctx.data();
    let Ok(students) = with_timeout(
        data.billing.store_timeout(),
        student::find_students_by_status(&data.database, StudentStatus::Living),
    )
    .await
    else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    students
        .into_iter()
        .filter(|s| s.phone.contains(partial) || s.name.to_lowercase().contains(&partial_lower))
        .map(|s| s.phone)
        .take(MAX_CHOICES)
        .collect()
}

/// Suggests phones of students on leave, for `/student_return`.
pub async fn autocomplete_departed_phone(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let data = ctx.data();
    let Ok(students) = with_timeout(
        data.billing.store_timeout(),
        student::find_students_by_status(&data.database, StudentStatus::Leave),
    )
    .await
    else {
        return Vec::new();
    };

    students
        .into_iter()
        .filter(|s| s.phone.contains(partial))
        .map(|s| s.phone)
        .take(MAX_CHOICES)
        .collect()
}

/// Suggests the current period and the eleven before it.
pub async fn autocomplete_period(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let mut period = Period::from_date(Utc::now().date_naive());
    let mut labels = Vec::with_capacity(12);
    for _ in 0..12 {
        let label = period.label();
        if label.starts_with(partial) {
            labels.push(label);
        }
        period = period.previous();
    }
    labels
}

/// Suggests known payment channels.
pub async fn autocomplete_channel(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    PAYMENT_CHANNELS
        .iter()
        .filter(|c| c.contains(&partial_lower))
        .map(|c| (*c).to_string())
        .collect()
}
