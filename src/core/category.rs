//! Category business logic - pricing tiers students are billed under.
//!
//! Provides functions for creating, retrieving and updating categories, plus seeding
//! them from config.toml on startup.

use crate::{
    config::settings::CategoryConfig,
    entities::{Category, CategoryStatus, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount {
            field: "category amount",
            amount,
        });
    }
    Ok(())
}

/// Retrieves all categories ordered alphabetically by title.
pub async fn get_all_categories<C>(db: &C) -> Result<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .order_by_asc(category::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves active categories ordered alphabetically by title.
pub async fn get_active_categories<C>(db: &C) -> Result<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::Status.eq(CategoryStatus::Active))
        .order_by_asc(category::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its unique ID.
pub async fn find_category_by_id<C>(db: &C, category_id: i64) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its title.
pub async fn get_category_by_title<C>(db: &C, title: &str) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::Title.eq(title.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new active category.
///
/// The title is trimmed and must be non-empty and unused; the amount must be a
/// non-negative number.
pub async fn create_category<C>(
    db: &C,
    title: &str,
    amount: f64,
    description: Option<String>,
) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument {
            message: "Category title cannot be empty".to_string(),
        });
    }
    validate_amount(amount)?;

    if get_category_by_title(db, title).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("Category '{title}' already exists"),
        });
    }

    let category = category::ActiveModel {
        title: Set(title.to_string()),
        amount: Set(amount),
        status: Set(CategoryStatus::Active),
        description: Set(description),
        ..Default::default()
    };

    category.insert(db).await.map_err(Into::into)
}

/// Changes the monthly tariff of a category.
///
/// Already generated rents keep the amount they were created with.
pub async fn update_category_amount<C>(
    db: &C,
    category_id: i64,
    amount: f64,
) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    validate_amount(amount)?;

    let category = find_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found("Category", category_id))?;

    let mut active_model: category::ActiveModel = category.into();
    active_model.amount = Set(amount);
    active_model.update(db).await.map_err(Into::into)
}

/// Activates or retires a category.
pub async fn set_category_status<C>(
    db: &C,
    category_id: i64,
    status: CategoryStatus,
) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    let category = find_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found("Category", category_id))?;

    let mut active_model: category::ActiveModel = category.into();
    active_model.status = Set(status);
    active_model.update(db).await.map_err(Into::into)
}

/// Inserts every configured category whose title does not exist yet.
///
/// Returns how many categories were created.
pub async fn seed_categories<C>(db: &C, seeds: &[CategoryConfig]) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut created = 0;
    for seed in seeds {
        if get_category_by_title(db, &seed.title).await?.is_some() {
            tracing::debug!("Category '{}' already present, skipping seed", seed.title);
            continue;
        }
        create_category(db, &seed.title, seed.amount, seed.description.clone()).await?;
        created += 1;
    }
    Ok(created)
}
