//! Meal data access - Reads and writes for the meal log.
//!
//! Same shape as the workout log: newest-first reads, full-field deletes.

use crate::{
    entities::{Meal, meal},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// Fields of a meal that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMeal {
    /// Meal type (e.g., "Breakfast")
    pub meal_type: String,
    /// What was eaten
    pub description: String,
    /// Calories as entered
    pub calories: String,
}

impl NewMeal {
    /// Bundles the three text fields of a meal.
    pub fn new(
        meal_type: impl Into<String>,
        description: impl Into<String>,
        calories: impl Into<String>,
    ) -> Self {
        Self {
            meal_type: meal_type.into(),
            description: description.into(),
            calories: calories.into(),
        }
    }
}

/// Retrieves every meal, most recently inserted first.
pub async fn get_all_meals(db: &DatabaseConnection) -> Result<Vec<meal::Model>> {
    Meal::find()
        .order_by_desc(meal::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a meal and returns it with its store-assigned id.
#[instrument(skip(db))]
pub async fn create_meal(db: &DatabaseConnection, new_meal: NewMeal) -> Result<meal::Model> {
    let meal = meal::ActiveModel {
        meal_type: Set(new_meal.meal_type),
        description: Set(new_meal.description),
        calories: Set(new_meal.calories),
        ..Default::default()
    };

    let model = meal.insert(db).await?;
    info!("Logged {} meal (ID: {})", model.meal_type, model.id);
    Ok(model)
}

/// Deletes the row matching every field of `record`; returns rows removed (0 or 1).
#[instrument(skip(db))]
pub async fn delete_meal(db: &DatabaseConnection, record: &meal::Model) -> Result<u64> {
    let result = Meal::delete_many()
        .filter(meal::Column::Id.eq(record.id))
        .filter(meal::Column::MealType.eq(record.meal_type.as_str()))
        .filter(meal::Column::Description.eq(record.description.as_str()))
        .filter(meal::Column::Calories.eq(record.calories.as_str()))
        .exec(db)
        .await?;

    debug!("Deleted {} meal row(s) for ID {}", result.rows_affected, record.id);
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_meal_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let meal = create_meal(&db, NewMeal::new("Lunch", "Salad", "350")).await?;

        assert_eq!(meal.meal_type, "Lunch");
        assert_eq!(meal.description, "Salad");
        assert_eq!(meal.calories, "350");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_meals_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_meal(&db, "Breakfast").await?;
        create_test_meal(&db, "Dinner").await?;

        let meals = get_all_meals(&db).await?;
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].meal_type, "Dinner");
        assert_eq!(meals[1].meal_type, "Breakfast");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_meal_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let keep = create_test_meal(&db, "Breakfast").await?;
        let target = create_test_meal(&db, "Snack").await?;

        assert_eq!(delete_meal(&db, &target).await?, 1);

        let meals = get_all_meals(&db).await?;
        assert_eq!(meals, vec![keep]);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_meal_with_changed_calories_is_noop() -> Result<()> {
        let db = setup_test_db().await?;
        let mut stale = create_test_meal(&db, "Dinner").await?;
        stale.calories = "9999".to_string();

        assert_eq!(delete_meal(&db, &stale).await?, 0);
        assert_eq!(get_all_meals(&db).await?.len(), 1);
        Ok(())
    }
}
