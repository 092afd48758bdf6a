use serde::Serialize;
use tracing::info;

use super::repo_types::{DailyLog, MealSnapshot};
use super::store::LogStore;
use crate::dishes::DishIndex;
use crate::nutrients::{Nutrient, Totals};

/// A logged meal normalized for display: name plus every nutrient, missing
/// values read as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealRow {
    #[serde(rename = "Dish_Name")]
    pub dish_name: String,
    #[serde(flatten)]
    pub nutrients: Totals,
}

impl MealRow {
    pub fn nutrient(&self, n: Nutrient) -> f64 {
        self.nutrients.get(&n).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayReport {
    pub meals: Vec<MealRow>,
    pub totals: Totals,
}

pub enum LogOutcome {
    Logged,
    NotFound,
}

/// Sums each of `fields` over `meals`. Absent or non-numeric values add 0,
/// so this never fails.
pub fn aggregate(meals: &[MealSnapshot], fields: &[Nutrient]) -> Totals {
    fields
        .iter()
        .map(|n| (*n, meals.iter().map(|m| m.nutrient(*n)).sum::<f64>()))
        .collect()
}

pub fn meal_rows(meals: &[MealSnapshot]) -> Vec<MealRow> {
    meals
        .iter()
        .map(|m| MealRow {
            dish_name: m.dish_name(),
            nutrients: Nutrient::ALL.iter().map(|n| (*n, m.nutrient(*n))).collect(),
        })
        .collect()
}

/// Meals and totals for one day, `None` when nothing was logged.
pub fn day_report(log: &DailyLog, day: &str) -> Option<DayReport> {
    let meals = log.day(day);
    if meals.is_empty() {
        return None;
    }
    Some(DayReport {
        meals: meal_rows(meals),
        totals: aggregate(meals, &Nutrient::ALL),
    })
}

/// Looks `dish_name` up in the catalog and appends a snapshot to `day`.
pub async fn log_dish(
    store: &dyn LogStore,
    dishes: &DishIndex,
    dish_name: &str,
    day: &str,
) -> anyhow::Result<LogOutcome> {
    let Some(dish) = dishes.lookup(dish_name) else {
        return Ok(LogOutcome::NotFound);
    };
    store.append(day, MealSnapshot::from(dish)).await?;
    info!(dish = %dish.name, %day, "meal logged");
    Ok(LogOutcome::Logged)
}
