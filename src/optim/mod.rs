//! Portion optimisation: split a daily calorie target across meal slots and
//! scale each dish so every meal lands on its share.

pub mod nutri_eval;
pub mod portions;
pub mod weights;

pub use nutri_eval::{calorie_deviation, summarize, CalorieDeviation, DaySummary, NutritionTotals};
pub use portions::{optimize, optimize_meal, total_calories};
pub use weights::{parse_target_calories, MealWeights};

use serde::{Deserialize, Serialize};

use crate::model::{DayMenu, OptimizedDayMenu, Recipe, WeeklyMenu};
use crate::optim::portions::round2;

/// Entry point for callers: optimised day plus its calorie total.
pub fn optimize_menu(day_menu: &DayMenu, target_calories: f64, meal_weights: &MealWeights) -> (OptimizedDayMenu, f64) {
    optimize(day_menu, target_calories, meal_weights)
}

/// Like [`optimize_menu`], falling back to [`default_day_menu`] when nothing
/// has been generated yet.
pub fn optimize_menu_or_default(
    day_menu: Option<&DayMenu>,
    target_calories: f64,
    meal_weights: &MealWeights,
) -> (OptimizedDayMenu, f64) {
    match day_menu {
        Some(day) => optimize(day, target_calories, meal_weights),
        None => optimize(&default_day_menu(), target_calories, meal_weights),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedWeek {
    pub days: Vec<OptimizedDayMenu>,
    pub day_totals: Vec<f64>,
    pub total_calories: f64,
}

/// Applies the same daily target and weights to all seven days.
pub fn optimize_week(week: &WeeklyMenu, target_calories: f64, meal_weights: &MealWeights) -> OptimizedWeek {
    let (days, day_totals): (Vec<_>, Vec<_>) = week
        .days()
        .iter()
        .map(|day| optimize(day, target_calories, meal_weights))
        .unzip();
    let total_calories = round2(day_totals.iter().sum());
    OptimizedWeek {
        days,
        day_totals,
        total_calories,
    }
}

fn demo_recipe(id: &str, name: &str, calories: f64, protein: f64, fat: f64, carbs: f64) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: name.to_string(),
        calories,
        protein,
        fat,
        carbs,
        weight: None,
    }
}

/// One dish per slot, used before any menu has been generated.
pub fn default_day_menu() -> DayMenu {
    let banana = demo_recipe("default-banana", "Banana", 150.0, 10.0, 0.0, 50.0);
    DayMenu {
        breakfast: vec![demo_recipe("default-omelette", "Omelette", 250.0, 18.0, 20.0, 2.0)],
        first_snack: vec![banana.clone()],
        lunch: vec![demo_recipe("default-chicken-salad", "Chicken salad", 350.0, 30.0, 15.0, 10.0)],
        second_snack: vec![banana],
        dinner: vec![demo_recipe("default-chicken-fillet", "Fried chicken fillet", 450.0, 50.0, 10.0, 10.0)],
    }
}
