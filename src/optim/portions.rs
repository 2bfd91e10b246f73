use crate::model::{DayMenu, MealSlot, OptimizedDayMenu, OptimizedDish, Recipe};
use crate::optim::weights::{sanitize_target, MealWeights};

/// Below this a meal is treated as calorie-free and gets no scaling.
const MIN_MEAL_CALORIES: f64 = 1e-9;

/// Two decimals, exact halves to even (0.125 -> 0.12, 0.375 -> 0.38).
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Per-dish weight priors normalised to sum to 1. Falls back to equal
/// shares when any prior is non-finite or they do not sum to a positive value.
fn normalized_dish_weights(dishes: &[Recipe]) -> Vec<f64> {
    let n = dishes.len();
    let raw: Vec<f64> = dishes.iter().map(|d| d.weight.unwrap_or(1.0)).collect();
    let total: f64 = raw.iter().sum();
    if raw.iter().any(|w| !w.is_finite()) || total <= 0.0 {
        return vec![1.0 / n.max(1) as f64; n];
    }
    raw.into_iter().map(|w| w / total).collect()
}

/// Scales the dishes of one meal so their calories add up to `target_calories`.
pub fn optimize_meal(dishes: &[Recipe], target_calories: f64) -> Vec<OptimizedDish> {
    if dishes.is_empty() {
        return Vec::new();
    }

    let target = sanitize_target(target_calories);
    let weights = normalized_dish_weights(dishes);
    let meal_calories: f64 = dishes
        .iter()
        .zip(&weights)
        .map(|(dish, w)| dish.calories * w)
        .sum();
    let factor = if meal_calories > MIN_MEAL_CALORIES {
        target / meal_calories
    } else {
        0.0
    };

    dishes
        .iter()
        .zip(weights)
        .enumerate()
        .map(|(i, (dish, weight))| {
            let portion = round2(weight * factor);
            OptimizedDish {
                name: if dish.name.trim().is_empty() {
                    format!("Dish {}", i + 1)
                } else {
                    dish.name.clone()
                },
                calories: round2(dish.calories * portion),
                portion,
                protein: round2(dish.protein * portion),
                fat: round2(dish.fat * portion),
                carbs: round2(dish.carbs * portion),
            }
        })
        .collect()
}

/// Optimises every slot of a day against its share of `target_calories`.
/// Returns the optimised day and its rounded calorie total.
pub fn optimize(day: &DayMenu, target_calories: f64, weights: &MealWeights) -> (OptimizedDayMenu, f64) {
    let budgets = weights.budgets(target_calories);
    let mut optimized = OptimizedDayMenu::empty();
    for slot in MealSlot::ALL {
        *optimized.slot_mut(slot) = optimize_meal(day.slot(slot), budgets[slot.index()]);
    }
    let total = total_calories(&optimized);
    (optimized, total)
}

pub fn total_calories(day: &OptimizedDayMenu) -> f64 {
    round2(day.slots().flat_map(|(_, dishes)| dishes).map(|d| d.calories).sum())
}
