use serde::{Deserialize, Serialize};

use crate::model::{MealSlot, OptimizedDayMenu, OptimizedDish};
use crate::optim::portions::round2;

/// Absolute calories and macros, summed over some set of dishes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl NutritionTotals {
    fn add(&mut self, dish: &OptimizedDish) {
        self.calories += dish.calories;
        self.protein += dish.protein;
        self.fat += dish.fat;
        self.carbs += dish.carbs;
    }

    fn rounded(self) -> Self {
        Self {
            calories: round2(self.calories),
            protein: round2(self.protein),
            fat: round2(self.fat),
            carbs: round2(self.carbs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// In slot order.
    pub per_slot: Vec<(MealSlot, NutritionTotals)>,
    pub day: NutritionTotals,
}

pub fn summarize(day: &OptimizedDayMenu) -> DaySummary {
    let mut total = NutritionTotals::default();
    let per_slot = day
        .slots()
        .map(|(slot, dishes)| {
            let mut slot_totals = NutritionTotals::default();
            for dish in dishes {
                slot_totals.add(dish);
                total.add(dish);
            }
            (slot, slot_totals.rounded())
        })
        .collect();

    DaySummary {
        per_slot,
        day: total.rounded(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieDeviation {
    /// `total - target`, rounded to 2 decimals.
    pub absolute: f64,
    /// `absolute / target`, or 0 when the target is not positive.
    pub relative: f64,
}

/// How far an optimised total landed from its target. Rounding each
/// portion to 2 decimals makes small non-zero gaps normal.
pub fn calorie_deviation(total_calories: f64, target_calories: f64) -> CalorieDeviation {
    let absolute = round2(total_calories - target_calories);
    let relative = if target_calories > 0.0 {
        absolute / target_calories
    } else {
        0.0
    };
    CalorieDeviation { absolute, relative }
}
