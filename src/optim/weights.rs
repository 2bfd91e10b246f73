use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::MealSlot;

/// Share of the daily calorie budget per meal slot.
///
/// Missing, non-finite and negative entries count as 0. Positive entries are
/// re-normalized to sum to 1; if none is positive every slot gets an equal share.
/// Serialised as a slot-keyed map; deserialising goes through [`MealWeights::from_map`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "HashMap<MealSlot, f64>", into = "HashMap<MealSlot, f64>")]
pub struct MealWeights {
    raw: [f64; 5],
}

fn sanitize_weight(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Reads a user-typed number. Blank or unparsable text is `None`.
fn parse_input(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse::<f64>().ok()
}

impl MealWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: MealSlot, weight: f64) -> Self {
        self.set(slot, weight);
        self
    }

    pub fn set(&mut self, slot: MealSlot, weight: f64) {
        self.raw[slot.index()] = sanitize_weight(weight);
    }

    /// The value as given, after invalid entries were zeroed.
    pub fn raw(&self, slot: MealSlot) -> f64 {
        self.raw[slot.index()]
    }

    pub fn from_map(weights: &HashMap<MealSlot, f64>) -> Self {
        weights
            .iter()
            .fold(Self::new(), |acc, (&slot, &weight)| acc.with(slot, weight))
    }

    /// Form-style inputs keyed by slot name. Unknown keys are ignored.
    pub fn from_inputs<'a, I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        inputs
            .into_iter()
            .filter_map(|(key, value)| Some((MealSlot::from_key(key)?, parse_input(value).unwrap_or(0.0))))
            .fold(Self::new(), |acc, (slot, weight)| acc.with(slot, weight))
    }

    /// Per-slot fractions in slot order, summing to 1.
    pub fn normalized(&self) -> [f64; 5] {
        let total: f64 = self.raw.iter().sum();
        if total <= 0.0 {
            return [1.0 / MealSlot::ALL.len() as f64; 5];
        }
        self.raw.map(|w| w / total)
    }

    pub fn normalized_for(&self, slot: MealSlot) -> f64 {
        self.normalized()[slot.index()]
    }

    /// Calorie budget of each slot for a daily target.
    pub fn budgets(&self, target_calories: f64) -> [f64; 5] {
        let target = sanitize_target(target_calories);
        self.normalized().map(|w| target * w)
    }
}

impl From<HashMap<MealSlot, f64>> for MealWeights {
    fn from(weights: HashMap<MealSlot, f64>) -> Self {
        Self::from_map(&weights)
    }
}

impl From<MealWeights> for HashMap<MealSlot, f64> {
    fn from(weights: MealWeights) -> Self {
        MealSlot::ALL.into_iter().map(|slot| (slot, weights.raw(slot))).collect()
    }
}

/// Non-finite or negative targets become 0.
pub fn sanitize_target(target_calories: f64) -> f64 {
    if target_calories.is_finite() && target_calories > 0.0 {
        target_calories
    } else {
        0.0
    }
}

/// Calorie target from free text; anything unusable is 0.
pub fn parse_target_calories(text: &str) -> f64 {
    parse_input(text).map(sanitize_target).unwrap_or(0.0)
}
