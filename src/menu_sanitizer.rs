use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::model::{id_from_json, DayMenu, MealSlot, Recipe, WeeklyMenu, DAYS_PER_WEEK};

/// Sanitized output mirrors the parsed shape: an object is one day, an array
/// is a week.
#[derive(Debug, Clone, PartialEq)]
pub enum SanitizedMenu {
    Day(DayMenu),
    Week(WeeklyMenu),
}

impl SanitizedMenu {
    /// A single day is served all week; a week is already seven days.
    pub fn into_weekly(self) -> WeeklyMenu {
        match self {
            SanitizedMenu::Day(day) => WeeklyMenu::repeat_day(day),
            SanitizedMenu::Week(week) => week,
        }
    }
}

/// Validates generator output against the catalog. Never fails: unknown or
/// malformed entries are dropped, unexpected slots are ignored.
pub struct MenuSanitizer<'a> {
    by_id: HashMap<&'a str, &'a Recipe>,
}

impl<'a> MenuSanitizer<'a> {
    pub fn new(valid_recipes: &'a [Recipe]) -> Self {
        Self {
            by_id: valid_recipes.iter().map(|r| (r.id.as_str(), r)).collect(),
        }
    }

    pub fn sanitize(&self, parsed: &Value) -> SanitizedMenu {
        match parsed {
            Value::Array(days) => SanitizedMenu::Week(self.sanitize_week(days)),
            other => SanitizedMenu::Day(self.sanitize_day(other)),
        }
    }

    pub fn sanitize_week(&self, days: &[Value]) -> WeeklyMenu {
        if days.len() > DAYS_PER_WEEK {
            debug!(received = days.len(), "dropping days beyond the first week");
        }
        let days = days
            .iter()
            .take(DAYS_PER_WEEK)
            .map(|day| self.sanitize_day(day))
            .collect();
        WeeklyMenu::from_days(days)
    }

    /// Non-object input degrades to an empty day.
    pub fn sanitize_day(&self, day: &Value) -> DayMenu {
        let mut result = DayMenu::empty();
        let Some(object) = day.as_object() else {
            return result;
        };

        for slot in MealSlot::ALL {
            let entries = object
                .get(slot.key())
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let dishes = result.slot_mut(slot);
            for entry in entries {
                match self.resolve(entry) {
                    Some(recipe) => dishes.push(recipe.clone()),
                    None => debug!(%slot, ?entry, "dropping unrecognised dish"),
                }
            }
        }
        result
    }

    /// Canonical catalog recipe for an `{"id": ...}` entry.
    fn resolve(&self, entry: &Value) -> Option<&'a Recipe> {
        let id = entry.as_object()?.get("id").and_then(id_from_json)?;
        self.by_id.get(id.as_str()).copied()
    }
}

pub fn sanitize(parsed: &Value, valid_recipes: &[Recipe]) -> SanitizedMenu {
    MenuSanitizer::new(valid_recipes).sanitize(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Vec<Recipe> {
        vec![
            Recipe {
                id: "r1".into(),
                name: "Oatmeal".into(),
                calories: 300.0,
                protein: 10.0,
                fat: 6.0,
                carbs: 52.0,
                weight: None,
            },
            Recipe {
                id: "7".into(),
                name: "Grilled chicken".into(),
                calories: 420.0,
                protein: 45.0,
                fat: 12.0,
                carbs: 3.0,
                weight: Some(1.5),
            },
        ]
    }

    fn day(menu: SanitizedMenu) -> DayMenu {
        match menu {
            SanitizedMenu::Day(day) => day,
            SanitizedMenu::Week(_) => panic!("expected a single day"),
        }
    }

    #[test]
    fn unknown_id_is_dropped_and_all_slots_present() {
        let recipes = catalog();
        let result = day(sanitize(&json!({"breakfast": [{"id": "unknown"}]}), &recipes));
        assert_eq!(result, DayMenu::empty());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 5);
    }

    #[test]
    fn known_ids_are_replaced_by_catalog_records() {
        let recipes = catalog();
        let parsed = json!({
            "breakfast": [{"id": "r1", "name": "HALLUCINATED", "calories": 9999}],
            "lunch": [{"id": 7}, "r1", 42, {"name": "no id"}],
            "dinner": null,
            "brunch": [{"id": "r1"}]
        });
        let result = day(sanitize(&parsed, &recipes));
        assert_eq!(result.breakfast, vec![recipes[0].clone()]);
        assert_eq!(result.lunch, vec![recipes[1].clone()]);
        assert!(result.first_snack.is_empty());
        assert!(result.dinner.is_empty());
        assert_eq!(result.dish_count(), 2);
    }

    #[test]
    fn array_is_clamped_to_seven_days() {
        let recipes = catalog();
        let days: Vec<Value> = (0..9).map(|_| json!({"dinner": [{"id": "7"}]})).collect();
        match sanitize(&Value::Array(days), &recipes) {
            SanitizedMenu::Week(week) => {
                assert_eq!(week.days().len(), 7);
                assert!(week.days().iter().all(|d| d.dinner.len() == 1));
            }
            SanitizedMenu::Day(_) => panic!("expected a week"),
        }
    }

    #[test]
    fn short_array_is_padded_with_empty_days() {
        let recipes = catalog();
        let parsed = json!([{"breakfast": [{"id": "r1"}]}, "garbage"]);
        let week = sanitize(&parsed, &recipes).into_weekly();
        assert_eq!(week.days().len(), 7);
        assert_eq!(week.days()[0].breakfast.len(), 1);
        assert!(week.days()[1..].iter().all(DayMenu::is_empty));
    }

    #[test]
    fn single_day_repeats_across_week() {
        let recipes = catalog();
        let week = sanitize(&json!({"lunch": [{"id": "r1"}]}), &recipes).into_weekly();
        assert!(week.days().iter().all(|d| d.lunch == vec![recipes[0].clone()]));
    }

    #[test]
    fn slot_that_is_not_a_list_is_empty() {
        let recipes = catalog();
        let result = day(sanitize(&json!({"breakfast": {"id": "r1"}}), &recipes));
        assert!(result.breakfast.is_empty());
    }
}
