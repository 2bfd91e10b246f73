use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Number of days in a weekly menu.
pub const DAYS_PER_WEEK: usize = 7;

/// The five fixed meal slots of a day, in serving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    FirstSnack,
    Lunch,
    SecondSnack,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 5] = [
        MealSlot::Breakfast,
        MealSlot::FirstSnack,
        MealSlot::Lunch,
        MealSlot::SecondSnack,
        MealSlot::Dinner,
    ];

    /// The key used for this slot in JSON menus.
    pub fn key(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::FirstSnack => "first_snack",
            MealSlot::Lunch => "lunch",
            MealSlot::SecondSnack => "second_snack",
            MealSlot::Dinner => "dinner",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        MealSlot::ALL.into_iter().find(|slot| slot.key() == key)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A catalog recipe. Nutrition values are per unit portion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(deserialize_with = "deserialize_recipe_id")]
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    /// Default-portion prior used when splitting a meal budget between dishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Recipe {
    /// Text the recipe vector is derived from.
    pub fn vector_basis(&self) -> String {
        format!("{}::{}", self.id, self.name)
    }
}

/// Recipe ids show up as strings or as plain integers; both normalise to a string.
pub(crate) fn id_from_json(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_recipe_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    id_from_json(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("recipe id must be a string or a number, got {}", value)))
}

/// One day of dishes, keyed by the five fixed slots.
///
/// The struct layout is what keeps the "exactly five keys" shape: there is no
/// way to hold an extra slot, and every slot serializes even when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct DayPlan<T> {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub breakfast: Vec<T>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_snack: Vec<T>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lunch: Vec<T>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub second_snack: Vec<T>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dinner: Vec<T>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> Default for DayPlan<T> {
    fn default() -> Self {
        Self {
            breakfast: Vec::new(),
            first_snack: Vec::new(),
            lunch: Vec::new(),
            second_snack: Vec::new(),
            dinner: Vec::new(),
        }
    }
}

impl<T> DayPlan<T> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn slot(&self, slot: MealSlot) -> &[T] {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::FirstSnack => &self.first_snack,
            MealSlot::Lunch => &self.lunch,
            MealSlot::SecondSnack => &self.second_snack,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn slot_mut(&mut self, slot: MealSlot) -> &mut Vec<T> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::FirstSnack => &mut self.first_snack,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::SecondSnack => &mut self.second_snack,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    /// Slots in serving order, paired with their dishes.
    pub fn slots(&self) -> impl Iterator<Item = (MealSlot, &[T])> {
        MealSlot::ALL.into_iter().map(move |slot| (slot, self.slot(slot)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots().all(|(_, dishes)| dishes.is_empty())
    }

    pub fn dish_count(&self) -> usize {
        self.slots().map(|(_, dishes)| dishes.len()).sum()
    }
}

pub type DayMenu = DayPlan<Recipe>;

/// Exactly seven day menus. Shorter input is padded with empty days and
/// longer input is truncated, both at construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<DayMenu>", into = "Vec<DayMenu>")]
pub struct WeeklyMenu {
    days: Vec<DayMenu>,
}

impl WeeklyMenu {
    pub fn from_days(mut days: Vec<DayMenu>) -> Self {
        days.truncate(DAYS_PER_WEEK);
        days.resize_with(DAYS_PER_WEEK, DayMenu::empty);
        Self { days }
    }

    /// The fallback template: seven days with every slot empty.
    pub fn empty() -> Self {
        Self::from_days(Vec::new())
    }

    /// The same day served on all seven days.
    pub fn repeat_day(day: DayMenu) -> Self {
        Self::from_days(vec![day; DAYS_PER_WEEK])
    }

    pub fn days(&self) -> &[DayMenu] {
        &self.days
    }

    pub fn day(&self, index: usize) -> Option<&DayMenu> {
        self.days.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(DayMenu::is_empty)
    }
}

impl From<Vec<DayMenu>> for WeeklyMenu {
    fn from(days: Vec<DayMenu>) -> Self {
        Self::from_days(days)
    }
}

impl From<WeeklyMenu> for Vec<DayMenu> {
    fn from(menu: WeeklyMenu) -> Self {
        menu.days
    }
}

/// A dish scaled to its share of a meal budget. All values rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedDish {
    pub name: String,
    pub calories: f64,
    pub portion: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

pub type OptimizedDayMenu = DayPlan<OptimizedDish>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn day_plan_serializes_all_five_slots() {
        let day = DayMenu::empty();
        let value = serde_json::to_value(&day).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        for slot in MealSlot::ALL {
            assert_eq!(value[slot.key()], json!([]));
        }
    }

    #[test]
    fn recipe_accepts_numeric_id() {
        let recipe: Recipe = serde_json::from_value(json!({
            "id": 42, "name": "Porridge", "calories": 300, "protein": 10, "fat": 5, "carbs": 50
        }))
        .unwrap();
        assert_eq!(recipe.id, "42");
        assert_eq!(recipe.weight, None);
        assert_eq!(recipe.vector_basis(), "42::Porridge");
    }

    #[test]
    fn weekly_menu_pads_and_truncates() {
        assert_eq!(WeeklyMenu::from_days(vec![DayMenu::empty(); 3]).days().len(), 7);
        assert_eq!(WeeklyMenu::from_days(vec![DayMenu::empty(); 10]).days().len(), 7);

        let parsed: WeeklyMenu = serde_json::from_value(json!([{ "breakfast": null }])).unwrap();
        assert_eq!(parsed.days().len(), 7);
        assert!(parsed.is_empty());
    }

    #[test]
    fn slot_keys_round_trip() {
        for slot in MealSlot::ALL {
            assert_eq!(MealSlot::from_key(slot.key()), Some(slot));
        }
        assert_eq!(MealSlot::from_key("brunch"), None);
    }
}
