pub mod api_connection;
pub mod cli;
pub mod config;
pub mod menu_generator;
pub mod menu_sanitizer;
pub mod model;
pub mod optim;
pub mod response_parser;
pub mod search;
pub mod session;

pub use menu_generator::{GenerationSettings, MenuGenerator, MenuOutcome};
pub use model::{DayMenu, MealSlot, OptimizedDayMenu, OptimizedDish, Recipe, WeeklyMenu};
pub use optim::{optimize_menu, MealWeights};
