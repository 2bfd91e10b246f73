use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ProviderKind;
use crate::model::MealSlot;
use crate::optim::MealWeights;

pub const DEFAULT_SESSION_PATH: &str = "data/session_menu.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Weekly menu generation and portion optimisation", long_about = None)]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Recipe catalog file (.json or .csv), overrides MENU_CATALOG_PATH
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Where the last generated weekly menu is kept
    #[arg(long, global = true, default_value = DEFAULT_SESSION_PATH)]
    pub session: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a weekly menu from the catalog and store it in the session
    Generate {
        /// Overrides MENU_LLM_PROVIDER
        #[arg(long, value_enum)]
        provider: Option<ProviderKind>,
        /// Overrides MENU_LLM_MODEL
        #[arg(long)]
        model: Option<String>,
    },
    /// Scale the portions of the stored menu to a calorie target
    Optimize(OptimizeArgs),
    /// Forget the stored weekly menu
    Clear,
    /// Show the catalog recipes closest to a query
    Retrieve {
        query: String,
        #[arg(short, default_value_t = 5)]
        k: usize,
    },
}

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Daily calorie target, e.g. "1800" or "1800,5"
    #[arg(short, long)]
    pub target: String,

    /// Day of the stored week to optimise (1-7)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=7))]
    pub day: u8,

    /// Optimise all seven days instead of one
    #[arg(long, conflicts_with = "day")]
    pub week: bool,

    #[arg(long)]
    pub breakfast: Option<String>,
    #[arg(long)]
    pub first_snack: Option<String>,
    #[arg(long)]
    pub lunch: Option<String>,
    #[arg(long)]
    pub second_snack: Option<String>,
    #[arg(long)]
    pub dinner: Option<String>,
}

impl OptimizeArgs {
    /// Slot shares as typed; slots left out count as 0.
    pub fn meal_weights(&self) -> MealWeights {
        let inputs = [
            (MealSlot::Breakfast, &self.breakfast),
            (MealSlot::FirstSnack, &self.first_snack),
            (MealSlot::Lunch, &self.lunch),
            (MealSlot::SecondSnack, &self.second_snack),
            (MealSlot::Dinner, &self.dinner),
        ];
        MealWeights::from_inputs(
            inputs
                .iter()
                .filter_map(|(slot, value)| value.as_deref().map(|v| (slot.key(), v))),
        )
    }

    pub fn day_index(&self) -> usize {
        usize::from(self.day.saturating_sub(1))
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
