use anyhow::{Context, Result};
use menu_optim::cli::{parse_args, Cli, Command, OptimizeArgs};
use menu_optim::config::AppConfig;
use menu_optim::menu_generator::{MenuGenerator, MenuOutcome};
use menu_optim::model::{DayMenu, OptimizedDayMenu, WeeklyMenu};
use menu_optim::optim::{
    calorie_deviation, default_day_menu, optimize_menu_or_default, optimize_week, parse_target_calories,
    summarize, CalorieDeviation, DaySummary, OptimizedWeek,
};
use menu_optim::search::{CatalogProvider, FileCatalogProvider};
use menu_optim::session::MenuSession;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct OptimizedDayReport {
    day: usize,
    target_calories: f64,
    total_calories: f64,
    deviation: CalorieDeviation,
    summary: DaySummary,
    menu: OptimizedDayMenu,
}

#[derive(Serialize)]
struct OptimizedWeekReport {
    target_calories: f64,
    deviation: CalorieDeviation,
    week: OptimizedWeek,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_generate(
    config: &AppConfig,
    catalog: FileCatalogProvider,
    session: &MenuSession,
) -> Result<()> {
    let generator = MenuGenerator::with_settings(config.provider(), catalog, config.generation_settings());
    let outcome = generator.generate().await;
    if let MenuOutcome::Fallback { failed_in, reason, .. } = &outcome {
        warn!(%failed_in, %reason, "no menu could be generated");
        // Surface a broken catalog instead of silently storing an empty week.
        generator
            .catalog()
            .catalog()
            .with_context(|| format!("Recipe catalog {:?} could not be loaded", generator.catalog().path()))?;
    }
    let menu = outcome.into_menu();
    session.store(&menu)?;
    info!(path = %session.path().display(), "weekly menu saved");
    print_json(&menu)
}

fn run_optimize(args: &OptimizeArgs, session: &MenuSession) -> Result<()> {
    let target = parse_target_calories(&args.target);
    let weights = args.meal_weights();
    let stored = session.load()?;
    if stored.is_none() {
        info!("no stored menu, optimising the default day");
    }

    if args.week {
        let week = stored.unwrap_or_else(|| WeeklyMenu::repeat_day(default_day_menu()));
        let result = optimize_week(&week, target, &weights);
        let report = OptimizedWeekReport {
            target_calories: target,
            deviation: calorie_deviation(result.total_calories, target * week.days().len() as f64),
            week: result,
        };
        return print_json(&report);
    }

    let day: Option<&DayMenu> = stored.as_ref().and_then(|week| week.day(args.day_index()));
    let (menu, total) = optimize_menu_or_default(day, target, &weights);
    let report = OptimizedDayReport {
        day: args.day_index() + 1,
        target_calories: target,
        total_calories: total,
        deviation: calorie_deviation(total, target),
        summary: summarize(&menu),
        menu,
    };
    print_json(&report)
}

fn run_retrieve(catalog: &FileCatalogProvider, query: &str, k: usize) -> Result<()> {
    let catalog = catalog
        .catalog()
        .with_context(|| format!("Recipe catalog {:?} could not be loaded", catalog.path()))?;
    for (recipe, score) in catalog.retrieve_scored(query, k) {
        println!("{:>7.4}  {}  {} ({} kcal)", score, recipe.id, recipe.name, recipe.calories);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        verbose,
        catalog,
        session,
        command,
    } = parse_args();
    init_tracing(verbose);

    let mut config = AppConfig::from_env()?;
    if let Some(path) = catalog {
        config.catalog_path = path;
    }
    let session = MenuSession::new(session);
    let catalog = FileCatalogProvider::new(config.catalog_path.clone(), config.vector_dimension);

    match command {
        Command::Generate { provider, model } => {
            if let Some(provider) = provider {
                config.provider = provider;
            }
            if let Some(model) = model {
                config.model = Some(model);
            }
            run_generate(&config, catalog, &session).await
        }
        Command::Optimize(args) => run_optimize(&args, &session),
        Command::Clear => {
            if session.clear()? {
                info!(path = %session.path().display(), "stored menu cleared");
            } else {
                info!("nothing to clear");
            }
            Ok(())
        }
        Command::Retrieve { query, k } => run_retrieve(&catalog, &query, k),
    }
}
