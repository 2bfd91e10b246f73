//! Weekly menu generation.
//!
//! Retrieval picks candidate recipes, the text generator composes a menu from
//! them, and the reply is parsed and checked against the catalog. Any failure
//! along the way yields the empty seven-day template instead of an error, so
//! callers always get a well-formed [`WeeklyMenu`].

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api_connection::{ApiConnectionError, ChatMessage, TextGenerator};
use crate::menu_sanitizer::MenuSanitizer;
use crate::model::{Recipe, WeeklyMenu};
use crate::response_parser::{extract_json, ResponseParseError};
use crate::search::{CatalogLoadError, CatalogProvider};

pub const MENU_QUERY: &str = "generate a 7-day menu";
pub const DEFAULT_CANDIDATES: usize = 20;
pub const DEFAULT_MODEL: &str = "hetg/llama3-nutrition";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const SYSTEM_PROMPT: &str = "You are a nutrition assistant that plans meals from a fixed recipe list.
Compose a 7-day menu using only recipes from the list provided by the user.
Return only JSON: an array of 7 objects, one per day. Each object has exactly the keys
\"breakfast\", \"first_snack\", \"lunch\", \"second_snack\" and \"dinner\", and each key holds an
array of objects of the form {\"id\": \"<recipe id>\"}. Use the recipe IDs exactly as listed.
Do not invent recipes and do not add any other keys.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Prompting,
    AwaitingResponse,
    Parsing,
    Sanitizing,
    Done,
    Failed,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationState::Idle => "idle",
            GenerationState::Prompting => "prompting",
            GenerationState::AwaitingResponse => "awaiting_response",
            GenerationState::Parsing => "parsing",
            GenerationState::Sanitizing => "sanitizing",
            GenerationState::Done => "done",
            GenerationState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("recipe catalog unavailable: {0}")]
    Catalog(#[from] CatalogLoadError),
    #[error("text generation failed: {0}")]
    Api(#[from] ApiConnectionError),
    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("could not read a menu from the reply: {0}")]
    Parse(#[from] ResponseParseError),
}

/// Either a generated menu or the empty template, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuOutcome {
    Generated(WeeklyMenu),
    Fallback {
        menu: WeeklyMenu,
        /// State the pipeline was in when it failed.
        failed_in: GenerationState,
        reason: String,
    },
}

impl MenuOutcome {
    fn fallback(failed_in: GenerationState, error: &GenerationError) -> Self {
        MenuOutcome::Fallback {
            menu: WeeklyMenu::empty(),
            failed_in,
            reason: error.to_string(),
        }
    }

    pub fn menu(&self) -> &WeeklyMenu {
        match self {
            MenuOutcome::Generated(menu) | MenuOutcome::Fallback { menu, .. } => menu,
        }
    }

    pub fn into_menu(self) -> WeeklyMenu {
        match self {
            MenuOutcome::Generated(menu) | MenuOutcome::Fallback { menu, .. } => menu,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, MenuOutcome::Fallback { .. })
    }
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub timeout: Duration,
    pub candidates: usize,
    pub query: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            candidates: DEFAULT_CANDIDATES,
            query: MENU_QUERY.to_string(),
        }
    }
}

/// One prompt line per candidate recipe.
pub fn render_candidate(recipe: &Recipe) -> String {
    format!(
        "ID: {} | Name: {} | {} kcal | P: {} F: {} C: {}",
        recipe.id, recipe.name, recipe.calories, recipe.protein, recipe.fat, recipe.carbs
    )
}

pub fn build_prompt(candidates: &[Recipe]) -> Vec<ChatMessage> {
    let listing = candidates
        .iter()
        .map(render_candidate)
        .collect::<Vec<String>>()
        .join("\n");
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!("Available recipes:\n{}", listing)),
    ]
}

pub struct MenuGenerator<G, C> {
    generator: G,
    catalog: C,
    settings: GenerationSettings,
}

impl<G: TextGenerator, C: CatalogProvider> MenuGenerator<G, C> {
    pub fn new(generator: G, catalog: C) -> Self {
        Self::with_settings(generator, catalog, GenerationSettings::default())
    }

    pub fn with_settings(generator: G, catalog: C, settings: GenerationSettings) -> Self {
        Self {
            generator,
            catalog,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Runs the full pipeline; failures are logged and replaced by the empty week.
    pub async fn generate(&self) -> MenuOutcome {
        let mut state = GenerationState::Idle;
        match self.run(&mut state).await {
            Ok(menu) => {
                advance(&mut state, GenerationState::Done);
                info!(dishes = menu.days().iter().map(|d| d.dish_count()).sum::<usize>(), "weekly menu generated");
                MenuOutcome::Generated(menu)
            }
            Err(e) => {
                let failed_in = state;
                advance(&mut state, GenerationState::Failed);
                warn!(%failed_in, error = %e, "menu generation failed, using empty weekly template");
                MenuOutcome::fallback(failed_in, &e)
            }
        }
    }

    pub async fn generate_weekly_menu(&self) -> WeeklyMenu {
        self.generate().await.into_menu()
    }

    async fn run(&self, state: &mut GenerationState) -> Result<WeeklyMenu, GenerationError> {
        advance(state, GenerationState::Prompting);
        let catalog = self.catalog.catalog()?;
        let candidates = catalog.retrieve(&self.settings.query, self.settings.candidates);
        debug!(candidates = candidates.len(), query = %self.settings.query, "retrieved candidate recipes");
        let messages = build_prompt(&candidates);

        advance(state, GenerationState::AwaitingResponse);
        let reply = tokio::time::timeout(
            self.settings.timeout,
            self.generator.generate(&messages, &self.settings.model),
        )
        .await
        .map_err(|_| GenerationError::Timeout(self.settings.timeout))??;
        debug!(reply_len = reply.len(), "received generator reply");

        advance(state, GenerationState::Parsing);
        let parsed = extract_json(&reply)?;

        advance(state, GenerationState::Sanitizing);
        let menu = MenuSanitizer::new(catalog.recipes()).sanitize(&parsed);
        Ok(menu.into_weekly())
    }
}

fn advance(state: &mut GenerationState, next: GenerationState) {
    debug!(from = %state, to = %next, "menu generation state");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_line_lists_id_name_and_macros() {
        let recipe = Recipe {
            id: "r1".into(),
            name: "Oatmeal".into(),
            calories: 300.0,
            protein: 10.0,
            fat: 6.5,
            carbs: 52.0,
            weight: None,
        };
        assert_eq!(
            render_candidate(&recipe),
            "ID: r1 | Name: Oatmeal | 300 kcal | P: 10 F: 6.5 C: 52"
        );
    }

    #[test]
    fn prompt_has_system_and_user_messages() {
        let messages = build_prompt(&[]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.starts_with("Available recipes:"));
    }

    #[test]
    fn fallback_outcome_is_the_empty_week() {
        let outcome = MenuOutcome::fallback(
            GenerationState::Parsing,
            &GenerationError::Parse(ResponseParseError::EmptyResponse),
        );
        assert!(outcome.is_fallback());
        assert_eq!(outcome.menu(), &WeeklyMenu::empty());
        assert_eq!(GenerationState::AwaitingResponse.to_string(), "awaiting_response");
    }
}
