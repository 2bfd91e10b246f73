use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::model::Recipe;
use crate::search::catalog::RecipeCatalog;
use crate::search::data_loader::{load_recipes, CatalogLoadError};
use crate::search::vectorizer::DeterministicVectorizer;

/// Source of the process-wide recipe catalog.
pub trait CatalogProvider: Send + Sync {
    /// Returns the catalog, loading it on first use.
    fn catalog(&self) -> Result<Arc<RecipeCatalog>, CatalogLoadError>;

    /// The recipe list. Repeated calls return the cached data.
    fn load(&self) -> Result<Vec<Recipe>, CatalogLoadError> {
        Ok(self.catalog()?.recipes().to_vec())
    }
}

/// Loads a catalog file at most once. Concurrent first callers block on the
/// same initialisation; a failed load leaves the cell empty so the next call
/// tries again.
#[derive(Debug)]
pub struct FileCatalogProvider {
    path: PathBuf,
    vectorizer: DeterministicVectorizer,
    cell: OnceCell<Arc<RecipeCatalog>>,
}

impl FileCatalogProvider {
    pub fn new(path: impl Into<PathBuf>, dimension: usize) -> Self {
        Self {
            path: path.into(),
            vectorizer: DeterministicVectorizer::new(dimension),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl CatalogProvider for FileCatalogProvider {
    fn catalog(&self) -> Result<Arc<RecipeCatalog>, CatalogLoadError> {
        self.cell
            .get_or_try_init(|| {
                let recipes = load_recipes(&self.path).inspect_err(|e| {
                    warn!(path = %self.path.display(), error = %e, "recipe catalog load failed");
                })?;
                info!(path = %self.path.display(), recipes = recipes.len(), "recipe catalog loaded");
                Ok(Arc::new(RecipeCatalog::new(recipes, self.vectorizer)))
            })
            .cloned()
    }
}

/// An already-built catalog, for tests and callers that bring their own data.
#[derive(Debug, Clone)]
pub struct StaticCatalogProvider {
    catalog: Arc<RecipeCatalog>,
}

impl StaticCatalogProvider {
    pub fn new(catalog: RecipeCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

impl CatalogProvider for StaticCatalogProvider {
    fn catalog(&self) -> Result<Arc<RecipeCatalog>, CatalogLoadError> {
        Ok(Arc::clone(&self.catalog))
    }
}
