pub mod catalog;
pub mod data_loader;
pub mod provider;
pub mod vectorizer;

pub use catalog::RecipeCatalog;
pub use data_loader::{load_recipes, CatalogLoadError};
pub use provider::{CatalogProvider, FileCatalogProvider, StaticCatalogProvider};
pub use vectorizer::{DeterministicVectorizer, DEFAULT_VECTOR_DIMENSION};
