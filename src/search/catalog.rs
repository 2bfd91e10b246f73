use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::model::Recipe;
use crate::search::vectorizer::{dot, DeterministicVectorizer};

/// The recipe list plus a row-major matrix of their vectors, one row per recipe
/// in catalog order.
#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
    index_by_id: HashMap<String, usize>,
    vectorizer: DeterministicVectorizer,
    matrix: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScoredIndex {
    score: f32,
    index: usize,
}

impl ScoredIndex {
    /// Higher score first; equal scores keep catalog order.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl RecipeCatalog {
    pub fn new(recipes: Vec<Recipe>, vectorizer: DeterministicVectorizer) -> Self {
        let dim = vectorizer.dimension();
        let matrix: Vec<f32> = recipes
            .par_iter()
            .flat_map_iter(|recipe| vectorizer.vector(&recipe.vector_basis()))
            .collect();
        debug_assert_eq!(matrix.len(), recipes.len() * dim);

        let index_by_id = recipes
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();

        debug!(recipes = recipes.len(), dimension = dim, "built recipe vector matrix");
        Self {
            recipes,
            index_by_id,
            vectorizer,
            matrix,
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.vectorizer.dimension()
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.index_by_id.get(id).map(|&i| &self.recipes[i])
    }

    pub fn vector_of(&self, id: &str) -> Option<&[f32]> {
        let dim = self.dimension();
        self.index_by_id
            .get(id)
            .map(|&i| &self.matrix[i * dim..(i + 1) * dim])
    }

    /// Similarity of every recipe to `query`, in catalog order.
    pub fn scores(&self, query: &[f32]) -> Vec<f32> {
        let dim = self.dimension();
        if dim == 0 {
            return vec![0.0; self.recipes.len()];
        }
        self.matrix
            .par_chunks_exact(dim)
            .map(|row| dot(row, query))
            .collect()
    }

    /// Exact top-k by descending similarity to `query_text`. `k` is clamped to
    /// `[1, len]`; an empty catalog yields nothing.
    pub fn retrieve(&self, query_text: &str, k: usize) -> Vec<Recipe> {
        self.retrieve_scored(query_text, k)
            .into_iter()
            .map(|(recipe, _)| recipe.clone())
            .collect()
    }

    pub fn retrieve_scored(&self, query_text: &str, k: usize) -> Vec<(&Recipe, f32)> {
        if self.recipes.is_empty() {
            return Vec::new();
        }
        let query = self.vectorizer.vector(query_text);
        let k = k.clamp(1, self.recipes.len());

        let mut scored: Vec<ScoredIndex> = self
            .scores(&query)
            .into_iter()
            .enumerate()
            .map(|(index, score)| ScoredIndex { score, index })
            .collect();

        // The rank order is total, so partial selection followed by sorting the
        // head is exactly the first k of a full stable sort.
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, ScoredIndex::rank);
            scored.truncate(k);
        }
        scored.sort_unstable_by(ScoredIndex::rank);

        scored
            .into_iter()
            .map(|s| (&self.recipes[s.index], s.score))
            .collect()
    }
}
