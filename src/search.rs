//! Nearest-neighbour search over the vector store.
//!
//! Brute force: the query vector is compared with every stored vector by
//! [`cosine_distance`], results are sorted ascending (stable, so ties keep
//! store order) and the first `search.top_k` are returned with their
//! recipes.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::Config;
use crate::corpus;
use crate::embedding::{cosine_distance, EmbeddingProvider};
use crate::error::{Error, Result};
use crate::models::{EmbeddingRecord, Recipe, SearchHit};
use crate::store;

/// Run a search for `query`.
///
/// Surrounding whitespace is trimmed and the trimmed text is what gets
/// embedded. Checks, in order: the query is non-empty (before any file or
/// provider access), the corpus exists, the store exists, and the provider
/// returns a vector for the query.
pub async fn search_recipes(
    config: &Config,
    provider: &dyn EmbeddingProvider,
    query: &str,
) -> Result<Vec<SearchHit>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Error::EmptyQuery);
    }

    let started = Instant::now();
    let recipes = corpus::load_corpus_index(&config.data.corpus_path).await?;
    let records = store::load_store(&config.data.store_path).await?;

    let query_vec = provider.embed(query).await?;
    if query_vec.is_empty() {
        return Err(Error::EmptyEmbedding);
    }

    let hits = rank(&query_vec, &records, &recipes, config.search.top_k);
    debug!(
        query,
        candidates = records.len(),
        returned = hits.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search complete"
    );
    Ok(hits)
}

/// Score every record against `query`, keep those with a corpus entry, and
/// return the `limit` closest.
pub fn rank(
    query: &[f32],
    records: &[EmbeddingRecord],
    recipes: &HashMap<String, Recipe>,
    limit: usize,
) -> Vec<SearchHit> {
    let mut scored: Vec<(&EmbeddingRecord, f64)> = records
        .iter()
        .map(|record| {
            if record.embedding.len() != query.len() {
                warn!(
                    id = %record.id,
                    expected = query.len(),
                    actual = record.embedding.len(),
                    "stored embedding dimensionality differs from query"
                );
            }
            (record, cosine_distance(query, &record.embedding))
        })
        .collect();

    scored.sort_by(|a, b| a.1.total_cmp(&b.1));

    scored
        .into_iter()
        .filter_map(|(record, distance)| match recipes.get(&record.id) {
            Some(recipe) => Some(SearchHit {
                recipe: recipe.clone(),
                distance,
            }),
            None => {
                debug!(id = %record.id, "stored embedding has no corpus entry");
                None
            }
        })
        .take(limit)
        .collect()
}
