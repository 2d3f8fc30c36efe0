//! Vector store regeneration (`reset`).
//!
//! Embeds every recipe in the corpus, one provider call at a time and in
//! file order, and writes the resulting [`EmbeddingRecord`]s as a fresh
//! store. A recipe whose embedding fails is reported and left out; only a
//! failure to touch the store itself aborts the run.

use tracing::{info, warn};

use crate::config::Config;
use crate::corpus;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::models::{EmbeddingRecord, Recipe};
use crate::progress::{ProgressReporter, RebuildEvent};
use crate::store;

/// Counts from a completed reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildSummary {
    pub total: usize,
    pub embedded: usize,
    pub failed: usize,
}

/// Load the corpus and rebuild the store from it.
///
/// A missing or unparsable corpus fails before the existing store is
/// touched.
pub async fn run_reset(
    config: &Config,
    provider: &dyn EmbeddingProvider,
    progress: &dyn ProgressReporter,
) -> Result<RebuildSummary> {
    let recipes = corpus::load_corpus(&config.data.corpus_path).await?;
    rebuild_store(config, provider, &recipes, progress).await
}

/// Delete the store, embed `recipes` in order, and write the new store.
///
/// Emits [`RebuildEvent::Started`], one `Embedded`/`Failed` per recipe, then
/// `Done`. If the store cannot be deleted or written, emits
/// [`RebuildEvent::Fatal`] instead and returns the error.
pub async fn rebuild_store(
    config: &Config,
    provider: &dyn EmbeddingProvider,
    recipes: &[Recipe],
    progress: &dyn ProgressReporter,
) -> Result<RebuildSummary> {
    match rebuild_inner(config, provider, recipes, progress).await {
        Ok(summary) => {
            progress.report(RebuildEvent::Done {
                embedded: summary.embedded,
                failed: summary.failed,
            });
            info!(
                total = summary.total,
                embedded = summary.embedded,
                failed = summary.failed,
                store = %config.data.store_path.display(),
                "vector store rebuilt"
            );
            Ok(summary)
        }
        Err(e) => {
            progress.report(RebuildEvent::Fatal {
                reason: e.to_string(),
            });
            Err(e)
        }
    }
}

async fn rebuild_inner(
    config: &Config,
    provider: &dyn EmbeddingProvider,
    recipes: &[Recipe],
    progress: &dyn ProgressReporter,
) -> Result<RebuildSummary> {
    let store_path = &config.data.store_path;
    if store::delete_store(store_path).await? {
        info!(store = %store_path.display(), "removed previous vector store");
    }

    let total = recipes.len();
    progress.report(RebuildEvent::Started { total });

    let mut records = Vec::with_capacity(total);
    let mut failed = 0usize;

    for (i, recipe) in recipes.iter().enumerate() {
        let n = i + 1;
        match embed_recipe(provider, recipe).await {
            Ok(embedding) => {
                records.push(EmbeddingRecord {
                    id: recipe.id.clone(),
                    embedding,
                });
                progress.report(RebuildEvent::Embedded {
                    n,
                    total,
                    id: recipe.id.clone(),
                    title: recipe.title.clone(),
                });
            }
            Err(e) => {
                warn!(id = %recipe.id, error = %e, "skipping recipe");
                failed += 1;
                progress.report(RebuildEvent::Failed {
                    n,
                    total,
                    id: recipe.id.clone(),
                    title: recipe.title.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    store::save_store(store_path, &records).await?;

    Ok(RebuildSummary {
        total,
        embedded: records.len(),
        failed,
    })
}

async fn embed_recipe(provider: &dyn EmbeddingProvider, recipe: &Recipe) -> Result<Vec<f32>> {
    let vector = provider.embed(&corpus::embedding_text(recipe)).await?;
    if vector.is_empty() {
        return Err(Error::EmptyEmbedding);
    }
    if let Some(dims) = provider.dims() {
        if vector.len() != dims {
            warn!(
                id = %recipe.id,
                expected = dims,
                actual = vector.len(),
                "embedding dimensionality differs from embedding.dims"
            );
        }
    }
    Ok(vector)
}
