//! Recipe corpus loading.
//!
//! The corpus is a JSON array of recipe objects. It is never written by
//! this crate.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Recipe;

/// Load the corpus in file order.
///
/// A missing file is [`Error::CorpusMissing`]; anything that does not parse
/// as a list of recipes is [`Error::CorpusInvalid`].
pub async fn load_corpus(path: &Path) -> Result<Vec<Recipe>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::CorpusMissing(path.to_path_buf()))
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    serde_json::from_slice(&bytes).map_err(|source| Error::CorpusInvalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the corpus keyed by recipe id. Later duplicates win.
pub async fn load_corpus_index(path: &Path) -> Result<HashMap<String, Recipe>> {
    Ok(index_by_id(load_corpus(path).await?))
}

pub fn index_by_id(recipes: Vec<Recipe>) -> HashMap<String, Recipe> {
    recipes.into_iter().map(|r| (r.id.clone(), r)).collect()
}

/// The text sent to the embedding provider for one recipe.
///
/// Title, description, ingredients (comma separated) and instructions
/// (space separated), one per line.
pub fn embedding_text(recipe: &Recipe) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        recipe.title,
        recipe.description,
        recipe.ingredients.join(", "),
        recipe.instructions.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tempfile::TempDir;

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: "Tomato soup".to_string(),
            description: "A quick weeknight soup".to_string(),
            ingredients: vec!["tomatoes".into(), "onion".into(), "stock".into()],
            instructions: vec!["Chop.".into(), "Simmer 20 minutes.".into()],
            extra: Map::new(),
        }
    }

    #[test]
    fn test_embedding_text_layout() {
        let text = embedding_text(&recipe("r1"));
        assert_eq!(
            text,
            "Tomato soup\nA quick weeknight soup\ntomatoes, onion, stock\nChop. Simmer 20 minutes."
        );
    }

    #[test]
    fn test_index_by_id() {
        let index = index_by_id(vec![recipe("a"), recipe("b")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index["b"].id, "b");
    }

    #[tokio::test]
    async fn test_missing_corpus() {
        let tmp = TempDir::new().unwrap();
        let err = load_corpus(&tmp.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, Error::CorpusMissing(_)));
    }

    #[tokio::test]
    async fn test_invalid_corpus() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("recipes.json");
        std::fs::write(&path, r#"{"id": "not a list"}"#).unwrap();
        let err = load_corpus(&path).await.unwrap_err();
        assert!(matches!(err, Error::CorpusInvalid { .. }));
    }

    #[tokio::test]
    async fn test_load_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("recipes.json");
        let recipes = vec![recipe("z"), recipe("a"), recipe("m")];
        std::fs::write(&path, serde_json::to_string(&recipes).unwrap()).unwrap();

        let loaded = load_corpus(&path).await.unwrap();
        let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
