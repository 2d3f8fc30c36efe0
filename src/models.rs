//! Core data models.
//!
//! These types mirror the two JSON files the service works with: the
//! recipe corpus (read-only input) and the vector store (rewritten in full
//! on every reset).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A recipe from the corpus file.
///
/// Fields beyond the five known ones are kept in `extra` so that search
/// results carry the corpus entry through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One stored embedding. `id` refers to a [`Recipe`] but is not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub embedding: Vec<f32>,
}

/// A search result: the full recipe plus its cosine distance to the query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub distance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_keeps_extra_fields() {
        let json = r#"{
            "id": "r1",
            "title": "Pancakes",
            "description": "Fluffy",
            "ingredients": ["flour", "milk"],
            "instructions": ["Mix.", "Fry."],
            "image": "pancakes.png"
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.extra.get("image"), Some(&Value::from("pancakes.png")));

        let hit = SearchHit {
            recipe,
            distance: 0.25,
        };
        let out = serde_json::to_value(&hit).unwrap();
        assert_eq!(out["id"], "r1");
        assert_eq!(out["image"], "pancakes.png");
        assert_eq!(out["distance"], 0.25);
    }

    #[test]
    fn test_recipe_requires_known_fields() {
        let json = r#"{"id": "r1", "title": "No lists"}"#;
        assert!(serde_json::from_str::<Recipe>(json).is_err());
    }
}
