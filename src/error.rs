//! Error categories for indexing and search.
//!
//! The HTTP layer maps each variant onto a status code and a short
//! machine-readable code (see [`crate::server`]); the message itself stays
//! human-readable.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The corpus file does not exist.
    #[error("corpus not found: {0}")]
    CorpusMissing(PathBuf),

    /// The corpus file exists but is not a list of recipe objects.
    #[error("corpus invalid: {path}: {source}")]
    CorpusInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No vector store has been built yet.
    #[error("vector store not initialized: {0} (run a reset first)")]
    StoreMissing(PathBuf),

    /// The vector store file could not be parsed.
    #[error("vector store invalid: {path}: {source}")]
    StoreInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("query must not be empty")]
    EmptyQuery,

    #[error("embedding provider is disabled")]
    ProviderDisabled,

    /// The remote provider answered with an error.
    #[error("embedding failed: {0}")]
    Provider(String),

    /// The remote provider answered successfully but without a vector.
    #[error("embedding failed: provider returned no vector")]
    EmptyEmbedding,

    #[error("embedding failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures that originate at the embedding provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Error::ProviderDisabled | Error::Provider(_) | Error::EmptyEmbedding | Error::Http(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failure_classification() {
        assert!(Error::EmptyEmbedding.is_provider_failure());
        assert!(Error::Provider("boom".into()).is_provider_failure());
        assert!(Error::ProviderDisabled.is_provider_failure());
        assert!(!Error::EmptyQuery.is_provider_failure());
        assert!(!Error::StoreMissing(PathBuf::from("x.json")).is_provider_failure());
    }

    #[test]
    fn test_messages_are_readable() {
        let err = Error::CorpusMissing(PathBuf::from("data/recipes.json"));
        assert_eq!(err.to_string(), "corpus not found: data/recipes.json");
        assert_eq!(
            Error::EmptyEmbedding.to_string(),
            "embedding failed: provider returned no vector"
        );
    }
}
