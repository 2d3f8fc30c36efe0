//! Embedding provider abstraction and implementations.
//!
//! Defines the [`EmbeddingProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]**: returns errors; used when embeddings are not configured.
//! - **[`OpenAIProvider`]**: calls the OpenAI `POST /embeddings` endpoint.
//! - **[`OllamaProvider`]**: calls a local Ollama instance's `/api/embed` endpoint.
//! - **[`GeminiProvider`]**: calls the Gemini `embedContent` endpoint.
//!
//! Also provides [`cosine_distance`], the ranking key used by search.
//!
//! # Provider Selection
//!
//! Use [`create_provider`] to instantiate the appropriate provider based
//! on the configuration:
//!
//! ```rust,no_run
//! # use recipe_index::config::EmbeddingConfig;
//! # use recipe_index::embedding::create_provider;
//! let config = EmbeddingConfig::default(); // provider = "disabled"
//! let provider = create_provider(&config).unwrap();
//! assert_eq!(provider.model_name(), "disabled");
//! ```
//!
//! # Failures
//!
//! Every call is a single request: no retry, no backoff. A non-2xx answer
//! becomes [`Error::Provider`] carrying the status and body text, and a
//! successful answer without a vector becomes [`Error::EmptyEmbedding`].
//! Callers decide whether a failure is fatal.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Trait for embedding providers.
///
/// Implementations are shared across requests behind an `Arc`, so they
/// must be `Send + Sync`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-004"`).
    fn model_name(&self) -> &str;
    /// Returns the configured vector dimensionality, if known.
    fn dims(&self) -> Option<usize>;
    /// Embed one text blob.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

// ============ Disabled Provider ============

/// A no-op embedding provider that always returns errors.
///
/// Used when `embedding.provider = "disabled"` in the configuration.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> Option<usize> {
        None
    }
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::ProviderDisabled)
    }
}

fn http_client(config: &EmbeddingConfig) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

fn required_model(config: &EmbeddingConfig) -> anyhow::Result<String> {
    config.model.clone().ok_or_else(|| {
        anyhow::anyhow!(
            "embedding.model required for {} provider",
            config.provider
        )
    })
}

fn required_key(config: &EmbeddingConfig) -> anyhow::Result<String> {
    let var = config.api_key_var().unwrap_or("API key");
    config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", var))
}

/// Send a JSON request and return the parsed JSON body of a 2xx answer.
async fn send_json(
    provider: &str,
    request: reqwest::RequestBuilder,
    body: &serde_json::Value,
) -> Result<serde_json::Value> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        return Err(Error::Provider(format!(
            "{} API error {}: {}",
            provider, status, body_text
        )));
    }

    Ok(response.json().await?)
}

fn json_to_vec(values: &[serde_json::Value]) -> Result<Vec<f32>> {
    if values.is_empty() {
        return Err(Error::EmptyEmbedding);
    }
    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|x| x as f32)
                .ok_or_else(|| Error::Provider(format!("non-numeric embedding value: {}", v)))
        })
        .collect()
}

// ============ OpenAI Provider ============

/// Embedding provider using the OpenAI API.
///
/// Calls `POST {url}/embeddings` (default `https://api.openai.com/v1`).
/// Requires `OPENAI_API_KEY`.
pub struct OpenAIProvider {
    model: String,
    dims: Option<usize>,
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        Ok(Self {
            model: required_model(config)?,
            dims: config.dims,
            url: config
                .url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            api_key: required_key(config)?,
            client: http_client(config)?,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> Option<usize> {
        self.dims
    }
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });
        let request = self
            .client
            .post(format!("{}/embeddings", self.url))
            .header("Authorization", format!("Bearer {}", self.api_key));
        let json = send_json("OpenAI", request, &body).await?;
        parse_openai_response(&json)
    }
}

/// Extracts `data[0].embedding`.
fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| Error::Provider("Invalid OpenAI response: missing data array".into()))?;

    match data.first() {
        None => Err(Error::EmptyEmbedding),
        Some(item) => {
            let embedding = item
                .get("embedding")
                .and_then(|e| e.as_array())
                .ok_or_else(|| {
                    Error::Provider("Invalid OpenAI response: missing embedding".into())
                })?;
            json_to_vec(embedding)
        }
    }
}

// ============ Ollama Provider ============

/// Embedding provider using a local Ollama instance.
///
/// Calls `POST /api/embed` on the configured Ollama URL (default: `http://localhost:11434`).
/// Requires Ollama to be running with an embedding model pulled (e.g. `ollama pull nomic-embed-text`).
pub struct OllamaProvider {
    model: String,
    dims: Option<usize>,
    url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        Ok(Self {
            model: required_model(config)?,
            dims: config.dims,
            url: config
                .url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            client: http_client(config)?,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> Option<usize> {
        self.dims
    }
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });
        let request = self.client.post(format!("{}/api/embed", self.url));
        let json = send_json("Ollama", request, &body).await?;
        parse_ollama_response(&json)
    }
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| {
            Error::Provider("Invalid Ollama response: missing embeddings array".into())
        })?;

    match embeddings.first() {
        None => Err(Error::EmptyEmbedding),
        Some(embedding) => {
            let values = embedding.as_array().ok_or_else(|| {
                Error::Provider("Invalid Ollama response: embedding is not an array".into())
            })?;
            json_to_vec(values)
        }
    }
}

// ============ Gemini Provider ============

/// Embedding provider using the Gemini API.
///
/// Calls `POST {url}/v1beta/models/{model}:embedContent`
/// (default `https://generativelanguage.googleapis.com`). Requires
/// `GEMINI_API_KEY`. `text-embedding-004` produces 768-dimensional vectors.
pub struct GeminiProvider {
    model: String,
    dims: Option<usize>,
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let model = required_model(config)?;
        let model = model
            .strip_prefix("models/")
            .map(str::to_string)
            .unwrap_or(model);
        Ok(Self {
            model,
            dims: config.dims,
            url: config
                .url
                .clone()
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
            api_key: required_key(config)?,
            client: http_client(config)?,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> Option<usize> {
        self.dims
    }
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] },
        });
        let request = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:embedContent",
                self.url, self.model
            ))
            .header("x-goog-api-key", &self.api_key);
        let json = send_json("Gemini", request, &body).await?;
        parse_gemini_response(&json)
    }
}

/// Extracts `embedding.values`.
fn parse_gemini_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    match json
        .get("embedding")
        .and_then(|e| e.get("values"))
        .and_then(|v| v.as_array())
    {
        Some(values) => json_to_vec(values),
        None => Err(Error::EmptyEmbedding),
    }
}

/// Create the appropriate [`EmbeddingProvider`] based on configuration.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"openai"` | [`OpenAIProvider`] |
/// | `"ollama"` | [`OllamaProvider`] |
/// | `"gemini"` | [`GeminiProvider`] |
///
/// # Errors
///
/// Returns an error for unknown provider names, a missing model, or a
/// missing API key.
pub fn create_provider(config: &EmbeddingConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "openai" => Ok(Arc::new(OpenAIProvider::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        "gemini" => Ok(Arc::new(GeminiProvider::new(config)?)),
        other => anyhow::bail!("Unknown embedding provider: {}", other),
    }
}

/// Cosine distance between two vectors: `1 - (a · b) / (‖a‖ × ‖b‖)`.
///
/// Lower is more similar. The result lies in `[0.0, 2.0]`:
/// - `0.0` = same direction
/// - `1.0` = orthogonal
/// - `2.0` = opposite direction
///
/// A zero-magnitude (or empty) vector on either side gives `1.0`. Vectors of
/// different lengths have no defined distance and also give `1.0`.
///
/// ```rust
/// use recipe_index::embedding::cosine_distance;
///
/// assert_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 1.0]), 1.0);
/// assert_eq!(cosine_distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
/// ```
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 1.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    let similarity = (dot / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0);
    1.0 - similarity
}
