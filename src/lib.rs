//! # Recipe Index
//!
//! Embedding index and nearest-neighbour search for a fixed recipe corpus.
//!
//! A reset embeds every recipe in the corpus through a remote embedding
//! provider and writes the vectors to a flat JSON store. A search embeds the
//! query with the same provider, scores it against every stored vector by
//! cosine distance, and returns the closest recipes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ recipes.json │──▶│   rebuild    │──▶│ embeddings.json│
//! │   (corpus)   │   │ embed each   │   │ (vector store) │
//! └──────┬───────┘   └──────┬───────┘   └───────┬────────┘
//!        │                  │ provider          │
//!        │                  ▼                   │
//!        │           ┌──────────────┐           │
//!        └──────────▶│    search    │◀──────────┘
//!                    │ cosine top-k │
//!                    └──────┬───────┘
//!                  ┌────────┴────────┐
//!                  ▼                 ▼
//!             ┌─────────┐      ┌──────────┐
//!             │   CLI   │      │   HTTP   │
//!             └─────────┘      └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! recipe-index reset                 # embed the corpus
//! recipe-index search "tomato soup"  # top 3 matches
//! recipe-index serve                 # GET /reset, GET /search?q=...
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error categories |
//! | [`models`] | Core data types |
//! | [`corpus`] | Corpus loading and embedding text |
//! | [`store`] | Vector store persistence |
//! | [`embedding`] | Embedding providers and cosine distance |
//! | [`progress`] | Reset progress events and reporters |
//! | [`rebuild`] | Vector store regeneration |
//! | [`search`] | Nearest-neighbour search |
//! | [`server`] | HTTP server |

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod models;
pub mod progress;
pub mod rebuild;
pub mod search;
pub mod server;
pub mod store;
