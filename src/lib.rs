//! Uplift library crate (used by the server, the trainer, and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by module:
//!
//! ## Core Types (Stable)
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`KnowledgeBase`], [`KnowledgeItem`], [`ScoredItem`] - Catalog and retrieval
//!
//! ## Model Pipelines
//! - [`SentenceEmbedder`], [`EmbedConfig`] - Sentence embeddings
//! - [`ZeroShotClassifier`], [`ClassifyConfig`], [`LabelScore`] - Zero-shot classification
//! - [`TextGenerator`], [`GenConfig`] - Short text generation
//!
//! ## HTTP Gateway
//! - [`gateway::create_router_with_state`], [`gateway::AppState`]
//!
//! ## Training
//! - [`train::DpoTrainer`], [`train::TrainConfig`] - Preference-optimization fine-tuning
//!
//! ## Constants
//! Shared defaults (embedding dimension, top-k, confidence bounds) live in
//! [`constants`].
//!
//! Every pipeline supports a deterministic stub backend so the service and its
//! tests can run without model files or network access.

pub mod classify;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod generate;
pub mod knowledge;
pub mod train;

pub use classify::{ClassifyConfig, ClassifyError, LabelScore, ZeroShotClassifier};
pub use config::{Config, ConfigError};
pub use constants::{
    CONFIDENCE_CEILING, CONFIDENCE_FLOOR, DEFAULT_EMBEDDING_DIM, DEFAULT_MAX_SEQ_LEN,
    DEFAULT_TOP_K, SERVICE_NAME,
};
pub use embedding::{EmbedConfig, EmbeddingError, SentenceEmbedder};
pub use generate::{GenConfig, GenerateError, TextGenerator};
pub use knowledge::{KnowledgeBase, KnowledgeError, KnowledgeItem, ScoredItem, catalog};
