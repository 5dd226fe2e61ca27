//! Sentence-embedding pipeline.
//!
//! [`SentenceEmbedder`] turns free text into unit-normalized vectors, either
//! with a BERT-class encoder ([`bert::BertEncoder`]) or a deterministic stub.
//! Use [`EmbedConfig::stub`] for tests/examples without model files.

/// BERT encoder (mean pooling + L2 norm).
pub mod bert;
/// Embedder configuration.
pub mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Checkpoint file resolution and tokenizer loading helpers.
pub mod utils;


pub use config::{EMBED_MAX_SEQ_LEN, EMBEDDING_DIM, EmbedConfig};
pub use error::EmbeddingError;

use tracing::{debug, info, warn};

use bert::BertEncoder;
use device::select_device;
use utils::ModelFiles;

enum EmbedderBackend {
    Model { encoder: BertEncoder },
    Stub { embedding_dim: usize },
}

/// Embedding generator for semantic retrieval (supports stub mode).
pub struct SentenceEmbedder {
    backend: EmbedderBackend,
    config: EmbedConfig,
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { .. } => "Model",
                    EmbedderBackend::Stub { .. } => "Stub",
                },
            )
            .field("embedding_dim", &self.embedding_dim())
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: EmbedConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence embedder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EmbedderBackend::Stub {
                    embedding_dim: config.embedding_dim,
                },
                config,
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for sentence embedder");

        let files = match (&config.model_dir, &config.repo_id) {
            (Some(dir), _) => ModelFiles::from_dir(dir)?,
            (None, Some(repo_id)) => {
                info!(repo_id = %repo_id, "Fetching embedding checkpoint from the hub");
                ModelFiles::fetch(repo_id)?
            }
            (None, None) => unreachable!("validate() requires a model source"),
        };

        let encoder = BertEncoder::load(&files, &device, config.max_seq_len)?;

        info!(
            weights = %files.weights_path.display(),
            hidden_size = encoder.hidden_size(),
            max_seq_len = config.max_seq_len,
            "Sentence-embedding model loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model { encoder },
            config,
        })
    }

    /// Generates a unit-normalized embedding for a single string.
    ///
    /// Token-free input (e.g. the empty string) embeds to the zero vector
    /// rather than failing.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EmbedderBackend::Model { encoder } => {
                let mut rows = encoder.encode(&[text])?;
                rows.pop().ok_or_else(|| EmbeddingError::InferenceFailed {
                    reason: "encoder returned no rows for a single input".to_string(),
                })
            }
            EmbedderBackend::Stub { embedding_dim } => Ok(Self::embed_stub(text, *embedding_dim)),
        }
    }

    /// Generates embeddings for a batch of strings (one row per input).
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        match &self.backend {
            EmbedderBackend::Model { encoder } => encoder.encode(texts),
            EmbedderBackend::Stub { embedding_dim } => Ok(texts
                .iter()
                .map(|text| Self::embed_stub(text, *embedding_dim))
                .collect()),
        }
    }

    /// Deterministic hashed bag-of-words embedding.
    ///
    /// Each token hashes to a dimension bucket; texts sharing tokens therefore
    /// get positive cosine similarity, and identical texts embed identically.
    fn embed_stub(text: &str, embedding_dim: usize) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        debug!(text_len = text.len(), "Generating stub embedding");

        let mut embedding = vec![0.0f32; embedding_dim];

        let lower = text.to_lowercase();
        for token in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % embedding_dim as u64) as usize;
            embedding[bucket] += 1.0;
        }

        Self::normalize(embedding)
    }

    fn normalize(mut embedding: Vec<f32>) -> Vec<f32> {
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }

        embedding
    }

    /// Returns the output embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        match &self.backend {
            EmbedderBackend::Model { encoder } => encoder.hidden_size(),
            EmbedderBackend::Stub { embedding_dim } => *embedding_dim,
        }
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub { .. })
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }
}
