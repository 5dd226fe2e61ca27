use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Default embedding dimension.
pub const EMBEDDING_DIM: usize = crate::constants::DEFAULT_EMBEDDING_DIM;

/// Default max sequence length.
pub const EMBED_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEmbedder`](super::SentenceEmbedder).
pub struct EmbedConfig {
    /// Local checkpoint directory (config.json, tokenizer.json, model.safetensors).
    pub model_dir: Option<PathBuf>,
    /// Hub repo id, used when no local directory is configured.
    pub repo_id: Option<String>,
    /// Max tokens to consider per text.
    pub max_seq_len: usize,
    /// Output embedding dimension (stub mode; model mode uses the checkpoint's
    /// hidden size).
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            repo_id: None,
            max_seq_len: EMBED_MAX_SEQ_LEN,
            embedding_dim: EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl EmbedConfig {
    /// Creates a config for a local checkpoint directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
            ..Default::default()
        }
    }

    /// Creates a config that downloads a checkpoint from the hub.
    pub fn from_repo<S: Into<String>>(repo_id: S) -> Self {
        Self {
            repo_id: Some(repo_id.into()),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.is_none() && self.repo_id.is_none() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir or repo_id is required (stubbing is disabled)".to_string(),
            });
        }

        if let Some(dir) = &self.model_dir
            && !dir.exists()
        {
            return Err(EmbeddingError::ModelNotFound { path: dir.clone() });
        }

        Ok(())
    }
}
