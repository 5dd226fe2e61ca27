use std::path::PathBuf;

use crate::classify::error::ClassifyError;

/// Default max sequence length for premise/hypothesis pairs.
pub const CLASSIFY_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
/// Configuration for [`ZeroShotClassifier`](super::ZeroShotClassifier).
pub struct ClassifyConfig {
    /// Local NLI checkpoint directory (config.json, tokenizer.json,
    /// model.safetensors).
    pub model_dir: Option<PathBuf>,
    /// Hub repo id, used when no local directory is configured.
    pub repo_id: Option<String>,
    /// Hypothesis template; `{}` is replaced with the candidate label.
    pub hypothesis_template: String,
    /// Max tokens per premise/hypothesis pair.
    pub max_seq_len: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            repo_id: None,
            hypothesis_template: crate::constants::DEFAULT_HYPOTHESIS_TEMPLATE.to_string(),
            max_seq_len: CLASSIFY_MAX_SEQ_LEN,
            testing_stub: false,
        }
    }
}

impl ClassifyConfig {
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

    /// Creates a stub config (no model files; deterministic lexical scoring).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.is_none() && self.repo_id.is_none() {
            return Err(ClassifyError::InvalidConfig {
                reason: "model_dir or repo_id is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.hypothesis_template.contains("{}") {
            return Err(ClassifyError::InvalidConfig {
                reason: "hypothesis_template must contain a '{}' placeholder".to_string(),
            });
        }

        Ok(())
    }
}
