use std::io;
use std::path::{Path, PathBuf};

use tokenizers::Tokenizer;

use super::error::EmbeddingError;

/// Resolved locations of the three files every checkpoint directory carries.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub weights_path: PathBuf,
}

impl ModelFiles {
    /// Resolves model files inside a local checkpoint directory.
    pub fn from_dir(dir: &Path) -> Result<Self, EmbeddingError> {
        if !dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: dir.to_path_buf(),
            });
        }

        let files = Self {
            config_path: dir.join("config.json"),
            tokenizer_path: dir.join("tokenizer.json"),
            weights_path: dir.join("model.safetensors"),
        };

        for path in [&files.config_path, &files.tokenizer_path, &files.weights_path] {
            if !path.is_file() {
                return Err(EmbeddingError::ModelNotFound { path: path.clone() });
            }
        }

        Ok(files)
    }

    /// Downloads model files from the Hugging Face Hub.
    ///
    /// Files are cached under `~/.cache/huggingface/hub/`, so repeated starts
    /// hit the network only when the checkpoint changed.
    pub fn fetch(repo_id: &str) -> Result<Self, EmbeddingError> {
        let api =
            hf_hub::api::sync::Api::new().map_err(|e| EmbeddingError::HubFetchFailed {
                reason: format!("failed to initialize hub API: {e}"),
            })?;
        let repo = api.model(repo_id.to_string());

        let get = |file: &str| {
            repo.get(file).map_err(|e| EmbeddingError::HubFetchFailed {
                reason: format!("failed to download {file} from {repo_id}: {e}"),
            })
        };

        Ok(Self {
            config_path: get("config.json")?,
            tokenizer_path: get("tokenizer.json")?,
            weights_path: get("model.safetensors")?,
        })
    }
}

/// Loads a tokenizer from an explicit tokenizer.json path.
pub fn load_tokenizer(tokenizer_path: &Path) -> io::Result<Tokenizer> {
    Tokenizer::from_file(tokenizer_path).map_err(io::Error::other)
}

/// Loads a tokenizer with truncation enabled for a maximum sequence length.
///
/// Inputs exceeding `max_len` tokens are truncated to fit the encoder.
pub fn load_tokenizer_with_truncation(
    tokenizer_path: &Path,
    max_len: usize,
) -> io::Result<Tokenizer> {
    use tokenizers::TruncationParams;

    let mut tokenizer = load_tokenizer(tokenizer_path)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}
