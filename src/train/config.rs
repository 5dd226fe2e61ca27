use std::env;
use std::path::PathBuf;

use crate::train::error::TrainError;

/// Training configuration, mirroring the usual preference-optimization
/// arguments. Defaults are tuned for a short demo run; override with
/// `UPLIFT_TRAIN_*` environment variables.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// JSON preference dataset (array or one record per line).
    pub dataset_path: PathBuf,
    /// Checkpoint output directory.
    pub output_dir: PathBuf,
    /// Optional tokenizer.json; byte-level fallback when absent.
    pub tokenizer_path: Option<PathBuf>,
    /// Fraction of records held out for evaluation.
    pub eval_fraction: f64,
    /// Pairs per micro-batch.
    pub batch_size: usize,
    /// Micro-batches accumulated per optimizer step.
    pub grad_accum_steps: usize,
    /// Passes over the training split.
    pub epochs: usize,
    /// AdamW learning rate.
    pub learning_rate: f64,
    /// DPO temperature.
    pub beta: f64,
    /// Log every N optimizer steps.
    pub logging_steps: usize,
    /// Checkpoint every N optimizer steps.
    pub save_steps: usize,
    /// Max tokens per sequence (prompt + completion).
    pub max_seq_len: usize,
    /// Seed for the deterministic dataset shuffle.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("dataset.json"),
            output_dir: PathBuf::from("dpo-out"),
            tokenizer_path: None,
            eval_fraction: 0.2,
            batch_size: 2,
            grad_accum_steps: 4,
            epochs: 1,
            learning_rate: 1e-5,
            beta: 0.1,
            logging_steps: 10,
            save_steps: 200,
            max_seq_len: crate::constants::DEFAULT_MAX_SEQ_LEN,
            seed: 42,
        }
    }
}

impl TrainConfig {
    const ENV_DATASET: &'static str = "UPLIFT_TRAIN_DATASET";
    const ENV_OUTPUT_DIR: &'static str = "UPLIFT_TRAIN_OUTPUT_DIR";
    const ENV_TOKENIZER: &'static str = "UPLIFT_TRAIN_TOKENIZER";
    const ENV_EPOCHS: &'static str = "UPLIFT_TRAIN_EPOCHS";
    const ENV_LEARNING_RATE: &'static str = "UPLIFT_TRAIN_LEARNING_RATE";
    const ENV_BETA: &'static str = "UPLIFT_TRAIN_BETA";
    const ENV_SEED: &'static str = "UPLIFT_TRAIN_SEED";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            dataset_path: Self::parse_path(Self::ENV_DATASET, defaults.dataset_path.clone()),
            output_dir: Self::parse_path(Self::ENV_OUTPUT_DIR, defaults.output_dir.clone()),
            tokenizer_path: Self::parse_optional_path(Self::ENV_TOKENIZER),
            epochs: Self::parse_number(Self::ENV_EPOCHS, defaults.epochs),
            learning_rate: Self::parse_number(Self::ENV_LEARNING_RATE, defaults.learning_rate),
            beta: Self::parse_number(Self::ENV_BETA, defaults.beta),
            seed: Self::parse_number(Self::ENV_SEED, defaults.seed),
            ..defaults
        }
    }

    /// Validates basic invariants.
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.batch_size == 0 || self.grad_accum_steps == 0 || self.epochs == 0 {
            return Err(TrainError::InvalidConfig {
                reason: "batch_size, grad_accum_steps and epochs must be positive".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.eval_fraction) {
            return Err(TrainError::InvalidConfig {
                reason: format!("eval_fraction {} must be in [0, 1)", self.eval_fraction),
            });
        }
        if self.learning_rate <= 0.0 || self.beta <= 0.0 {
            return Err(TrainError::InvalidConfig {
                reason: "learning_rate and beta must be positive".to_string(),
            });
        }
        if self.max_seq_len < 2 {
            return Err(TrainError::InvalidConfig {
                reason: "max_seq_len must allow at least one predicted token".to_string(),
            });
        }
        Ok(())
    }

    fn parse_path(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_number<T: std::str::FromStr>(var_name: &str, default: T) -> T {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
