//! Preference-optimization fine-tuning.
//!
//! Standalone training path used by the `uplift-train` binary: load a JSON
//! preference dataset, split it, tokenize, and fine-tune a small causal LM
//! with the DPO objective. Nothing here is used by the serving path.

/// Training configuration.
pub mod config;
/// Dataset loading, splitting, tokenization.
pub mod dataset;
/// DPO objective and trainer.
pub mod dpo;
mod error;
/// Trainable causal LM.
pub mod model;


pub use config::TrainConfig;
pub use dataset::{PreferenceRecord, TokenizedPair, Vocab, load_records, tokenize_pairs, train_test_split};
pub use dpo::{DpoTrainer, EvalMetrics, TrainSummary, completion_log_prob, dpo_loss};
pub use error::TrainError;
pub use model::{CausalLm, ModelConfig};
