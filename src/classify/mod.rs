//! Zero-shot classification pipeline.
//!
//! [`ZeroShotClassifier`] scores free text against an arbitrary candidate
//! label set. The model backend phrases the task as natural-language
//! inference: for each label the text is the premise and the hypothesis is
//! the configured template applied to the label; the entailment probability
//! becomes the label score. Use [`ClassifyConfig::stub`] for tests/examples
//! without model files.

/// Classifier configuration.
pub mod config;
mod error;
/// NLI model (BERT + sequence-classification head).
pub mod nli;

#[cfg(test)]
mod tests;

pub use config::{CLASSIFY_MAX_SEQ_LEN, ClassifyConfig};
pub use error::ClassifyError;

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use crate::embedding::device::select_device;
use crate::embedding::utils::ModelFiles;
use nli::NliModel;

/// A candidate label with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

enum ClassifierBackend {
    Model { nli: NliModel },
    Stub,
}

/// Zero-shot classifier over arbitrary candidate labels (supports stub mode).
pub struct ZeroShotClassifier {
    backend: ClassifierBackend,
    config: ClassifyConfig,
}

impl std::fmt::Debug for ZeroShotClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZeroShotClassifier")
            .field(
                "backend",
                &match &self.backend {
                    ClassifierBackend::Model { .. } => "Model",
                    ClassifierBackend::Stub => "Stub",
                },
            )
            .field("hypothesis_template", &self.config.hypothesis_template)
            .finish()
    }
}

impl ZeroShotClassifier {
    /// Loads the classifier from a config (stub mode is supported).
    pub fn load(config: ClassifyConfig) -> Result<Self, ClassifyError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Zero-shot classifier running in STUB mode (testing only)");
            return Ok(Self {
                backend: ClassifierBackend::Stub,
                config,
            });
        }

        let device = select_device().map_err(|e| ClassifyError::ModelLoadFailed {
            reason: e.to_string(),
        })?;
        debug!(?device, "Selected compute device for zero-shot classifier");

        let files = match (&config.model_dir, &config.repo_id) {
            (Some(dir), _) => ModelFiles::from_dir(dir)?,
            (None, Some(repo_id)) => {
                info!(repo_id = %repo_id, "Fetching NLI checkpoint from the hub");
                ModelFiles::fetch(repo_id)?
            }
            (None, None) => unreachable!("validate() requires a model source"),
        };

        let nli = NliModel::load(&files, &device, config.max_seq_len)?;

        info!(
            weights = %files.weights_path.display(),
            entailment_idx = nli.entailment_idx(),
            "NLI model loaded for zero-shot classification"
        );

        Ok(Self {
            backend: ClassifierBackend::Model { nli },
            config,
        })
    }

    /// Scores `text` against the candidate `labels`, sorted by descending score.
    ///
    /// With `multi_label` each label is scored independently in `[0, 1]`;
    /// otherwise the scores form a distribution over the label set.
    pub fn classify(
        &self,
        text: &str,
        labels: &[&str],
        multi_label: bool,
    ) -> Result<Vec<LabelScore>, ClassifyError> {
        if labels.is_empty() {
            return Err(ClassifyError::InvalidInput {
                reason: "candidate label set is empty".to_string(),
            });
        }

        debug!(
            text_len = text.len(),
            num_labels = labels.len(),
            multi_label,
            "Running zero-shot classification"
        );

        let scores = match &self.backend {
            ClassifierBackend::Model { nli } => {
                self.score_with_model(nli, text, labels, multi_label)?
            }
            ClassifierBackend::Stub => Self::score_with_stub(text, labels, multi_label),
        };

        let mut scored: Vec<LabelScore> = labels
            .iter()
            .zip(scores)
            .map(|(label, score)| LabelScore {
                label: (*label).to_string(),
                score,
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        Ok(scored)
    }

    fn score_with_model(
        &self,
        nli: &NliModel,
        text: &str,
        labels: &[&str],
        multi_label: bool,
    ) -> Result<Vec<f32>, ClassifyError> {
        let hypotheses: Vec<String> = labels
            .iter()
            .map(|label| self.config.hypothesis_template.replace("{}", label))
            .collect();
        let pairs: Vec<(&str, &str)> = hypotheses.iter().map(|h| (text, h.as_str())).collect();

        let logits = nli.score_pairs(&pairs)?;
        let entailment_idx = nli.entailment_idx();
        let contradiction_idx = nli.contradiction_idx();

        if multi_label {
            // Per-label softmax over (entailment, contradiction).
            Ok(logits
                .iter()
                .map(|row| {
                    let e = row[entailment_idx];
                    let c = row[contradiction_idx];
                    1.0 / (1.0 + (c - e).exp())
                })
                .collect())
        } else {
            // Softmax of entailment logits across the label set.
            let entailments: Vec<f32> = logits.iter().map(|row| row[entailment_idx]).collect();
            Ok(softmax(&entailments))
        }
    }

    fn score_with_stub(text: &str, labels: &[&str], multi_label: bool) -> Vec<f32> {
        let raw: Vec<f32> = labels
            .iter()
            .map(|label| lexical_overlap_score(text, label))
            .collect();

        if multi_label {
            return raw;
        }

        let sum: f32 = raw.iter().sum();
        if sum <= f32::EPSILON {
            // Nothing matched any label; fall back to a uniform distribution.
            return vec![1.0 / labels.len() as f32; labels.len()];
        }

        raw.iter().map(|s| s / sum).collect()
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, ClassifierBackend::Stub)
    }

    /// Returns the classifier configuration.
    pub fn config(&self) -> &ClassifyConfig {
        &self.config
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

/// Lexical relevance of `candidate` to `text` in `[0, 1]`.
///
/// Stop-word-filtered word overlap (recall/Jaccard blend) through a logistic
/// squash. Deterministic stand-in for entailment scoring in stub mode.
fn lexical_overlap_score(text: &str, candidate: &str) -> f32 {
    use std::collections::HashSet;

    let stop_words: HashSet<&str> = [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has",
        "had", "do", "does", "did", "will", "would", "could", "should", "may", "might", "must",
        "shall", "can", "need", "dare", "ought", "used", "to", "of", "in", "for", "on", "with",
        "at", "by", "from", "as", "into", "through", "during", "before", "after", "above",
        "below", "between", "under", "again", "further", "then", "once", "here", "there",
        "when", "where", "why", "how", "all", "each", "few", "more", "most", "other", "some",
        "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "just",
        "and", "but", "if", "or", "because", "until", "while", "what", "which", "who", "whom",
        "this", "that", "these", "those", "am", "it", "its",
    ]
    .into_iter()
    .collect();

    let text_lower = text.to_lowercase();
    let text_words: HashSet<&str> = text_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !stop_words.contains(w))
        .collect();

    let candidate_lower = candidate.to_lowercase();
    let candidate_words: HashSet<&str> = candidate_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !stop_words.contains(w))
        .collect();

    if text_words.is_empty() || candidate_words.is_empty() {
        let len_ratio = (text.len().min(candidate.len()) as f32)
            / (text.len().max(candidate.len()).max(1) as f32);
        return len_ratio * 0.3;
    }

    let matches = candidate_words.intersection(&text_words).count();
    let recall = matches as f32 / candidate_words.len() as f32;

    let union = candidate_words.union(&text_words).count();
    let jaccard = if union > 0 {
        matches as f32 / union as f32
    } else {
        0.0
    };

    let base_score = 0.6 * recall + 0.4 * jaccard;

    let normalized = 1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp());

    normalized.clamp(0.0, 1.0)
}
