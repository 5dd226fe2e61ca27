//! Preference dataset loading, splitting, and tokenization.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;
use tracing::warn;

use super::error::TrainError;

/// One preference record: a prompt with a preferred and a dispreferred
/// completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub prompt: String,
    pub chosen: String,
    pub rejected: String,
}

/// A tokenized pair ready for loss computation. Both sequences are
/// `prompt ++ completion`; `prompt_len` marks where the completion starts.
#[derive(Debug, Clone)]
pub struct TokenizedPair {
    pub chosen_tokens: Vec<u32>,
    pub rejected_tokens: Vec<u32>,
    pub prompt_len: usize,
}

/// Loads preference records from a JSON file.
///
/// Accepts either a top-level array or one JSON object per line.
pub fn load_records(path: &Path) -> Result<Vec<PreferenceRecord>, TrainError> {
    let content = std::fs::read_to_string(path)?;

    let records = match serde_json::from_str::<Vec<PreferenceRecord>>(&content) {
        Ok(records) => records,
        Err(array_err) => {
            let lines: Result<Vec<PreferenceRecord>, _> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(serde_json::from_str)
                .collect();

            lines.map_err(|line_err| TrainError::DatasetParse {
                reason: format!("not a record array ({array_err}) nor JSON lines ({line_err})"),
            })?
        }
    };

    if records.is_empty() {
        return Err(TrainError::EmptyDataset {
            path: path.to_path_buf(),
        });
    }

    Ok(records)
}

/// Deterministic seeded shuffle + split into (train, eval).
///
/// The eval split takes `eval_fraction` of the records (rounded); the train
/// split keeps at least one record.
pub fn train_test_split(
    mut records: Vec<PreferenceRecord>,
    eval_fraction: f64,
    seed: u64,
) -> (Vec<PreferenceRecord>, Vec<PreferenceRecord>) {
    // Fisher-Yates with an LCG keeps the split reproducible without an RNG
    // dependency.
    let mut state = seed.max(1);
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        state
    };

    for i in (1..records.len()).rev() {
        let j = (next() % (i as u64 + 1)) as usize;
        records.swap(i, j);
    }

    let eval_len = ((records.len() as f64) * eval_fraction).round() as usize;
    let eval_len = eval_len.min(records.len().saturating_sub(1));
    let train_len = records.len() - eval_len;

    let eval = records.split_off(train_len);
    (records, eval)
}

/// Token source: a real tokenizer.json or the byte-level fallback.
pub enum Vocab {
    HuggingFace(Box<Tokenizer>),
    Bytes,
}

impl Vocab {
    /// Loads a tokenizer.json.
    pub fn from_tokenizer_file(path: &Path) -> Result<Self, TrainError> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| TrainError::Tokenization {
            reason: format!("failed to load tokenizer from {}: {e}", path.display()),
        })?;
        Ok(Self::HuggingFace(Box::new(tokenizer)))
    }

    /// Byte-level fallback vocabulary (ids 0..=255).
    pub fn bytes() -> Self {
        Self::Bytes
    }

    /// Number of distinct token ids this vocabulary can produce.
    pub fn vocab_size(&self) -> usize {
        match self {
            Self::HuggingFace(tokenizer) => tokenizer.get_vocab_size(true),
            Self::Bytes => 256,
        }
    }

    /// Encodes text without special tokens, so prompt and completion ids
    /// concatenate cleanly.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>, TrainError> {
        match self {
            Self::HuggingFace(tokenizer) => {
                let encoding =
                    tokenizer
                        .encode(text, false)
                        .map_err(|e| TrainError::Tokenization {
                            reason: e.to_string(),
                        })?;
                Ok(encoding.get_ids().to_vec())
            }
            Self::Bytes => Ok(text.bytes().map(u32::from).collect()),
        }
    }
}

/// Tokenizes records into training pairs.
///
/// Pairs whose completions tokenize to nothing, or whose prompt already fills
/// `max_seq_len`, are skipped with a warning. Sequences are truncated to
/// `max_seq_len`.
pub fn tokenize_pairs(
    records: &[PreferenceRecord],
    vocab: &Vocab,
    max_seq_len: usize,
) -> Result<Vec<TokenizedPair>, TrainError> {
    let mut pairs = Vec::with_capacity(records.len());

    for record in records {
        let prompt = vocab.encode(&record.prompt)?;
        let chosen = vocab.encode(&record.chosen)?;
        let rejected = vocab.encode(&record.rejected)?;

        if chosen.is_empty() || rejected.is_empty() {
            warn!(prompt = %record.prompt, "Skipping pair with an empty completion");
            continue;
        }

        if prompt.len() + 1 > max_seq_len {
            warn!(
                prompt_tokens = prompt.len(),
                max_seq_len, "Skipping pair whose prompt leaves no room for a completion"
            );
            continue;
        }

        let mut chosen_tokens = prompt.clone();
        chosen_tokens.extend_from_slice(&chosen);
        chosen_tokens.truncate(max_seq_len);

        let mut rejected_tokens = prompt.clone();
        rejected_tokens.extend_from_slice(&rejected);
        rejected_tokens.truncate(max_seq_len);

        pairs.push(TokenizedPair {
            chosen_tokens,
            rejected_tokens,
            prompt_len: prompt.len(),
        });
    }

    if pairs.is_empty() {
        return Err(TrainError::NoTrainablePairs);
    }

    Ok(pairs)
}
