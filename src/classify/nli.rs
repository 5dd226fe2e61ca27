use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer};

use super::error::ClassifyError;
use crate::embedding::utils::{ModelFiles, load_tokenizer_with_truncation};

struct BertForSequenceClassificationImpl {
    bert: BertModel,
    pooler: Option<Linear>,
    classifier: Linear,
}

impl BertForSequenceClassificationImpl {
    fn load(vb: VarBuilder, config: &Config, num_labels: usize) -> candle_core::Result<Self> {
        let (bert, pooler_vb) = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            (BertModel::load(vb.pp("bert"), config)?, vb.pp("bert").pp("pooler"))
        } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
            (
                BertModel::load(vb.pp("roberta"), config)?,
                vb.pp("roberta").pp("pooler"),
            )
        } else {
            (BertModel::load(vb.clone(), config)?, vb.pp("pooler"))
        };

        let hidden_size = config.hidden_size;

        // Sequence-classification checkpoints carry a tanh pooler between the
        // CLS hidden state and the classifier head; some distilled ones drop it.
        let pooler = if pooler_vb.contains_tensor("dense.weight") {
            Some(candle_nn::linear(
                hidden_size,
                hidden_size,
                pooler_vb.pp("dense"),
            )?)
        } else {
            None
        };

        let classifier = candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))?;

        Ok(Self {
            bert,
            pooler,
            classifier,
        })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> candle_core::Result<Tensor> {
        let output = self
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;

        let pooled = match &self.pooler {
            Some(pooler) => pooler.forward(&cls_token)?.tanh()?,
            None => cls_token,
        };

        self.classifier.forward(&pooled)
    }
}

/// NLI model used for zero-shot classification.
///
/// Classifies premise-hypothesis pairs into the checkpoint's NLI labels;
/// the entailment/contradiction indices are parsed from `id2label` in
/// config.json.
pub struct NliModel {
    model: BertForSequenceClassificationImpl,
    tokenizer: Tokenizer,
    device: Device,
    entailment_idx: usize,
    contradiction_idx: usize,
}

impl NliModel {
    /// Loads the NLI model from resolved checkpoint files.
    pub fn load(
        files: &ModelFiles,
        device: &Device,
        max_seq_len: usize,
    ) -> Result<Self, ClassifyError> {
        let config_content = std::fs::read_to_string(&files.config_path).map_err(|e| {
            ClassifyError::ModelLoadFailed {
                reason: format!("failed to read config.json: {e}"),
            }
        })?;
        let config: Config =
            serde_json::from_str(&config_content).map_err(|e| ClassifyError::ModelLoadFailed {
                reason: format!("failed to parse config.json: {e}"),
            })?;

        let config_json: serde_json::Value =
            serde_json::from_str(&config_content).map_err(|e| ClassifyError::ModelLoadFailed {
                reason: format!("failed to parse config.json: {e}"),
            })?;
        let id2label = config_json
            .get("id2label")
            .and_then(|v| v.as_object())
            .ok_or_else(|| ClassifyError::ModelLoadFailed {
                reason: "config.json missing id2label mapping".to_string(),
            })?;

        let find_label = |name: &'static str| {
            id2label
                .iter()
                .find_map(|(k, v)| {
                    let label = v.as_str()?;
                    if label.eq_ignore_ascii_case(name) {
                        k.parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .ok_or(ClassifyError::MissingNliLabel { label: name })
        };

        let entailment_idx = find_label("entailment")?;
        let contradiction_idx = find_label("contradiction")?;
        let num_labels = id2label.len();

        let mut tokenizer =
            load_tokenizer_with_truncation(&files.tokenizer_path, max_seq_len).map_err(|e| {
                ClassifyError::TokenizationFailed {
                    reason: format!("failed to load tokenizer: {e}"),
                }
            })?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        // SAFETY: mmap'd safetensors file, safe as long as the file is not
        // modified while the model is in use.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, device)
                .map_err(|e| ClassifyError::ModelLoadFailed {
                    reason: format!("failed to load weights: {e}"),
                })?
        };

        let model = BertForSequenceClassificationImpl::load(vb, &config, num_labels).map_err(
            |e| ClassifyError::ModelLoadFailed {
                reason: format!("failed to construct NLI model: {e}"),
            },
        )?;

        Ok(Self {
            model,
            tokenizer,
            device: device.clone(),
            entailment_idx,
            contradiction_idx,
        })
    }

    /// Index of the entailment label in the logits.
    pub fn entailment_idx(&self) -> usize {
        self.entailment_idx
    }

    /// Index of the contradiction label in the logits.
    pub fn contradiction_idx(&self) -> usize {
        self.contradiction_idx
    }

    /// Scores premise-hypothesis pairs, returning one logits row per pair.
    pub fn score_pairs(&self, pairs: &[(&str, &str)]) -> Result<Vec<Vec<f32>>, ClassifyError> {
        if pairs.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(pairs.to_vec(), true)
            .map_err(|e| ClassifyError::TokenizationFailed {
                reason: e.to_string(),
            })?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let input_ids: Vec<u32> = encodings.iter().flat_map(|e| e.get_ids().to_vec()).collect();
        let attention_mask: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_attention_mask().to_vec())
            .collect();
        let token_type_ids: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_type_ids().to_vec())
            .collect();

        let input_ids = Tensor::from_vec(input_ids, (batch_size, max_len), &self.device)?;
        let attention_mask =
            Tensor::from_vec(attention_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(token_type_ids, (batch_size, max_len), &self.device)?;

        let logits = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| ClassifyError::InferenceFailed {
                reason: e.to_string(),
            })?;

        Ok(logits.to_vec2::<f32>()?)
    }
}
