use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer};

use super::error::EmbeddingError;
use super::utils::{ModelFiles, load_tokenizer_with_truncation};

/// BERT-based sentence encoder.
///
/// Wraps a `BertModel` and produces one vector per input text via masked mean
/// pooling over token hidden states, followed by L2 normalization. Compatible
/// with MiniLM/BGE-class sentence-transformer checkpoints.
pub struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    hidden_size: usize,
}

impl BertEncoder {
    /// Loads the encoder from resolved checkpoint files.
    pub fn load(
        files: &ModelFiles,
        device: &Device,
        max_seq_len: usize,
    ) -> Result<Self, EmbeddingError> {
        let config_content = std::fs::read_to_string(&files.config_path)?;
        let config: Config =
            serde_json::from_str(&config_content).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("failed to parse config.json: {e}"),
            })?;

        let mut tokenizer =
            load_tokenizer_with_truncation(&files.tokenizer_path, max_seq_len).map_err(|e| {
                EmbeddingError::TokenizationFailed {
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
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, device)?
        };

        let model = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &config)
        } else {
            BertModel::load(vb, &config)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("failed to construct BERT model: {e}"),
        })?;

        Ok(Self {
            model,
            tokenizer,
            device: device.clone(),
            hidden_size: config.hidden_size,
        })
    }

    /// Returns the encoder output dimension.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Encodes a batch of texts into unit-normalized vectors.
    pub fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self.tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            }
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
        let attention_mask_t =
            Tensor::from_vec(attention_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(token_type_ids, (batch_size, max_len), &self.device)?;

        // Forward pass -> [batch, seq_len, hidden_size]
        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask_t))?;

        // Mean pooling: mask padding tokens, sum, divide by token count.
        let mask_f32 = attention_mask_t.to_dtype(DType::F32)?.unsqueeze(2)?;
        let masked = output.broadcast_mul(&mask_f32)?;
        let summed = masked.sum(1)?;
        let counts = mask_f32.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        // L2 normalize.
        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        let normalized = pooled.broadcast_div(&norms)?;

        Ok(normalized.to_vec2::<f32>()?)
    }
}
