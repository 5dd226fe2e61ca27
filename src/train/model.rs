//! Small GPT-style causal language model, trainable through a `VarMap`.

use candle_core::{D, Device, Tensor};
use candle_nn::ops::softmax_last_dim;
use candle_nn::{Embedding, LayerNorm, Linear, Module, VarBuilder, embedding, layer_norm, linear};
use serde::{Deserialize, Serialize};

use super::error::TrainError;

/// Decoder hyperparameters. The defaults give a deliberately tiny model; the
/// architecture itself is the standard pre-norm decoder stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub num_heads: usize,
    pub max_position: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vocab_size: 256,
            hidden_size: 128,
            num_layers: 4,
            num_heads: 4,
            max_position: 512,
        }
    }
}

impl ModelConfig {
    /// Validates shape invariants.
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.vocab_size == 0 || self.num_layers == 0 || self.max_position == 0 {
            return Err(TrainError::InvalidConfig {
                reason: "vocab_size, num_layers and max_position must be positive".to_string(),
            });
        }
        if self.num_heads == 0 || !self.hidden_size.is_multiple_of(self.num_heads) {
            return Err(TrainError::InvalidConfig {
                reason: format!(
                    "hidden_size {} must be divisible by num_heads {}",
                    self.hidden_size, self.num_heads
                ),
            });
        }
        Ok(())
    }
}

struct CausalSelfAttention {
    qkv: Linear,
    proj: Linear,
    num_heads: usize,
    head_dim: usize,
}

impl CausalSelfAttention {
    fn new(config: &ModelConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let hidden = config.hidden_size;
        Ok(Self {
            qkv: linear(hidden, 3 * hidden, vb.pp("qkv"))?,
            proj: linear(hidden, hidden, vb.pp("proj"))?,
            num_heads: config.num_heads,
            head_dim: hidden / config.num_heads,
        })
    }

    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let (b, t, hidden) = x.dims3()?;

        let qkv = self.qkv.forward(x)?;
        let q = qkv.narrow(2, 0, hidden)?;
        let k = qkv.narrow(2, hidden, hidden)?;
        let v = qkv.narrow(2, 2 * hidden, hidden)?;

        let split = |tensor: Tensor| -> candle_core::Result<Tensor> {
            tensor
                .reshape((b, t, self.num_heads, self.head_dim))?
                .transpose(1, 2)?
                .contiguous()
        };
        let q = split(q)?;
        let k = split(k)?;
        let v = split(v)?;

        let scale = 1.0 / (self.head_dim as f64).sqrt();
        let att = (q.matmul(&k.transpose(D::Minus2, D::Minus1)?)? * scale)?;

        let mask = causal_mask(t, att.device())?.broadcast_as(att.shape())?;
        let att = masked_fill(&att, &mask, f32::NEG_INFINITY)?;
        let att = softmax_last_dim(&att)?;

        let y = att.matmul(&v)?;
        let y = y.transpose(1, 2)?.reshape((b, t, hidden))?;
        self.proj.forward(&y)
    }
}

struct Mlp {
    fc: Linear,
    proj: Linear,
}

impl Mlp {
    fn new(config: &ModelConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let hidden = config.hidden_size;
        Ok(Self {
            fc: linear(hidden, 4 * hidden, vb.pp("fc"))?,
            proj: linear(4 * hidden, hidden, vb.pp("proj"))?,
        })
    }

    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        self.proj.forward(&self.fc.forward(x)?.gelu()?)
    }
}

struct Block {
    ln1: LayerNorm,
    attn: CausalSelfAttention,
    ln2: LayerNorm,
    mlp: Mlp,
}

impl Block {
    fn new(config: &ModelConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        Ok(Self {
            ln1: layer_norm(config.hidden_size, 1e-5, vb.pp("ln1"))?,
            attn: CausalSelfAttention::new(config, vb.pp("attn"))?,
            ln2: layer_norm(config.hidden_size, 1e-5, vb.pp("ln2"))?,
            mlp: Mlp::new(config, vb.pp("mlp"))?,
        })
    }

    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let x = (x + self.attn.forward(&self.ln1.forward(x)?)?)?;
        let x = (&x + self.mlp.forward(&self.ln2.forward(&x)?)?)?;
        Ok(x)
    }
}

/// Causal LM: token + position embeddings, pre-norm decoder blocks, LM head.
pub struct CausalLm {
    wte: Embedding,
    wpe: Embedding,
    blocks: Vec<Block>,
    ln_f: LayerNorm,
    lm_head: Linear,
    config: ModelConfig,
}

impl CausalLm {
    /// Builds the model under `vb`; with a `VarMap`-backed builder the
    /// parameters are trainable.
    pub fn new(config: ModelConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let hidden = config.hidden_size;

        let wte = embedding(config.vocab_size, hidden, vb.pp("wte"))?;
        let wpe = embedding(config.max_position, hidden, vb.pp("wpe"))?;

        let mut blocks = Vec::with_capacity(config.num_layers);
        for i in 0..config.num_layers {
            blocks.push(Block::new(&config, vb.pp(format!("h.{i}")))?);
        }

        let ln_f = layer_norm(hidden, 1e-5, vb.pp("ln_f"))?;
        let lm_head = linear(hidden, config.vocab_size, vb.pp("lm_head"))?;

        Ok(Self {
            wte,
            wpe,
            blocks,
            ln_f,
            lm_head,
            config,
        })
    }

    /// Returns next-token logits of shape `[batch, seq_len, vocab_size]`.
    pub fn forward(&self, input_ids: &Tensor) -> candle_core::Result<Tensor> {
        let (_batch, seq_len) = input_ids.dims2()?;
        if seq_len > self.config.max_position {
            candle_core::bail!(
                "sequence length {seq_len} exceeds max_position {}",
                self.config.max_position
            );
        }

        let positions = Tensor::arange(0u32, seq_len as u32, input_ids.device())?;
        let pos_emb = self.wpe.forward(&positions)?;

        let mut x = self.wte.forward(input_ids)?.broadcast_add(&pos_emb)?;
        for block in &self.blocks {
            x = block.forward(&x)?;
        }
        let x = self.ln_f.forward(&x)?;

        self.lm_head.forward(&x)
    }

    /// Returns the model hyperparameters.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

/// Upper-triangular mask: 1 where position `j` is in the future of `i`.
fn causal_mask(seq_len: usize, device: &Device) -> candle_core::Result<Tensor> {
    let mask: Vec<u8> = (0..seq_len)
        .flat_map(|i| (0..seq_len).map(move |j| u8::from(j > i)))
        .collect();
    Tensor::from_slice(&mask, (seq_len, seq_len), device)
}

fn masked_fill(on_false: &Tensor, mask: &Tensor, on_true: f32) -> candle_core::Result<Tensor> {
    let shape = mask.shape();
    let on_true = Tensor::new(on_true, on_false.device())?.broadcast_as(shape.dims())?;
    mask.where_cond(&on_true, on_false)
}
