//! DPO objective and training loop.

use candle_core::{D, DType, Device, Tensor};
use candle_nn::ops::log_softmax;
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use tracing::{debug, info};

use super::config::TrainConfig;
use super::dataset::TokenizedPair;
use super::error::TrainError;
use super::model::{CausalLm, ModelConfig};

/// Evaluation metrics over a preference split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalMetrics {
    /// Mean DPO loss.
    pub mean_loss: f32,
    /// Fraction of pairs where the policy assigns the chosen completion a
    /// higher log-probability than the rejected one.
    pub preference_accuracy: f32,
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    /// Optimizer steps taken.
    pub steps: usize,
    /// Loss at the last optimizer step.
    pub final_loss: f32,
    /// Metrics from the last epoch's evaluation, if an eval split was given.
    pub eval: Option<EvalMetrics>,
}

/// Log-probability of the completion tokens of `tokens` under `model`.
///
/// `tokens` is `prompt ++ completion`; positions predicting prompt tokens are
/// masked out, so only the completion contributes.
pub fn completion_log_prob(
    model: &CausalLm,
    tokens: &[u32],
    prompt_len: usize,
    device: &Device,
) -> Result<Tensor, TrainError> {
    let seq_len = tokens.len();
    if seq_len < 2 {
        return Err(TrainError::Tokenization {
            reason: format!("sequence of {seq_len} tokens has nothing to predict"),
        });
    }

    let input = Tensor::from_slice(&tokens[..seq_len - 1], (1, seq_len - 1), device)?;
    let targets = Tensor::from_slice(&tokens[1..], (1, seq_len - 1), device)?;

    let logits = model.forward(&input)?;
    let log_probs = log_softmax(&logits, D::Minus1)?;

    let picked = log_probs
        .gather(&targets.unsqueeze(D::Minus1)?, D::Minus1)?
        .squeeze(D::Minus1)?;

    // Position i predicts token i + 1; completion tokens start at prompt_len.
    let mask: Vec<f32> = (0..seq_len - 1)
        .map(|i| if i + 1 >= prompt_len { 1.0 } else { 0.0 })
        .collect();
    let mask = Tensor::from_slice(&mask, (1, seq_len - 1), device)?;

    Ok(picked.mul(&mask)?.sum_all()?)
}

/// DPO loss: `-log sigmoid(beta * ((pc - rc) - (pr - rr)))`.
///
/// Computed as a numerically stable softplus; ln 2 at zero margin, strictly
/// decreasing as the chosen margin grows.
pub fn dpo_loss(
    policy_chosen: &Tensor,
    policy_rejected: &Tensor,
    reference_chosen: &Tensor,
    reference_rejected: &Tensor,
    beta: f64,
) -> Result<Tensor, TrainError> {
    let chosen_ratio = (policy_chosen - reference_chosen)?;
    let rejected_ratio = (policy_rejected - reference_rejected)?;
    let margin = ((chosen_ratio - rejected_ratio)? * beta)?;

    // softplus(-margin) = relu(-margin) + ln(1 + e^{-|margin|})
    let neg = margin.neg()?;
    let loss = (neg.relu()? + (neg.abs()?.neg()?.exp()? + 1.0)?.log()?)?;

    Ok(loss)
}

/// Preference-optimization trainer.
///
/// The reference log-probabilities are the detached policy values, which is
/// what configuring the policy itself as the reference model degenerates to.
pub struct DpoTrainer {
    varmap: VarMap,
    model: CausalLm,
    optimizer: AdamW,
    config: TrainConfig,
    model_config: ModelConfig,
    device: Device,
    global_step: usize,
}

impl DpoTrainer {
    /// Builds a fresh model and optimizer on `device`.
    pub fn new(
        config: TrainConfig,
        model_config: ModelConfig,
        device: Device,
    ) -> Result<Self, TrainError> {
        config.validate()?;
        model_config.validate()?;

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = CausalLm::new(model_config.clone(), vb)?;

        let optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: config.learning_rate,
                ..Default::default()
            },
        )?;

        info!(
            vocab_size = model_config.vocab_size,
            hidden_size = model_config.hidden_size,
            num_layers = model_config.num_layers,
            lr = config.learning_rate,
            beta = config.beta,
            "DPO trainer initialized"
        );

        Ok(Self {
            varmap,
            model,
            optimizer,
            config,
            model_config,
            device,
            global_step: 0,
        })
    }

    /// Runs the configured number of epochs over `train_pairs`, evaluating on
    /// `eval_pairs` after each epoch, and writes a final checkpoint.
    pub fn train(
        &mut self,
        train_pairs: &[TokenizedPair],
        eval_pairs: &[TokenizedPair],
    ) -> Result<TrainSummary, TrainError> {
        if train_pairs.is_empty() {
            return Err(TrainError::NoTrainablePairs);
        }

        let pairs_per_step = self.config.batch_size * self.config.grad_accum_steps;
        let mut final_loss = f32::NAN;
        let mut last_eval = None;

        for epoch in 0..self.config.epochs {
            for group in train_pairs.chunks(pairs_per_step) {
                let mut losses = Vec::with_capacity(group.len());
                for pair in group {
                    losses.push(self.pair_loss(pair)?);
                }

                let loss = Tensor::stack(&losses, 0)?.mean_all()?;
                self.optimizer.backward_step(&loss)?;
                self.global_step += 1;

                final_loss = loss.to_scalar::<f32>()?;

                if self.global_step.is_multiple_of(self.config.logging_steps) {
                    info!(
                        epoch,
                        step = self.global_step,
                        loss = final_loss,
                        "Training step"
                    );
                } else {
                    debug!(
                        epoch,
                        step = self.global_step,
                        loss = final_loss,
                        "Training step"
                    );
                }

                if self.global_step.is_multiple_of(self.config.save_steps) {
                    self.save()?;
                }
            }

            if !eval_pairs.is_empty() {
                let metrics = self.evaluate(eval_pairs)?;
                info!(
                    epoch,
                    eval_loss = metrics.mean_loss,
                    preference_accuracy = metrics.preference_accuracy,
                    "Epoch evaluation"
                );
                last_eval = Some(metrics);
            }
        }

        self.save()?;

        Ok(TrainSummary {
            steps: self.global_step,
            final_loss,
            eval: last_eval,
        })
    }

    /// Mean loss and preference accuracy over `pairs` (no parameter updates).
    pub fn evaluate(&self, pairs: &[TokenizedPair]) -> Result<EvalMetrics, TrainError> {
        if pairs.is_empty() {
            return Err(TrainError::NoTrainablePairs);
        }

        let mut total_loss = 0.0f32;
        let mut preferred = 0usize;

        for pair in pairs {
            let policy_chosen = completion_log_prob(
                &self.model,
                &pair.chosen_tokens,
                pair.prompt_len,
                &self.device,
            )?;
            let policy_rejected = completion_log_prob(
                &self.model,
                &pair.rejected_tokens,
                pair.prompt_len,
                &self.device,
            )?;

            let reference_chosen = policy_chosen.detach();
            let reference_rejected = policy_rejected.detach();

            let loss = dpo_loss(
                &policy_chosen,
                &policy_rejected,
                &reference_chosen,
                &reference_rejected,
                self.config.beta,
            )?;
            total_loss += loss.to_scalar::<f32>()?;

            if policy_chosen.to_scalar::<f32>()? > policy_rejected.to_scalar::<f32>()? {
                preferred += 1;
            }
        }

        Ok(EvalMetrics {
            mean_loss: total_loss / pairs.len() as f32,
            preference_accuracy: preferred as f32 / pairs.len() as f32,
        })
    }

    fn pair_loss(&self, pair: &TokenizedPair) -> Result<Tensor, TrainError> {
        let policy_chosen = completion_log_prob(
            &self.model,
            &pair.chosen_tokens,
            pair.prompt_len,
            &self.device,
        )?;
        let policy_rejected = completion_log_prob(
            &self.model,
            &pair.rejected_tokens,
            pair.prompt_len,
            &self.device,
        )?;

        let reference_chosen = policy_chosen.detach();
        let reference_rejected = policy_rejected.detach();

        dpo_loss(
            &policy_chosen,
            &policy_rejected,
            &reference_chosen,
            &reference_rejected,
            self.config.beta,
        )
    }

    /// Writes the checkpoint (safetensors weights + model config JSON).
    pub fn save(&self) -> Result<(), TrainError> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        self.varmap
            .save(self.config.output_dir.join("model.safetensors"))?;

        let config_json = serde_json::to_string_pretty(&self.model_config).map_err(|e| {
            TrainError::InvalidConfig {
                reason: format!("failed to serialize model config: {e}"),
            }
        })?;
        std::fs::write(self.config.output_dir.join("config.json"), config_json)?;

        debug!(output_dir = %self.config.output_dir.display(), "Checkpoint written");
        Ok(())
    }

    /// Returns the model being trained.
    pub fn model(&self) -> &CausalLm {
        &self.model
    }

    /// Optimizer steps taken so far.
    pub fn global_step(&self) -> usize {
        self.global_step
    }
}
