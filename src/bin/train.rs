//! Standalone preference-optimization fine-tuning.
//!
//! No CLI surface: reads the local dataset file and writes a checkpoint
//! directory, with `UPLIFT_TRAIN_*` environment overrides for the few knobs
//! the run exposes.

use tracing::{info, warn};

use uplift::embedding::device::select_device;
use uplift::train::{
    DpoTrainer, ModelConfig, TrainConfig, Vocab, load_records, tokenize_pairs, train_test_split,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = TrainConfig::from_env();
    config.validate()?;

    info!(
        dataset = %config.dataset_path.display(),
        output_dir = %config.output_dir.display(),
        epochs = config.epochs,
        "Starting preference-optimization run"
    );

    let records = load_records(&config.dataset_path)?;
    let (train_records, eval_records) =
        train_test_split(records, config.eval_fraction, config.seed);
    info!(
        train = train_records.len(),
        eval = eval_records.len(),
        "Dataset split"
    );

    let vocab = match &config.tokenizer_path {
        Some(path) => Vocab::from_tokenizer_file(path)?,
        None => {
            warn!("No tokenizer configured, falling back to the byte-level vocabulary");
            Vocab::bytes()
        }
    };

    let train_pairs = tokenize_pairs(&train_records, &vocab, config.max_seq_len)?;
    let eval_pairs = if eval_records.is_empty() {
        Vec::new()
    } else {
        tokenize_pairs(&eval_records, &vocab, config.max_seq_len)?
    };

    let device = select_device()?;
    let model_config = ModelConfig {
        vocab_size: vocab.vocab_size(),
        ..Default::default()
    };

    let mut trainer = DpoTrainer::new(config.clone(), model_config, device)?;
    let summary = trainer.train(&train_pairs, &eval_pairs)?;

    info!(
        steps = summary.steps,
        final_loss = summary.final_loss,
        eval_loss = summary.eval.map(|m| m.mean_loss),
        "Training complete, checkpoint written to {}",
        config.output_dir.display()
    );

    Ok(())
}
