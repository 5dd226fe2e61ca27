//! Text-generation pipeline.
//!
//! [`TextGenerator`] produces short continuations of a prompt through an
//! external inference provider (the genai chat client). The stub backend
//! echoes the prompt and appends a fixed planning sentence, matching the
//! echo behavior of small causal LMs so downstream prompt-prefix stripping
//! is exercised. Use [`GenConfig::stub`] for tests/examples without provider
//! credentials.

/// Generator configuration.
pub mod config;
mod error;


pub use config::{GEN_MAX_TOKENS, GenConfig};
pub use error::GenerateError;

use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::{debug, warn};

/// Canned continuation appended by the stub backend.
const STUB_CONTINUATION: &str =
    "Pilot with local partners, confirm demand, and train community operators before scaling.";

enum GeneratorBackend {
    Remote { client: Client, model: String },
    Stub,
}

/// Short-text generator (supports stub mode).
pub struct TextGenerator {
    backend: GeneratorBackend,
    config: GenConfig,
}

impl std::fmt::Debug for TextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextGenerator")
            .field(
                "backend",
                &match &self.backend {
                    GeneratorBackend::Remote { model, .. } => format!("Remote({model})"),
                    GeneratorBackend::Stub => "Stub".to_string(),
                },
            )
            .field("max_tokens", &self.config.max_tokens)
            .finish()
    }
}

impl TextGenerator {
    /// Creates the generator from a config (stub mode is supported).
    pub fn new(config: GenConfig) -> Result<Self, GenerateError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Text generator running in STUB mode (testing only)");
            return Ok(Self {
                backend: GeneratorBackend::Stub,
                config,
            });
        }

        // validate() guarantees the model name is present here.
        let model = config.model.clone().unwrap_or_default();

        Ok(Self {
            backend: GeneratorBackend::Remote {
                client: Client::default(),
                model,
            },
            config,
        })
    }

    /// Generates a short continuation of `prompt`.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        debug!(prompt_len = prompt.len(), "Generating continuation");

        match &self.backend {
            GeneratorBackend::Remote { client, model } => {
                let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
                let options = ChatOptions::default().with_max_tokens(self.config.max_tokens);

                let response = client
                    .exec_chat(model, request, Some(&options))
                    .await
                    .map_err(|e| GenerateError::ProviderError {
                        reason: e.to_string(),
                    })?;

                let text = response
                    .first_text()
                    .map(str::to_string)
                    .filter(|t| !t.trim().is_empty())
                    .ok_or(GenerateError::EmptyCompletion)?;

                Ok(text)
            }
            GeneratorBackend::Stub => Ok(format!("{prompt} {STUB_CONTINUATION}")),
        }
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, GeneratorBackend::Stub)
    }

    /// Returns the generator configuration.
    pub fn config(&self) -> &GenConfig {
        &self.config
    }
}
