use crate::generate::error::GenerateError;

/// Default completion-token cap for generated plan snippets.
pub const GEN_MAX_TOKENS: u32 = 60;

#[derive(Debug, Clone)]
/// Configuration for [`TextGenerator`](super::TextGenerator).
pub struct GenConfig {
    /// Provider model name (e.g. `gpt-4o-mini`). Provider credentials come
    /// from the environment, as the genai client resolves them.
    pub model: Option<String>,
    /// Completion-token cap per generation.
    pub max_tokens: u32,
    /// If true, produce deterministic canned continuations (no provider).
    pub testing_stub: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: GEN_MAX_TOKENS,
            testing_stub: false,
        }
    }
}

impl GenConfig {
    /// Creates a config for a provider model.
    pub fn new<S: Into<String>>(model: S) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Creates a stub config (no provider; deterministic continuations).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.testing_stub {
            return Ok(());
        }

        if self.model.as_deref().is_none_or(str::is_empty) {
            return Err(GenerateError::InvalidConfig {
                reason: "a provider model name is required (stubbing is disabled)".to_string(),
            });
        }

        Ok(())
    }
}
