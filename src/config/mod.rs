//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `UPLIFT_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `UPLIFT_*` overrides on top of defaults.
/// Unconfigured model pipelines run in deterministic stub mode; the server
/// logs a warning for each one at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Local directory holding the sentence-embedding checkpoint
    /// (config.json, tokenizer.json, model.safetensors).
    pub embed_model_dir: Option<PathBuf>,

    /// Hugging Face Hub repo id for the sentence-embedding checkpoint,
    /// used when no local directory is configured.
    pub embed_model_repo: Option<String>,

    /// Local directory holding the NLI checkpoint for zero-shot
    /// classification.
    pub nli_model_dir: Option<PathBuf>,

    /// Hub repo id for the NLI checkpoint.
    pub nli_model_repo: Option<String>,

    /// Provider model name for text generation (e.g. `gpt-4o-mini`).
    pub gen_model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            embed_model_dir: None,
            embed_model_repo: None,
            nli_model_dir: None,
            nli_model_repo: None,
            gen_model: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "UPLIFT_PORT";
    const ENV_BIND_ADDR: &'static str = "UPLIFT_BIND_ADDR";
    const ENV_EMBED_MODEL_DIR: &'static str = "UPLIFT_EMBED_MODEL_DIR";
    const ENV_EMBED_MODEL_REPO: &'static str = "UPLIFT_EMBED_MODEL_REPO";
    const ENV_NLI_MODEL_DIR: &'static str = "UPLIFT_NLI_MODEL_DIR";
    const ENV_NLI_MODEL_REPO: &'static str = "UPLIFT_NLI_MODEL_REPO";
    const ENV_GEN_MODEL: &'static str = "UPLIFT_GEN_MODEL";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let embed_model_dir = Self::parse_optional_path_from_env(Self::ENV_EMBED_MODEL_DIR);
        let embed_model_repo = Self::parse_optional_string_from_env(Self::ENV_EMBED_MODEL_REPO);
        let nli_model_dir = Self::parse_optional_path_from_env(Self::ENV_NLI_MODEL_DIR);
        let nli_model_repo = Self::parse_optional_string_from_env(Self::ENV_NLI_MODEL_REPO);
        let gen_model = Self::parse_optional_string_from_env(Self::ENV_GEN_MODEL);

        Ok(Self {
            port,
            bind_addr,
            embed_model_dir,
            embed_model_repo,
            nli_model_dir,
            nli_model_repo,
            gen_model,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.embed_model_dir, &self.nli_model_dir]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
