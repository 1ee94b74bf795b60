//! TOML configuration with environment overrides.
//!
//! Every section has built-in defaults, so an empty file (or no file at all)
//! yields a runnable configuration. The LLM credentials never live in the
//! file: the API key is read from `GROQ_API_KEY`, and `GROQ_MODEL` overrides
//! `[llm].model`.
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8000"
//!
//! [knowledge]
//! path = "data/knowledge_base.json"
//! collection_key = "insurance_faq"
//!
//! [llm]
//! model = "llama-3.1-8b-instant"
//! timeout_secs = 30
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";
/// Environment variable overriding `[llm].model`.
pub const MODEL_ENV: &str = "GROQ_MODEL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Name reported by `GET /health`.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            service_name: default_service_name(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_service_name() -> String {
    "HELLO ServAI backend v2".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct KnowledgeConfig {
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,
    /// Top-level JSON key holding the list of entries.
    #[serde(default = "default_collection_key")]
    pub collection_key: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            collection_key: default_collection_key(),
        }
    }
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("data/knowledge_base.json")
}
fn default_collection_key() -> String {
    "insurance_faq".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl LlmConfig {
    /// Reads the provider API key from the environment.
    ///
    /// Commands that talk to the LLM call this before doing anything else,
    /// so a missing key stops the process at startup.
    pub fn api_key_from_env(&self) -> Result<String> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => bail!("{} is not set in environment variables", API_KEY_ENV),
        }
    }
}

impl Config {
    /// Applies environment overrides on top of file values.
    fn apply_env(&mut self) {
        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                self.llm.model = model;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            bail!("server.bind must not be empty");
        }
        if self.knowledge.collection_key.trim().is_empty() {
            bail!("knowledge.collection_key must not be empty");
        }
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be > 0");
        }
        Ok(())
    }
}

/// Parses configuration from TOML text, then applies environment overrides.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Resolves the configuration for the CLI.
///
/// An explicit path must exist. Without one, `default_path` is used when
/// present and built-in defaults otherwise.
pub fn resolve_config(explicit: Option<&Path>, default_path: &Path) -> Result<Config> {
    match explicit {
        Some(path) => load_config(path),
        None if default_path.exists() => load_config(default_path),
        None => {
            tracing::debug!(
                path = %default_path.display(),
                "no config file found, using built-in defaults"
            );
            parse_config("")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_empty_config_uses_defaults() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::remove_var(MODEL_ENV);

        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8000");
        assert_eq!(cfg.server.service_name, "HELLO ServAI backend v2");
        assert_eq!(cfg.knowledge.path, PathBuf::from("data/knowledge_base.json"));
        assert_eq!(cfg.knowledge.collection_key, "insurance_faq");
        assert_eq!(cfg.llm.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.llm.timeout_secs, 30);
    }

    #[test]
    fn test_default_knowledge_path_ships_with_crate() {
        let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join(default_knowledge_path());
        let kb = crate::knowledge::load_from_path(&shipped, &default_collection_key()).unwrap();
        assert!(!kb.is_empty());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::remove_var(MODEL_ENV);

        let cfg = parse_config(
            r#"
[server]
bind = "127.0.0.1:9000"

[knowledge]
path = "/srv/faq.json"
collection_key = "faq"

[llm]
model = "llama-3.3-70b-versatile"
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
        assert_eq!(cfg.knowledge.path, PathBuf::from("/srv/faq.json"));
        assert_eq!(cfg.knowledge.collection_key, "faq");
        assert_eq!(cfg.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(cfg.llm.timeout_secs, 5);
    }

    #[test]
    fn test_model_env_overrides_file() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::set_var(MODEL_ENV, "gemma2-9b-it");

        let cfg = parse_config("[llm]\nmodel = \"from-file\"\n").unwrap();
        assert_eq!(cfg.llm.model, "gemma2-9b-it");

        std::env::remove_var(MODEL_ENV);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::remove_var(MODEL_ENV);

        let err = parse_config("[llm]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_empty_bind_rejected() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::remove_var(MODEL_ENV);

        let err = parse_config("[server]\nbind = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("server.bind"));
    }

    #[test]
    fn test_empty_collection_key_rejected() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::remove_var(MODEL_ENV);

        let err = parse_config("[knowledge]\ncollection_key = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("knowledge.collection_key"));
    }

    #[test]
    fn test_empty_model_rejected() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::remove_var(MODEL_ENV);

        let err = parse_config("[llm]\nmodel = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("llm.model"));
    }

    #[test]
    fn test_blank_model_env_keeps_file_value() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::set_var(MODEL_ENV, "  ");

        let cfg = parse_config("[llm]\nmodel = \"from-file\"\n").unwrap();
        assert_eq!(cfg.llm.model, "from-file");

        std::env::remove_var(MODEL_ENV);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(parse_config("[server\nbind = ").is_err());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        assert!(resolve_config(Some(&missing), &missing).is_err());
    }

    #[test]
    fn test_missing_default_path_falls_back() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::remove_var(MODEL_ENV);

        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("servai.toml");
        let cfg = resolve_config(None, &missing).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8000");
    }

    #[test]
    fn test_api_key_required() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        let previous = std::env::var(API_KEY_ENV).ok();

        std::env::remove_var(API_KEY_ENV);
        assert!(LlmConfig::default().api_key_from_env().is_err());

        std::env::set_var(API_KEY_ENV, "gsk_test");
        assert_eq!(LlmConfig::default().api_key_from_env().unwrap(), "gsk_test");

        match previous {
            Some(v) => std::env::set_var(API_KEY_ENV, v),
            None => std::env::remove_var(API_KEY_ENV),
        }
    }
}
