//! Runtime configuration - environment variables (optionally from `.env`)
//! with command line overrides

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use crate::coach::prompts::PERSONA_INSTRUCTION;

pub const DEFAULT_DB_PATH: &str = "stitch.db";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_THINKING_BUDGET: u32 = 1024;

/// Settings for the generative model client
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
    pub thinking_budget: u32,
    /// Persona/style instruction sent with every chat call
    pub persona: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            thinking_budget: DEFAULT_THINKING_BUDGET,
            persona: PERSONA_INSTRUCTION.to_string(),
        }
    }
}

/// Gateway flags shared by the commands that talk to the model
#[derive(Debug, Clone, Args)]
pub struct GatewayArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long, env = "STITCH_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API base URL
    #[arg(long, env = "STITCH_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Request timeout in seconds
    #[arg(long, env = "STITCH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Reasoning token budget per request
    #[arg(long, env = "STITCH_THINKING_BUDGET", default_value_t = DEFAULT_THINKING_BUDGET)]
    pub thinking_budget: u32,

    /// File with a replacement persona instruction
    #[arg(long, env = "STITCH_PERSONA_FILE")]
    pub persona_file: Option<PathBuf>,
}

impl GatewayArgs {
    pub fn into_config(self) -> Result<GatewayConfig> {
        let persona = match &self.persona_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read persona file {}", path.display()))?,
            None => PERSONA_INSTRUCTION.to_string(),
        };

        let api_key = self.api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("GEMINI_API_KEY not set; coach replies will use offline fallbacks");
        }

        Ok(GatewayConfig {
            api_key,
            model: self.model,
            api_base: self.api_base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.timeout_secs),
            thinking_budget: self.thinking_budget,
            persona,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args() -> GatewayArgs {
        GatewayArgs {
            api_key: Some("key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            api_base: "http://localhost:9000/".to_string(),
            timeout_secs: 5,
            thinking_budget: 256,
            persona_file: None,
        }
    }

    #[test]
    fn test_into_config() {
        let config = args().into_config().unwrap();
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.api_base, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.thinking_budget, 256);
        assert_eq!(config.persona, PERSONA_INSTRUCTION);
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let mut a = args();
        a.api_key = Some("   ".to_string());
        assert!(a.into_config().unwrap().api_key.is_none());
    }

    #[test]
    fn test_persona_file_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Be brief.").unwrap();

        let mut a = args();
        a.persona_file = Some(file.path().to_path_buf());
        assert_eq!(a.into_config().unwrap().persona, "Be brief.");
    }

    #[test]
    fn test_missing_persona_file_errors() {
        let mut a = args();
        a.persona_file = Some(PathBuf::from("/definitely/not/here.txt"));
        assert!(a.into_config().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.model, "gemini-3-pro-preview");
        assert_eq!(config.thinking_budget, 1024);
        assert!(config.api_key.is_none());
    }
}
