//! Runtime configuration from environment variables, with the CLI able to
//! override the timeout per invocation.

use std::env;
use std::time::Duration;

use crate::history::DEFAULT_HISTORY_FILE;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "dolphin3";
const DEFAULT_PROFILING_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_url: String,
    pub ollama_model: String,
    /// Advisory profiling timeout; bounds the analysis HTTP call.
    pub profiling_timeout: Duration,
    pub history_file: String,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let timeout_secs = env::var("PROFILING_TIMEOUT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PROFILING_TIMEOUT_SECS);

        Self {
            ollama_url: env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            ollama_model: env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string()),
            profiling_timeout: Duration::from_secs(timeout_secs),
            history_file: env::var("CODEMEDIC_HISTORY")
                .unwrap_or_else(|_| DEFAULT_HISTORY_FILE.to_string()),
        }
    }
}
