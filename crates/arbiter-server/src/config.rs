use std::time::Duration;

use thiserror::Error;

use arbiter_judge::policy::PolicyKind;

const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
const DEFAULT_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GROQ_API_KEY is not set; refusing to start")]
    MissingApiKey,

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: String,
    pub policy: PolicyKind,
    pub model_id: String,
    pub timeout: Duration,
    pub addr: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("GROQ_API_KEY")
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let policy = match lookup("ARBITER_POLICY") {
            Some(value) => value
                .parse::<PolicyKind>()
                .map_err(|reason| ConfigError::Invalid {
                    var: "ARBITER_POLICY",
                    reason,
                })?,
            None => PolicyKind::Binary,
        };

        let model_id = lookup("ARBITER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());

        let timeout_secs = match lookup("ARBITER_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "ARBITER_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let addr = lookup("ARBITER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.into());

        Ok(Self {
            api_key,
            policy,
            model_id,
            timeout: Duration::from_secs(timeout_secs),
            addr,
        })
    }
}
