use thiserror::Error;

/// Top-level error type for the Arbiter crates.
#[derive(Debug, Error)]
pub enum ArbiterError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("Coercion error: {0}")]
    Coerce(#[from] CoerceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Failures talking to the model provider.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API request failed: {0}")]
    ApiRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Model call exceeded {secs}s timeout")]
    Timeout { secs: u64 },
}

/// Failures rendering a policy's rule templates.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Missing variable: {0}")]
    MissingVariable(String),
}

/// Failures turning raw model output into a policy-typed verdict.
///
/// Each variant carries the offending raw text so the service can log it.
/// The `Display` output deliberately omits it: these messages end up in HTTP
/// error bodies and the raw text can echo prompt content.
#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("model output is not a JSON object: {reason}")]
    NotJson { raw: String, reason: String },

    #[error("model output is missing the `{field}` field")]
    MissingField { field: &'static str, raw: String },

    #[error("model output field `{field}` has the wrong type")]
    WrongType { field: &'static str, raw: String },

    #[error("model output is not a number")]
    NotANumber { raw: String },

    #[error("model output value {value} is outside the policy domain {domain}")]
    OutOfDomain {
        value: f64,
        domain: String,
        raw: String,
    },
}

impl CoerceError {
    /// The raw model output that failed coercion, for diagnostics.
    pub fn raw(&self) -> &str {
        match self {
            CoerceError::NotJson { raw, .. }
            | CoerceError::MissingField { raw, .. }
            | CoerceError::WrongType { raw, .. }
            | CoerceError::NotANumber { raw }
            | CoerceError::OutOfDomain { raw, .. } => raw,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArbiterError>;
