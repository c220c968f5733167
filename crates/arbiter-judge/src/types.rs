use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The (question, expected, answer) triple to be judged.
///
/// All three fields are opaque strings; no validation beyond presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub question: String,
    pub expected: String,
    pub answer: String,
}

/// A validated evaluation outcome, tagged by the policy that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// 0 = wrong, 1 = correct.
    Binary(u8),
    /// Integer score in [1, 10].
    Score(u8),
    /// Continuous score in [0.0, 1.0].
    Continuous(f64),
}

impl Verdict {
    /// The HTTP response body for this verdict.
    ///
    /// The field is always named `verdict`, even for the 1-10 score where
    /// `score` would be the honest name. The original deployments shipped
    /// that way and callers depend on it.
    pub fn to_response_json(&self) -> Value {
        match *self {
            Verdict::Binary(v) => json!({ "verdict": v }),
            Verdict::Score(s) => json!({ "verdict": s }),
            Verdict::Continuous(v) => json!({ "verdict": v }),
        }
    }
}
