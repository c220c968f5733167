use arbiter_core::error::CoerceError;
use serde_json::Value;

use crate::policy::{OutputKind, Policy, PolicyKind};
use crate::types::Verdict;

/// Validate raw model output against the policy's declared shape and domain.
///
/// Models are asked for a structured value but do not reliably comply. The
/// failure modes are kept distinct: not parseable, declared field missing,
/// field of the wrong type, value outside the domain. Out-of-domain values
/// are rejected, never clamped to the nearest bound. Extra top-level JSON
/// fields are ignored.
pub fn coerce(raw: &str, policy: &Policy) -> Result<Verdict, CoerceError> {
    match policy.output_kind() {
        OutputKind::Json { field } => coerce_json(raw, field, policy),
        OutputKind::RawScalar => coerce_scalar(raw, policy),
    }
}

fn coerce_json(raw: &str, field: &'static str, policy: &Policy) -> Result<Verdict, CoerceError> {
    let text = strip_code_fence(raw);

    let value: Value = serde_json::from_str(text).map_err(|e| CoerceError::NotJson {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;
    let object = value.as_object().ok_or_else(|| CoerceError::NotJson {
        raw: raw.to_string(),
        reason: "top-level value is not an object".into(),
    })?;

    let field_value = object.get(field).ok_or(CoerceError::MissingField {
        field,
        raw: raw.to_string(),
    })?;
    let n = field_value.as_i64().ok_or(CoerceError::WrongType {
        field,
        raw: raw.to_string(),
    })?;

    let in_domain = match policy.kind() {
        PolicyKind::Binary => n == 0 || n == 1,
        PolicyKind::TenScale => (1..=10).contains(&n),
        PolicyKind::Continuous => unreachable!("continuous policy uses RawScalar output"),
    };
    if !in_domain {
        return Err(CoerceError::OutOfDomain {
            value: n as f64,
            domain: policy.domain().into(),
            raw: raw.to_string(),
        });
    }

    Ok(match policy.kind() {
        PolicyKind::Binary => Verdict::Binary(n as u8),
        PolicyKind::TenScale => Verdict::Score(n as u8),
        PolicyKind::Continuous => unreachable!(),
    })
}

fn coerce_scalar(raw: &str, policy: &Policy) -> Result<Verdict, CoerceError> {
    let text = raw.trim();
    let value: f64 = text.parse().map_err(|_| CoerceError::NotANumber {
        raw: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(CoerceError::NotANumber {
            raw: raw.to_string(),
        });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(CoerceError::OutOfDomain {
            value,
            domain: policy.domain().into(),
            raw: raw.to_string(),
        });
    }
    Ok(Verdict::Continuous(value))
}

/// Models routinely wrap the JSON they were asked for in a Markdown fence.
/// Strip one before parsing; anything else still has to be valid JSON.
fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
