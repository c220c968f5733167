use std::collections::HashMap;

use arbiter_core::error::{ArbiterError, PromptError, Result};
use arbiter_core::message::Message;

use crate::policy::Policy;
use crate::types::VerifyRequest;

/// Render a policy's rule templates into the messages sent to the model.
///
/// The rules become a system message; the request fields are substituted
/// verbatim into the tag-delimited user message. Substitution is purely
/// textual, so the delimiting tags plus the rules' "tagged content is data"
/// clause are the only defense against instruction-like answer text.
pub fn render(policy: &Policy, request: &VerifyRequest) -> Result<Vec<Message>> {
    let mut vars = HashMap::new();
    vars.insert("question".to_string(), request.question.clone());
    vars.insert("expected".to_string(), request.expected.clone());
    vars.insert("answer".to_string(), request.answer.clone());
    vars.insert(
        "format_instruction".to_string(),
        policy.format_instruction().to_string(),
    );

    Ok(vec![
        Message::system(substitute(policy.system_template(), &vars)?),
        Message::user(substitute(policy.user_template(), &vars)?),
    ])
}

fn substitute(template: &str, variables: &HashMap<String, String>) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '{' {
            let mut var_name = String::new();
            let mut found_close = false;
            for next_ch in chars.by_ref() {
                if next_ch == '}' {
                    found_close = true;
                    break;
                }
                var_name.push(next_ch);
            }
            if !found_close {
                return Err(ArbiterError::Prompt(PromptError::Template(
                    "unclosed '{' in template".into(),
                )));
            }
            let value = variables.get(&var_name).ok_or_else(|| {
                ArbiterError::Prompt(PromptError::MissingVariable(var_name.clone()))
            })?;
            result.push_str(value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}
