//! Prompt template formatting.
//!
//! Templates use `{key}` placeholders filled from event metadata. `{{` and
//! `}}` produce literal braces. A placeholder naming a key that the metadata
//! lacks is an error: a half-filled prompt is worse than no description.

use crate::error::GenAiError;
use serde_json::Value;

/// Detection event metadata. Must contain a `label` entry.
pub type Metadata = serde_json::Map<String, Value>;

/// Fill every `{key}` placeholder in `template` from `metadata`.
pub fn format_template(template: &str, metadata: &Metadata) -> Result<String, GenAiError> {
    let err = |message: String| GenAiError::PromptFormat {
        template: template.to_string(),
        message,
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, next)| next) == Some('{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let start = pos + 1;
                let end = loop {
                    match chars.next() {
                        Some((end, '}')) => break end,
                        Some((_, '{')) | None => {
                            return Err(err(format!("unclosed '{{' at offset {pos}")));
                        }
                        Some(_) => {}
                    }
                };
                let key = &template[start..end];
                if key.is_empty() {
                    return Err(err(format!("empty placeholder at offset {pos}")));
                }
                let value = metadata
                    .get(key)
                    .ok_or_else(|| err(format!("metadata has no field '{key}'")))?;
                push_value(&mut out, value);
            }
            '}' if chars.peek().map(|&(_, next)| next) == Some('}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(err(format!("single '}}' at offset {pos}"))),
            c => out.push(c),
        }
    }

    Ok(out)
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}
