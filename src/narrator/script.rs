use super::types::ApiError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output of the script-generation step. Only `parts` seeds segments; the
/// rest is passed through for presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResult {
    #[serde(rename = "scriptParts")]
    pub parts: Vec<String>,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Headline, description and tags, without the narration text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptMetadata {
    pub titles: Vec<String>,
    pub description: String,
    pub tags: Vec<String>,
}

impl ScriptResult {
    pub fn into_parts(self) -> (Vec<String>, ScriptMetadata) {
        (
            self.parts,
            ScriptMetadata {
                titles: self.titles,
                description: self.description,
                tags: self.tags,
            },
        )
    }
}

pub fn parse_script_result(json_text: &str) -> Result<ScriptResult, ApiError> {
    let cleaned = json_text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let excerpt = if cleaned.chars().count() > 800 {
        format!("{}…", cleaned.chars().take(800).collect::<String>())
    } else {
        cleaned.to_string()
    };

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(v) => v,
        Err(_) => {
            let sanitized = sanitize_json_trailing_commas(cleaned);
            serde_json::from_str(&sanitized)
                .map_err(|e| ApiError::Parse(format!("JSON parse: {} | output: {}", e, excerpt)))?
        }
    };

    if !value.is_object() {
        return Err(ApiError::Parse(format!(
            "JSON parse: expected object | output: {}",
            excerpt
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::Parse(format!("JSON parse: {} | output: {}", e, excerpt)))
}

fn sanitize_json_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let mut look = chars.clone();
            while look.peek().is_some_and(|n| n.is_whitespace()) {
                look.next();
            }
            if matches!(look.peek(), Some(']') | Some('}')) {
                continue;
            }
        }

        out.push(c);
    }

    out
}
