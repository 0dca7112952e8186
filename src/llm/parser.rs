//! Reply parsing for oracle outputs.
//!
//! The oracle is asked for a bare JSON object `{"sql": ..., "explanation": ...}`.
//! Replies wrapped in a code fence are unwrapped first. Replies that are not
//! JSON at all get a best-effort scan for a SELECT/WITH clause.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::error::{QueryError, Result};
use crate::llm::generator::Candidate;

#[derive(Debug, Deserialize)]
struct GenerationReply {
    sql: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

fn fence_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```(?:json)?\s*").expect("valid fence pattern"))
}

fn fence_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*```$").expect("valid fence pattern"))
}

fn sql_clause() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)\b(?:SELECT|WITH)\s+.+").expect("valid clause pattern"))
}

/// Removes a surrounding ``` or ```json fence.
pub fn strip_code_fence(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }

    let opened = fence_open().replace(text, "");
    fence_close().replace(&opened, "").into_owned()
}

/// Parses an oracle reply into a candidate query.
///
/// Returns `GenerationParse` if the reply is a JSON object without a usable
/// `sql` field, or is not JSON and contains no SELECT/WITH clause.
pub fn parse_generation_reply(raw: &str) -> Result<Candidate> {
    let text = strip_code_fence(raw);

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => {
            let reply: GenerationReply = serde_json::from_value(value).map_err(|_| {
                QueryError::parse("oracle reply did not contain a sql field")
            })?;
            let sql = reply
                .sql
                .map(|sql| sql.trim().to_string())
                .filter(|sql| !sql.is_empty())
                .ok_or_else(|| QueryError::parse("oracle reply did not contain a sql field"))?;

            Ok(Candidate {
                sql,
                explanation: reply.explanation,
            })
        }
        Err(_) => scan_for_sql(&text)
            .map(Candidate::unexplained)
            .ok_or_else(|| QueryError::parse("Failed to parse oracle reply as JSON or SQL")),
    }
}

/// Finds the first SELECT/WITH clause and everything after it.
fn scan_for_sql(text: &str) -> Option<String> {
    let found = sql_clause().find(text)?;
    let sql = found.as_str().trim().trim_end_matches(';').trim_end();
    (!sql.is_empty()).then(|| sql.to_string())
}
