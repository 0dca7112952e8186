//! Lexical safety gate.
//!
//! Rejects empty input, anything not starting with SELECT or WITH, any
//! whole-word occurrence of a mutating or administrative keyword, and
//! stacked statements.

use regex::Regex;
use std::sync::OnceLock;

use super::Verdict;

/// Keywords that may not appear as whole words anywhere in a candidate.
pub const BLOCKED_KEYWORDS: &[&str] = &[
    "INSERT",
    "UPDATE",
    "DELETE",
    "DROP",
    "ALTER",
    "CREATE",
    "TRUNCATE",
    "REPLACE",
    "MERGE",
    "EXEC",
    "EXECUTE",
    "GRANT",
    "REVOKE",
    "COMMIT",
    "ROLLBACK",
    "SAVEPOINT",
    "ATTACH",
    "DETACH",
    "PRAGMA",
];

fn keyword_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        BLOCKED_KEYWORDS
            .iter()
            .map(|keyword| {
                let re = Regex::new(&format!(r"\b{keyword}\b")).expect("valid keyword pattern");
                (*keyword, re)
            })
            .collect()
    })
}

/// Runs the lexical gate over a candidate query.
pub fn check_lexical(candidate: &str) -> Verdict {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Verdict::reject("Empty SQL query");
    }

    let upper = trimmed.to_uppercase();
    if !upper.starts_with("SELECT") && !upper.starts_with("WITH") {
        return Verdict::reject("Only SELECT queries are allowed");
    }

    if let Some((keyword, _)) = keyword_patterns()
        .iter()
        .find(|(_, pattern)| pattern.is_match(&upper))
    {
        return Verdict::reject(format!("Forbidden keyword: {keyword}"));
    }

    if statement_count(candidate) > 1 {
        return Verdict::reject("Multiple statements not allowed");
    }

    Verdict::accept()
}

/// Counts non-empty `;`-separated statements.
fn statement_count(candidate: &str) -> usize {
    candidate
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .count()
}
