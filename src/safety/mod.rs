//! Query safety gate.
//!
//! Decides whether a candidate query may be executed. The lexical gate is a
//! coarse keyword filter over the raw text; it is not a parser and does not
//! understand string literals or comments. An optional strict mode also
//! requires the text to parse as exactly one read-only query.
//!
//! Validation is pure: no state, no side effects, safe to call from any
//! number of concurrent pipeline runs.

mod lexical;
mod parser;

pub use lexical::{check_lexical, BLOCKED_KEYWORDS};
pub use parser::check_parsed;

use serde::Serialize;

/// Outcome of validating a candidate query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the candidate may be executed.
    pub valid: bool,
    /// Why the candidate was rejected, if it was.
    pub reason: Option<String>,
}

impl Verdict {
    /// An accepting verdict.
    pub fn accept() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// A rejecting verdict with the given reason.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Validator with its configured rigor.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryValidator {
    strict_parse: bool,
}

impl QueryValidator {
    /// Creates a validator running only the lexical gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the parse gate.
    pub fn with_strict_parse(mut self, strict_parse: bool) -> Self {
        self.strict_parse = strict_parse;
        self
    }

    /// Validates a candidate query.
    pub fn validate(&self, candidate: &str) -> Verdict {
        let verdict = check_lexical(candidate);
        if !verdict.valid || !self.strict_parse {
            return verdict;
        }
        check_parsed(candidate)
    }
}

/// Validates a candidate with the lexical gate only.
pub fn validate(candidate: &str) -> Verdict {
    QueryValidator::new().validate(candidate)
}
