//! Compiled find-and-replace rules.
//!
//! # Responsibilities
//! - Compile `{find, replace}` pairs once at startup
//! - Apply them in declaration order to response bodies
//!
//! # Design Decisions
//! - Rules run sequentially; rule N sees the output of rule N-1
//! - Matching is done on bytes so bodies that are not valid UTF-8 still
//!   pass through untouched where no pattern matches
//! - Replacement templates use `$1` / `${name}` capture expansion

use std::borrow::Cow;

use regex::bytes::Regex;
use thiserror::Error;

use crate::config::RewriteRule;

/// A pattern failed to compile.
#[derive(Debug, Error)]
#[error("invalid pattern `{pattern}`: {source}")]
pub struct PatternError {
    /// The offending pattern as written in the configuration.
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// One compiled pattern and its replacement template.
#[derive(Debug, Clone)]
pub struct Rule {
    regex: Regex,
    replacement: String,
}

impl Rule {
    /// Compile a single rule.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern).map_err(|source| PatternError {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            regex,
            replacement: replacement.into(),
        })
    }

    /// Replace every non-overlapping match. Borrowed when nothing matched.
    fn replace_all<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        self.regex.replace_all(input, self.replacement.as_bytes())
    }
}

/// Ordered, immutable collection of rules.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    rules: Vec<Rule>,
}

impl PatternSet {
    /// Compile rules in the given order, failing on the first bad pattern.
    pub fn compile<'a, I>(rules: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = &'a RewriteRule>,
    {
        let rules = rules
            .into_iter()
            .map(|rule| Rule::new(&rule.find, rule.replace.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order to raw bytes.
    pub fn apply_bytes(&self, input: &[u8]) -> Vec<u8> {
        let mut current = input.to_vec();
        for rule in &self.rules {
            let replaced = match rule.replace_all(&current) {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(_) => None,
            };
            if let Some(next) = replaced {
                current = next;
            }
        }
        current
    }

    /// Apply every rule in order to text.
    pub fn apply(&self, text: &str) -> String {
        match String::from_utf8(self.apply_bytes(text.as_bytes())) {
            Ok(text) => text,
            // Only reachable with byte-oriented patterns such as `(?-u)\xFF`.
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}
