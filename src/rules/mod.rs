//! Validation rules for pull request titles and descriptions.
//!
//! A [`ValidationRule`] is compiled once at startup from configuration and then
//! shared read-only across every delivery. Two shapes exist:
//!
//! - **Match** rules accept a field when the pattern matches it (titles).
//! - **Extract** rules pull one section out of a multi-section text and accept
//!   it when the section has real content (descriptions).
//!
//! # Example
//!
//! ```
//! use pr_steward::rules::ValidationRule;
//!
//! let title = ValidationRule::default_title();
//! assert!(title.is_valid("fix: correct null check"));
//! assert!(!title.is_valid("misc: stuff"));
//!
//! let body = ValidationRule::default_body();
//! assert!(body.is_valid("## Description\n\nAdds retries\n\n## Other information"));
//! assert!(!body.is_valid("## Description\n\n## Other information"));
//! ```

mod matcher;

use regex::Regex;
use thiserror::Error;

pub use matcher::{matches, matches_with_extraction};

/// Conventional-commit title: `type(scope)!: subject`.
///
/// The subject is ASCII word characters and spaces only.
pub const DEFAULT_TITLE_PATTERN: &str =
    r"^(build|chore|ci|docs|feat|fix|perf|refactor|revert|style|test)(\([a-z ]+\))?(!)?: [0-9A-Za-z_ ]+$";

/// The text between the `## Description` and `## Other information` headings.
pub const DEFAULT_BODY_PATTERN: &str = r"(?s)## Description(.*)## Other information";

/// The filler the pull request template ships with.
pub const DEFAULT_BODY_PLACEHOLDER: &str = "Please describe your pull request.";

/// Errors raised while compiling a rule.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The pattern is not a valid regular expression.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An extraction pattern must have exactly one capture group.
    #[error("extraction pattern {pattern:?} must have exactly one capture group, found {groups}")]
    CaptureGroups { pattern: String, groups: usize },
}

/// A compiled check applied to one pull request field.
#[derive(Debug, Clone)]
pub enum ValidationRule {
    /// The field is valid when the pattern matches it.
    Match { pattern: Regex },

    /// The field is valid when the pattern's single capture group holds
    /// something other than whitespace or the placeholder.
    Extract { pattern: Regex, placeholder: String },
}

impl ValidationRule {
    /// Builds a plain match rule.
    pub fn matching(pattern: &str) -> Result<Self, RuleError> {
        Ok(ValidationRule::Match {
            pattern: compile(pattern)?,
        })
    }

    /// Builds an extraction rule, checking the pattern has one capture group.
    pub fn extracting(pattern: &str, placeholder: impl Into<String>) -> Result<Self, RuleError> {
        let compiled = compile(pattern)?;
        // captures_len counts the implicit whole-match group.
        let groups = compiled.captures_len() - 1;
        if groups != 1 {
            return Err(RuleError::CaptureGroups {
                pattern: pattern.to_string(),
                groups,
            });
        }
        Ok(ValidationRule::Extract {
            pattern: compiled,
            placeholder: placeholder.into(),
        })
    }

    /// The built-in conventional-commit title rule.
    pub fn default_title() -> Self {
        Self::matching(DEFAULT_TITLE_PATTERN).expect("built-in title pattern compiles")
    }

    /// The built-in description rule.
    pub fn default_body() -> Self {
        Self::extracting(DEFAULT_BODY_PATTERN, DEFAULT_BODY_PLACEHOLDER)
            .expect("built-in body pattern compiles")
    }

    /// Classifies `text` as conforming or not.
    pub fn is_valid(&self, text: &str) -> bool {
        match self {
            ValidationRule::Match { pattern } => matches(text, pattern),
            ValidationRule::Extract {
                pattern,
                placeholder,
            } => matches_with_extraction(text, pattern, placeholder),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
