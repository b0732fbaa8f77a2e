//! Template Normalizer - placeholder templates for validating and formatting values
//!
//! A template such as `{d3}.{d3}.{d3}-{d2}` describes the target format of a
//! column value. This library parses templates, compiles them into anchored
//! matchers, validates values, re-emits matching values with per-slot case
//! transforms, and fills templates from unformatted input.
//!
//! # Example
//!
//! ```rust
//! use template_normalizer::{compile, FillOptions};
//!
//! let cpf = compile("{d3}.{d3}.{d3}-{d2}").unwrap();
//! assert!(cpf.full_match("123.456.789-01"));
//!
//! let filled = cpf.fill_from_raw("12345678901", &FillOptions::default());
//! assert_eq!(filled.output, "123.456.789-01");
//! assert!(filled.complete);
//! ```

pub mod error;
pub mod matcher;
pub mod normalize;
pub mod parser;
pub mod rules;
pub mod service;

pub use error::{MalformedTemplate, Reason};
pub use matcher::CompiledTemplate;
pub use normalize::{Fill, FillOptions, LeftoverPolicy, Normalized, Validation};
pub use parser::{parse, Template};
pub use rules::{InMemoryRuleStore, NormalizationRule, RuleBook, RuleError, RuleStore};
pub use service::{RuleTester, TemplateCache, TestRequest, TestResponse};

use thiserror::Error;

/// Errors that can occur while compiling or applying a template
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The template source is malformed
    #[error("malformed template: {}", format_malformed(.0))]
    Malformed(Vec<MalformedTemplate>),

    /// The regex engine refused the compiled pattern
    #[error("pattern error: {0}")]
    Regex(#[from] regex::Error),

    /// `apply_case` was given a different number of captures than the
    /// template has placeholders
    #[error("expected {expected} captures, found {found}")]
    CaptureCountMismatch { expected: usize, found: usize },
}

impl From<Vec<MalformedTemplate>> for NormalizeError {
    fn from(errors: Vec<MalformedTemplate>) -> Self {
        NormalizeError::Malformed(errors)
    }
}

pub(crate) fn format_malformed(errors: &[MalformedTemplate]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse and compile a template source string
///
/// # Example
///
/// ```rust
/// use template_normalizer::{compile, NormalizeError};
///
/// let plate = compile("{l3:upper}-{d4}").unwrap();
/// assert!(plate.full_match("abc-1234"));
///
/// assert!(matches!(compile("{d:upper}"), Err(NormalizeError::Malformed(_))));
/// ```
pub fn compile(source: &str) -> Result<CompiledTemplate, NormalizeError> {
    let template = parse(source)?;
    Ok(CompiledTemplate::compile(template)?)
}

/// Normalize a single value with default fill options
///
/// Matching values are re-emitted with case transforms; other values are
/// filled from their raw characters.
///
/// # Example
///
/// ```rust
/// use template_normalizer::normalize;
///
/// let result = normalize("({d2}) {d5}-{d4}", "61999998888").unwrap();
/// assert_eq!(result.value(), "(61) 99999-8888");
/// assert!(result.is_complete());
/// ```
pub fn normalize(template: &str, value: &str) -> Result<Normalized, NormalizeError> {
    let compiled = compile(template)?;
    Ok(compiled.normalize(value, &FillOptions::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_valid_template() {
        let compiled = compile("{d3}-{d2}").unwrap();
        assert_eq!(compiled.source(), "{d3}-{d2}");
        assert!(compiled.full_match("123-45"));
    }

    #[test]
    fn test_compile_malformed_template() {
        let err = compile("{x3}").unwrap_err();
        match err {
            NormalizeError::Malformed(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].reason, Reason::UnknownKind('x'));
            }
            other => panic!("expected malformed template, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_error_message_lists_every_error() {
        let err = compile("{x}{d:upper}").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown placeholder kind"));
        assert!(msg.contains("case modifier"));
    }

    #[test]
    fn test_normalize_entry_point() {
        let result = normalize("{l3:upper}-{d}{l}{d2}", "abc1d23").unwrap();
        assert_eq!(result.value(), "ABC-1d23");
        assert!(result.is_complete());
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert!(normalize("{D3}", "123").is_err());
    }
}
