//! Validation and normalization of values against compiled templates

mod apply;
mod config;
mod fill;

pub use apply::apply_case;
pub use config::{FillOptions, LeftoverPolicy};
pub use fill::{fill_from_raw, Fill};

use crate::matcher::CompiledTemplate;
use crate::NormalizeError;

/// Result of checking a value against a template
///
/// A non-matching value is an expected outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Valid,
    NoMatch,
}

impl Validation {
    pub fn is_valid(self) -> bool {
        matches!(self, Validation::Valid)
    }
}

/// Output of [`CompiledTemplate::normalize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// The value already matched; captures were re-emitted with case transforms
    Matched(String),
    /// The value did not match and was filled from its raw characters
    Filled(Fill),
}

impl Normalized {
    pub fn value(&self) -> &str {
        match self {
            Normalized::Matched(value) => value,
            Normalized::Filled(fill) => &fill.output,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Normalized::Matched(value) => value,
            Normalized::Filled(fill) => fill.output,
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Normalized::Matched(_) => true,
            Normalized::Filled(fill) => fill.complete,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Normalized::Matched(_))
    }
}

impl CompiledTemplate {
    /// Check that a stored value already conforms to the template
    pub fn validate(&self, input: &str) -> Validation {
        if self.full_match(input) {
            Validation::Valid
        } else {
            Validation::NoMatch
        }
    }

    /// Re-emit captures through the template's literals and case transforms
    pub fn apply_case<S: AsRef<str>>(&self, captures: &[S]) -> Result<String, NormalizeError> {
        apply_case(self.template(), captures)
    }

    /// Best-effort fill of the template from unformatted input
    pub fn fill_from_raw(&self, raw: &str, options: &FillOptions) -> Fill {
        fill_from_raw(self.template(), raw, options)
    }

    /// Normalize a value the way the rule test panel does: a matching value
    /// is re-emitted with case transforms, anything else is filled from raw
    pub fn normalize(&self, value: &str, options: &FillOptions) -> Normalized {
        if let Some(captures) = self.capture_groups(value) {
            if let Ok(output) = self.apply_case(captures.as_slice()) {
                return Normalized::Matched(output);
            }
        }
        Normalized::Filled(self.fill_from_raw(value, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    #[test]
    fn test_validate() {
        let template = compile("{d5}-{d3}").unwrap();
        assert_eq!(template.validate("70000-000"), Validation::Valid);
        assert_eq!(template.validate("70000000"), Validation::NoMatch);
        assert!(!template.validate("7").is_valid());
    }

    #[test]
    fn test_normalize_matching_value_applies_case() {
        let template = compile("{l:upper}-{d}{l}{d2}").unwrap();
        let result = template.normalize("a-1b23", &FillOptions::default());
        assert_eq!(result, Normalized::Matched("A-1b23".to_string()));
        assert!(result.is_complete());
    }

    #[test]
    fn test_normalize_falls_back_to_fill() {
        let template = compile("{d3}.{d3}.{d3}-{d2}").unwrap();
        let result = template.normalize("12345678901", &FillOptions::default());
        assert!(!result.is_match());
        assert!(result.is_complete());
        assert_eq!(result.value(), "123.456.789-01");
    }

    #[test]
    fn test_normalize_incomplete_fill() {
        let template = compile("{d5}-{d3}").unwrap();
        let result = template.normalize("70000", &FillOptions::default());
        assert!(!result.is_complete());
        assert_eq!(result.into_value(), "70000-___");
    }
}
