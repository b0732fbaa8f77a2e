//! Compilation of parsed templates into anchored matchers
//!
//! Each placeholder becomes one capture group of a regular expression.
//! The regex engine's leftmost-first semantics give the same captures a
//! backtracking engine would, so a one-or-more slot followed by fixed-size
//! slots (`{D}-{d4}`) gives back exactly what the later slots need.

mod pattern;

use regex::Regex;

use crate::parser::Template;

pub use pattern::{pattern_for, placeholder_fragment};

/// A template compiled into a matcher. Immutable and cheap to share.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: Template,
    regex: Regex,
}

impl CompiledTemplate {
    /// Compile a parsed template
    ///
    /// Parsed templates always produce a valid pattern; the error case is
    /// the regex engine's size limit.
    pub fn compile(template: Template) -> Result<Self, regex::Error> {
        let pattern = pattern_for(&template);
        let regex = Regex::new(&pattern)?;
        tracing::debug!(template = template.source(), %pattern, "compiled template");
        Ok(Self { template, regex })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Template source text
    pub fn source(&self) -> &str {
        self.template.source()
    }

    /// The compiled regular expression, as shown to users as `regex_pattern`
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the whole input conforms to the template
    pub fn full_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// Per-placeholder captures in template order
    ///
    /// Returns `None` unless the whole input matches. An optional
    /// placeholder that is absent captures an empty string.
    pub fn capture_groups(&self, input: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(input)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }
}
