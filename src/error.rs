//! Error types for template parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;
use crate::parser::MAX_COUNT;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Why a template was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    #[error("unmatched '{{'")]
    UnmatchedOpen,

    #[error("unmatched '}}'")]
    UnmatchedClose,

    #[error("empty placeholder")]
    EmptyPlaceholder,

    #[error("unknown placeholder kind '{0}' (expected one of d, D, l, L, w, W)")]
    UnknownKind(char),

    #[error("invalid count '{0}' (expected an integer from 1 to {max})", max = MAX_COUNT)]
    InvalidCount(String),

    #[error("case modifier is not allowed on a digit placeholder")]
    CaseOnDigit,

    #[error("one-or-more placeholder cannot take an explicit count")]
    CountOnOneOrMore,

    #[error("unknown modifier ':{0}' (expected :upper or :lower)")]
    UnknownModifier(String),

    #[error("unexpected character '{0}' in placeholder")]
    UnexpectedCharacter(char),

    #[error("{0}")]
    Syntax(String),
}

/// A template that cannot be compiled
///
/// `fragment` is the offending substring (the whole placeholder for errors
/// inside `{...}`), `span` the byte range of the exact culprit, and `offset`
/// its character offset in the template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed template at offset {offset}: {reason} in `{fragment}`")]
pub struct MalformedTemplate {
    pub reason: Reason,
    pub fragment: String,
    pub offset: usize,
    pub span: Span,
}

impl MalformedTemplate {
    pub(crate) fn new(reason: Reason, source: &str, fragment: Span, span: Span) -> Self {
        Self {
            reason,
            fragment: source.get(fragment).unwrap_or_default().to_string(),
            offset: char_offset(source, span.start),
            span,
        }
    }

    /// Convert a chumsky error raised while parsing `source`
    pub(crate) fn from_rich(err: chumsky::error::Rich<'_, Token>, source: &str) -> Self {
        let span = err.span().into_range();
        let reason = match err.found() {
            Some(Token::BraceClose) => Reason::UnmatchedClose,
            Some(Token::BraceOpen) => Reason::UnmatchedOpen,
            found => Reason::Syntax(format!("unexpected {:?}", found)),
        };
        Self::new(reason, source, span.clone(), span)
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("malformed template: {}", self.reason))
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(self.reason.to_string())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Character offset of a byte index
fn char_offset(source: &str, byte: usize) -> usize {
    source
        .char_indices()
        .take_while(|(i, _)| *i < byte)
        .count()
}
