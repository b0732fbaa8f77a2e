//! Decoding of placeholder bodies (the text between `{` and `}`)
//!
//! Body grammar: `<kind><count>?<optional>?<case>?`, where the optional
//! marker may also follow the case modifier (`{l2:upper?}`).

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{MalformedTemplate, Reason, Span};
use crate::parser::ast::{CaseTransform, CharClass, Placeholder, Quantifier};

/// Largest explicit count accepted in a placeholder such as `{d3}`
pub const MAX_COUNT: usize = 1000;

/// Decodes one placeholder body and reports errors against the full source
pub(crate) struct BodyDecoder<'s> {
    source: &'s str,
    /// Span of the whole `{...}` placeholder
    fragment: Span,
    /// Byte offset of the body within `source`
    body_start: usize,
}

impl<'s> BodyDecoder<'s> {
    pub(crate) fn new(source: &'s str, fragment: Span, body_start: usize) -> Self {
        Self {
            source,
            fragment,
            body_start,
        }
    }

    fn error(&self, reason: Reason, range: Span) -> MalformedTemplate {
        let start = self.body_start + range.start;
        let end = self.body_start + range.end;
        MalformedTemplate::new(reason, self.source, self.fragment.clone(), start..end)
    }

    pub(crate) fn decode(&self, body: &str) -> Result<Placeholder, MalformedTemplate> {
        let mut chars = body.char_indices().peekable();

        let (class, one_or_more) = match chars.next() {
            None => return Err(self.error(Reason::EmptyPlaceholder, 0..0)),
            Some((i, c)) => CharClass::from_kind_letter(c)
                .ok_or_else(|| self.error(Reason::UnknownKind(c), i..i + c.len_utf8()))?,
        };

        let quantifier = self.quantifier(body, &mut chars, one_or_more)?;

        let mut optional = false;
        let mut case = None;
        while let Some((i, c)) = chars.next() {
            match c {
                '?' if !optional => optional = true,
                ':' if case.is_none() => {
                    let end = take_word(&mut chars, i + 1);
                    let name = &body[i + 1..end];
                    let transform = CaseTransform::from_modifier(name).ok_or_else(|| {
                        self.error(Reason::UnknownModifier(name.to_string()), i..end)
                    })?;
                    if !class.accepts_case() {
                        return Err(self.error(Reason::CaseOnDigit, i..end));
                    }
                    case = Some(transform);
                }
                other => {
                    return Err(self.error(
                        Reason::UnexpectedCharacter(other),
                        i..i + other.len_utf8(),
                    ))
                }
            }
        }

        Ok(Placeholder {
            class,
            quantifier,
            optional,
            case,
        })
    }

    fn quantifier(
        &self,
        body: &str,
        chars: &mut Peekable<CharIndices<'_>>,
        one_or_more: bool,
    ) -> Result<Quantifier, MalformedTemplate> {
        // Kind letters are ASCII, so the count starts at byte 1
        let end = take_word(chars, 1);
        let text = &body[1..end];

        if text.is_empty() {
            return Ok(if one_or_more {
                Quantifier::OneOrMore
            } else {
                Quantifier::Exactly(1)
            });
        }

        let invalid = || self.error(Reason::InvalidCount(text.to_string()), 1..end);
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if one_or_more {
            return Err(self.error(Reason::CountOnOneOrMore, 1..end));
        }
        match text.parse::<usize>() {
            Ok(n) if (1..=MAX_COUNT).contains(&n) => Ok(Quantifier::Exactly(n)),
            _ => Err(invalid()),
        }
    }
}

/// Consume a run of ASCII alphanumerics, returning the byte index after it
fn take_word(chars: &mut Peekable<CharIndices<'_>>, start: usize) -> usize {
    let mut end = start;
    while let Some(&(i, c)) = chars.peek() {
        if !c.is_ascii_alphanumeric() {
            break;
        }
        end = i + c.len_utf8();
        chars.next();
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> Result<Placeholder, MalformedTemplate> {
        let source = format!("{{{}}}", body);
        BodyDecoder::new(&source, 0..source.len(), 1).decode(body)
    }

    fn reason(body: &str) -> Reason {
        decode(body).unwrap_err().reason
    }

    #[test]
    fn test_simple_kinds() {
        assert_eq!(decode("d").unwrap(), Placeholder::exactly(CharClass::Digit, 1));
        assert_eq!(decode("l").unwrap(), Placeholder::exactly(CharClass::Letter, 1));
        assert_eq!(decode("w").unwrap(), Placeholder::exactly(CharClass::Alnum, 1));
        assert_eq!(decode("D").unwrap(), Placeholder::one_or_more(CharClass::Digit));
        assert_eq!(decode("L").unwrap(), Placeholder::one_or_more(CharClass::Letter));
        assert_eq!(decode("W").unwrap(), Placeholder::one_or_more(CharClass::Alnum));
    }

    #[test]
    fn test_count_and_optional() {
        assert_eq!(
            decode("d3?").unwrap(),
            Placeholder::exactly(CharClass::Digit, 3).with_optional(true)
        );
        assert_eq!(
            decode("d?").unwrap(),
            Placeholder::exactly(CharClass::Digit, 1).with_optional(true)
        );
        assert_eq!(
            decode("D?").unwrap(),
            Placeholder::one_or_more(CharClass::Digit).with_optional(true)
        );
    }

    #[test]
    fn test_case_modifiers() {
        assert_eq!(
            decode("l:upper").unwrap(),
            Placeholder::exactly(CharClass::Letter, 1).with_case(CaseTransform::Upper)
        );
        assert_eq!(
            decode("W:lower").unwrap(),
            Placeholder::one_or_more(CharClass::Alnum).with_case(CaseTransform::Lower)
        );
    }

    #[test]
    fn test_optional_before_or_after_case() {
        let expected = Placeholder::exactly(CharClass::Letter, 2)
            .with_optional(true)
            .with_case(CaseTransform::Upper);
        assert_eq!(decode("l2?:upper").unwrap(), expected);
        assert_eq!(decode("l2:upper?").unwrap(), expected);
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(reason("x3"), Reason::UnknownKind('x'));
        let err = decode("x3").unwrap_err();
        assert_eq!(err.offset, 1);
        assert_eq!(err.fragment, "{x3}");
    }

    #[test]
    fn test_invalid_counts() {
        assert_eq!(reason("d0"), Reason::InvalidCount("0".into()));
        assert_eq!(reason("dx"), Reason::InvalidCount("x".into()));
        assert_eq!(reason("d3a"), Reason::InvalidCount("3a".into()));
        assert_eq!(reason("d1001"), Reason::InvalidCount("1001".into()));
        assert!(decode("d1000").is_ok());
    }

    #[test]
    fn test_case_on_digit() {
        assert_eq!(reason("d:upper"), Reason::CaseOnDigit);
        assert_eq!(reason("D:lower"), Reason::CaseOnDigit);
    }

    #[test]
    fn test_count_on_one_or_more() {
        assert_eq!(reason("D3"), Reason::CountOnOneOrMore);
        assert_eq!(reason("L2"), Reason::CountOnOneOrMore);
    }

    #[test]
    fn test_unknown_modifier() {
        assert_eq!(reason("l:title"), Reason::UnknownModifier("title".into()));
        assert_eq!(reason("l:"), Reason::UnknownModifier(String::new()));
    }

    #[test]
    fn test_unexpected_characters() {
        assert_eq!(reason("d3??"), Reason::UnexpectedCharacter('?'));
        assert_eq!(reason("d 3"), Reason::UnexpectedCharacter(' '));
        assert_eq!(
            reason("l:upper:lower"),
            Reason::UnexpectedCharacter(':')
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(reason(""), Reason::EmptyPlaceholder);
    }
}
