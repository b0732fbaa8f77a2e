//! Re-emitting captured values through a template

use crate::parser::{Segment, Template};
use crate::NormalizeError;

/// Rebuild the normalized value from per-placeholder captures
///
/// Literals are emitted verbatim; each capture is passed through its
/// placeholder's case transform. `captures` must hold one entry per
/// placeholder, in template order, as returned by
/// [`CompiledTemplate::capture_groups`](crate::CompiledTemplate::capture_groups).
pub fn apply_case<S: AsRef<str>>(
    template: &Template,
    captures: &[S],
) -> Result<String, NormalizeError> {
    let expected = template.placeholder_count();
    if captures.len() != expected {
        return Err(NormalizeError::CaptureCountMismatch {
            expected,
            found: captures.len(),
        });
    }

    let mut output = String::new();
    let mut captures = captures.iter();
    for segment in template.segments() {
        match &segment.node {
            Segment::Literal(text) => output.push_str(text),
            Segment::Placeholder(p) => {
                if let Some(captured) = captures.next() {
                    output.push_str(&p.transform(captured.as_ref()));
                }
            }
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_only_tagged_segment_is_transformed() {
        let template = parse("{l:upper}-{d}{l}{d2}").unwrap();
        let output = apply_case(&template, &["a", "1", "b", "23"]).unwrap();
        assert_eq!(output, "A-1b23");
    }

    #[test]
    fn test_lower_transform() {
        let template = parse("{L:lower}/{W}").unwrap();
        let output = apply_case(&template, &["ABC", "XyZ"]).unwrap();
        assert_eq!(output, "abc/XyZ");
    }

    #[test]
    fn test_absent_optional_keeps_literals() {
        let template = parse("{d3?}-{d2}").unwrap();
        assert_eq!(apply_case(&template, &["", "12"]).unwrap(), "-12");
    }

    #[test]
    fn test_capture_count_mismatch() {
        let template = parse("{d3}.{d3}").unwrap();
        let err = apply_case(&template, &["123"]).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::CaptureCountMismatch {
                expected: 2,
                found: 1
            }
        ));
    }
}
