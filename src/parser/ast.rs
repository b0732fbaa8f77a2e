//! Syntax tree types for placeholder templates

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Character class accepted by a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// `[0-9]`
    Digit,
    /// `[A-Za-z]`
    Letter,
    /// `[0-9A-Za-z]`
    Alnum,
}

impl CharClass {
    /// Decode a kind letter into its class and whether it is the
    /// one-or-more (uppercase) form
    pub fn from_kind_letter(c: char) -> Option<(CharClass, bool)> {
        match c {
            'd' => Some((CharClass::Digit, false)),
            'D' => Some((CharClass::Digit, true)),
            'l' => Some((CharClass::Letter, false)),
            'L' => Some((CharClass::Letter, true)),
            'w' => Some((CharClass::Alnum, false)),
            'W' => Some((CharClass::Alnum, true)),
            _ => None,
        }
    }

    /// The kind letter that spells this class in template source
    pub fn kind_letter(self, one_or_more: bool) -> char {
        let c = match self {
            CharClass::Digit => 'd',
            CharClass::Letter => 'l',
            CharClass::Alnum => 'w',
        };
        if one_or_more {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }

    /// Whether `c` belongs to this class. Only ASCII characters qualify.
    pub fn contains(self, c: char) -> bool {
        match self {
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Letter => c.is_ascii_alphabetic(),
            CharClass::Alnum => c.is_ascii_alphanumeric(),
        }
    }

    /// Regex bracket expression for this class
    pub fn regex_class(self) -> &'static str {
        match self {
            CharClass::Digit => "[0-9]",
            CharClass::Letter => "[A-Za-z]",
            CharClass::Alnum => "[0-9A-Za-z]",
        }
    }

    /// Whether a case modifier is meaningful for this class
    pub fn accepts_case(self) -> bool {
        !matches!(self, CharClass::Digit)
    }
}

/// How many characters a placeholder consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Exactly N characters (`{d3}`, or `{d}` for N = 1)
    Exactly(usize),
    /// At least one character (`{D}`, `{L}`, `{W}`)
    OneOrMore,
}

impl Quantifier {
    /// Minimum number of characters the quantifier requires
    pub fn min(self) -> usize {
        match self {
            Quantifier::Exactly(n) => n,
            Quantifier::OneOrMore => 1,
        }
    }
}

/// Letter case forced on a placeholder's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTransform {
    Upper,
    Lower,
}

impl CaseTransform {
    pub fn from_modifier(name: &str) -> Option<Self> {
        match name {
            "upper" => Some(CaseTransform::Upper),
            "lower" => Some(CaseTransform::Lower),
            _ => None,
        }
    }

    pub fn modifier(self) -> &'static str {
        match self {
            CaseTransform::Upper => "upper",
            CaseTransform::Lower => "lower",
        }
    }

    pub fn apply(self, s: &str) -> String {
        match self {
            CaseTransform::Upper => s.to_ascii_uppercase(),
            CaseTransform::Lower => s.to_ascii_lowercase(),
        }
    }

    pub fn apply_char(self, c: char) -> char {
        match self {
            CaseTransform::Upper => c.to_ascii_uppercase(),
            CaseTransform::Lower => c.to_ascii_lowercase(),
        }
    }
}

/// A `{...}` slot in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub class: CharClass,
    pub quantifier: Quantifier,
    /// The whole slot may be absent
    pub optional: bool,
    pub case: Option<CaseTransform>,
}

impl Placeholder {
    /// Exact-count placeholder with no modifiers
    pub fn exactly(class: CharClass, count: usize) -> Self {
        Self {
            class,
            quantifier: Quantifier::Exactly(count),
            optional: false,
            case: None,
        }
    }

    /// One-or-more placeholder with no modifiers
    pub fn one_or_more(class: CharClass) -> Self {
        Self {
            class,
            quantifier: Quantifier::OneOrMore,
            optional: false,
            case: None,
        }
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_case(mut self, case: CaseTransform) -> Self {
        self.case = Some(case);
        self
    }

    /// Characters this slot needs when it is present
    pub fn min_len(&self) -> usize {
        self.quantifier.min()
    }

    /// Characters the slot demands from input; zero when optional
    pub fn required_len(&self) -> usize {
        if self.optional {
            0
        } else {
            self.min_len()
        }
    }

    /// Apply the case transform, if any, to a captured value
    pub fn transform(&self, captured: &str) -> String {
        match self.case {
            Some(case) => case.apply(captured),
            None => captured.to_string(),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let one_or_more = self.quantifier == Quantifier::OneOrMore;
        write!(f, "{{{}", self.class.kind_letter(one_or_more))?;
        if let Quantifier::Exactly(n) = self.quantifier {
            if n != 1 {
                write!(f, "{}", n)?;
            }
        }
        if self.optional {
            f.write_str("?")?;
        }
        if let Some(case) = self.case {
            write!(f, ":{}", case.modifier())?;
        }
        f.write_str("}")
    }
}

/// Syntax node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// One piece of a template, in source order
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Fixed text emitted verbatim
    Literal(String),
    Placeholder(Placeholder),
}

impl Segment {
    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        }
    }
}

/// A parsed template. Immutable once built by [`crate::parser::parse`].
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    segments: Vec<Spanned<Segment>>,
}

impl Template {
    pub(crate) fn new(source: impl Into<String>, segments: Vec<Spanned<Segment>>) -> Self {
        Self {
            source: source.into(),
            segments,
        }
    }

    /// The source text the template was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Spanned<Segment>] {
        &self.segments
    }

    /// Placeholders in template order
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> + '_ {
        self.segments.iter().filter_map(|s| s.node.as_placeholder())
    }

    pub fn placeholder_count(&self) -> usize {
        self.placeholders().count()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_letters() {
        assert_eq!(
            CharClass::from_kind_letter('d'),
            Some((CharClass::Digit, false))
        );
        assert_eq!(
            CharClass::from_kind_letter('W'),
            Some((CharClass::Alnum, true))
        );
        assert_eq!(CharClass::from_kind_letter('x'), None);
        assert_eq!(CharClass::Letter.kind_letter(true), 'L');
    }

    #[test]
    fn test_class_membership_is_ascii() {
        assert!(CharClass::Digit.contains('7'));
        assert!(!CharClass::Digit.contains('a'));
        assert!(CharClass::Letter.contains('Z'));
        assert!(!CharClass::Letter.contains('é'));
        assert!(CharClass::Alnum.contains('q'));
        assert!(!CharClass::Alnum.contains('-'));
    }

    #[test]
    fn test_placeholder_display_is_canonical() {
        let p = Placeholder::exactly(CharClass::Digit, 3).with_optional(true);
        assert_eq!(p.to_string(), "{d3?}");

        let p = Placeholder::exactly(CharClass::Letter, 1).with_case(CaseTransform::Upper);
        assert_eq!(p.to_string(), "{l:upper}");

        let p = Placeholder::one_or_more(CharClass::Alnum);
        assert_eq!(p.to_string(), "{W}");
    }

    #[test]
    fn test_required_len() {
        assert_eq!(Placeholder::exactly(CharClass::Digit, 4).required_len(), 4);
        assert_eq!(Placeholder::one_or_more(CharClass::Digit).required_len(), 1);
        assert_eq!(
            Placeholder::exactly(CharClass::Digit, 4)
                .with_optional(true)
                .required_len(),
            0
        );
    }

    #[test]
    fn test_transform() {
        let p = Placeholder::exactly(CharClass::Letter, 2).with_case(CaseTransform::Lower);
        assert_eq!(p.transform("Ab"), "ab");
        assert_eq!(Placeholder::exactly(CharClass::Letter, 2).transform("Ab"), "Ab");
    }
}
