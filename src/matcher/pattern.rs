//! Regex source generation for templates

use crate::parser::{Placeholder, Quantifier, Segment, Template};

/// Build the anchored regex source for a template
pub fn pattern_for(template: &Template) -> String {
    let mut pattern = String::from("^");
    for segment in template.segments() {
        match &segment.node {
            Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
            Segment::Placeholder(p) => pattern.push_str(&placeholder_fragment(p)),
        }
    }
    pattern.push('$');
    pattern
}

/// Capture group for a single placeholder
pub fn placeholder_fragment(p: &Placeholder) -> String {
    let repeat = match p.quantifier {
        Quantifier::Exactly(1) => String::new(),
        Quantifier::Exactly(n) => format!("{{{}}}", n),
        Quantifier::OneOrMore => "+".to_string(),
    };
    let unit = format!("{}{}", p.class.regex_class(), repeat);
    if p.optional {
        format!("((?:{})?)", unit)
    } else {
        format!("({})", unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn pattern(source: &str) -> String {
        pattern_for(&parse(source).expect("should parse"))
    }

    #[test]
    fn test_cpf_pattern() {
        insta::assert_snapshot!(
            pattern("{d3}.{d3}.{d3}-{d2}"),
            @r"^([0-9]{3})\.([0-9]{3})\.([0-9]{3})\-([0-9]{2})$"
        );
    }

    #[test]
    fn test_phone_pattern() {
        insta::assert_snapshot!(
            pattern("({d2}) {d5}-{d4}"),
            @r"^\(([0-9]{2})\) ([0-9]{5})\-([0-9]{4})$"
        );
    }

    #[test]
    fn test_modifiers_pattern() {
        insta::assert_snapshot!(
            pattern("{l:upper}{W}{d3?}"),
            @"^([A-Za-z])([0-9A-Za-z]+)((?:[0-9]{3})?)$"
        );
    }

    #[test]
    fn test_empty_template_pattern() {
        assert_eq!(pattern(""), "^$");
    }
}
