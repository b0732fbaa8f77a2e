//! Parser implementation using chumsky
//!
//! Chumsky handles the brace structure over the logos token stream; the
//! placeholder bodies are decoded afterwards so every body error carries its
//! exact reason and location.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::{MalformedTemplate, Reason};
use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::placeholder::BodyDecoder;

/// Template structure before placeholder bodies are decoded
#[derive(Debug, Clone)]
enum RawSegment {
    Literal(String),
    Placeholder {
        body: Option<Spanned<String>>,
        closed: bool,
    },
}

/// Parse a template source string into segments
///
/// All malformed placeholders are reported, not just the first one.
pub fn parse(input: &str) -> Result<Template, Vec<MalformedTemplate>> {
    let len = input.len();

    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    let raw = template_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .map(|e| MalformedTemplate::from_rich(e, input))
                .collect::<Vec<_>>()
        })?;

    let template = resolve(input, raw)?;
    tracing::trace!(
        template = input,
        segments = template.segments().len(),
        "parsed template"
    );
    Ok(template)
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn template_parser<'a, I>(
) -> impl Parser<'a, I, Vec<Spanned<RawSegment>>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let text = select! {
        Token::Text(s) => s,
    };

    let literal = text.clone().map(RawSegment::Literal);

    // An opening brace always starts a placeholder; a missing close is
    // reported later with the placeholder's own span.
    let placeholder = just(Token::BraceOpen)
        .ignore_then(
            text.map_with(|s, e| Spanned::new(s, span_range(&e.span())))
                .or_not(),
        )
        .then(just(Token::BraceClose).or_not())
        .map(|(body, close)| RawSegment::Placeholder {
            body,
            closed: close.is_some(),
        });

    choice((literal, placeholder))
        .map_with(|seg, e| Spanned::new(seg, span_range(&e.span())))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

fn resolve(
    source: &str,
    raw: Vec<Spanned<RawSegment>>,
) -> Result<Template, Vec<MalformedTemplate>> {
    let mut segments = Vec::with_capacity(raw.len());
    let mut errors = Vec::new();

    for Spanned { node, span } in raw {
        match node {
            RawSegment::Literal(text) => {
                segments.push(Spanned::new(Segment::Literal(text), span));
            }
            RawSegment::Placeholder { closed: false, .. } => {
                let open = span.start..span.start + 1;
                errors.push(MalformedTemplate::new(
                    Reason::UnmatchedOpen,
                    source,
                    span,
                    open,
                ));
            }
            RawSegment::Placeholder { body: None, .. } => {
                errors.push(MalformedTemplate::new(
                    Reason::EmptyPlaceholder,
                    source,
                    span.clone(),
                    span,
                ));
            }
            RawSegment::Placeholder {
                body: Some(body), ..
            } => {
                let decoder = BodyDecoder::new(source, span.clone(), body.span.start);
                match decoder.decode(&body.node) {
                    Ok(p) => segments.push(Spanned::new(Segment::Placeholder(p), span)),
                    Err(e) => errors.push(e),
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(Template::new(source, segments))
    } else {
        Err(errors)
    }
}
