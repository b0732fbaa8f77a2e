//! Lexer for placeholder templates using logos
//!
//! The template language only has two delimiters, so the token stream is a
//! sequence of braces and the text runs between them. Whitespace is
//! significant: `({d2}) {d5}` keeps the space inside its literal run.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,

    /// Any run of characters that are not braces
    #[regex(r"[^{}]+", |lex| lex.slice().to_string())]
    Text(String),
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
