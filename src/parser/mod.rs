//! Parser for placeholder templates

pub mod ast;
mod grammar;
pub mod lexer;
mod placeholder;

pub use ast::*;
pub use grammar::parse;
pub use placeholder::MAX_COUNT;
