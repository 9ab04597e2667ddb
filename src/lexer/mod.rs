//! Grammar backend for Quoll
//!
//! Reads source text into a raw parse tree of tagged spans. The tree still
//! contains comments, discarded forms and error markers; the parser adapter
//! in [`crate::parser`] cleans it up and turns it into [`crate::parser::Node`]s.

mod sexpr_scanner;
mod token;

pub use sexpr_scanner::{RawDocument, SExprScanner};
pub use token::{RawKind, RawNode};
