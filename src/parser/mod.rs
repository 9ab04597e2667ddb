//! Quoll parser module
//!
//! Turns the reader's raw tree into [`Node`]s and prints them back.

mod ast;
mod printer;
mod sexpr_parser;

pub use ast::{Meta, Node, NodeKind};
pub use printer::print_node;
pub use sexpr_parser::{parse, ParseResult, SExprParser};
