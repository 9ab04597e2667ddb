use super::ast::{Meta, Node, NodeKind};
use crate::lexer::{RawDocument, RawKind, RawNode, SExprScanner};

/// Output of [`parse`]
///
/// The document is always present, even when `syntax_errors` is not empty;
/// callers must check the error list before trusting it.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Root `Document` node
    pub document: Node,
    /// `SyntaxError` nodes, in source order
    pub syntax_errors: Vec<Node>,
}

impl ParseResult {
    /// True when the source read cleanly
    pub fn is_clean(&self) -> bool {
        self.syntax_errors.is_empty()
    }
}

/// Converts the reader's raw tree into [`Node`]s
///
/// Comments and `#_` discards are dropped, error markers become leaf
/// `SyntaxError` nodes (their contents are not converted) and every node gets
/// `start`, `end` and `text` metadata.
pub struct SExprParser {
    raw: RawDocument,
    syntax_errors: Vec<Node>,
}

impl SExprParser {
    /// Creates a parser over a raw document
    pub fn new(raw: RawDocument) -> Self {
        SExprParser {
            raw,
            syntax_errors: Vec::new(),
        }
    }

    /// Builds the document and collects syntax errors
    pub fn parse(mut self) -> ParseResult {
        let root = self.raw.root.clone();
        let document = self.convert(&root);

        // Input the reader never reached becomes one trailing error
        let document = if self.raw.has_remainder() {
            let start = self.raw.consumed;
            let end = self.raw.source.len();
            let rest = Node::with_meta(
                NodeKind::SyntaxError,
                Vec::new(),
                Meta::spanned(start, end, self.raw.text(start, end)),
            );
            self.syntax_errors.push(rest.clone());

            let mut children = document.children().to_vec();
            children.push(rest);
            let meta = document.meta().clone();
            Node::with_meta(NodeKind::Document, children, meta)
        } else {
            document
        };

        if !self.syntax_errors.is_empty() {
            tracing::debug!(
                count = self.syntax_errors.len(),
                "document parsed with syntax errors"
            );
        }

        ParseResult {
            document,
            syntax_errors: self.syntax_errors,
        }
    }

    fn convert(&mut self, raw: &RawNode) -> Node {
        let meta = Meta::spanned(raw.start, raw.end, self.raw.text(raw.start, raw.end));

        if raw.kind.is_error() {
            // Errors are leaves: do not go deeper
            let node = Node::with_meta(NodeKind::SyntaxError, Vec::new(), meta);
            self.syntax_errors.push(node.clone());
            return node;
        }

        let children = raw
            .children
            .iter()
            .filter(|child| !child.kind.is_trivia())
            .map(|child| self.convert(child))
            .collect();

        Node::with_meta(node_kind(raw.kind), children, meta)
    }
}

fn node_kind(kind: RawKind) -> NodeKind {
    match kind {
        RawKind::Document => NodeKind::Document,
        RawKind::List => NodeKind::List,
        RawKind::Vector => NodeKind::Vector,
        RawKind::Map => NodeKind::Map,
        RawKind::Set => NodeKind::Set,
        RawKind::Lambda => NodeKind::Lambda,
        RawKind::Symbol => NodeKind::Symbol,
        RawKind::Keyword => NodeKind::Keyword,
        RawKind::String => NodeKind::String,
        RawKind::Number => NodeKind::Number,
        RawKind::NegNumber => NodeKind::NegNumber,
        RawKind::HexLiteral => NodeKind::HexLiteral,
        RawKind::ParamName => NodeKind::ParamName,
        RawKind::Quote => NodeKind::Quote,
        RawKind::Backtick => NodeKind::Backtick,
        RawKind::Unquote => NodeKind::Unquote,
        RawKind::UnquoteSplicing => NodeKind::UnquoteSplicing,
        RawKind::Deref => NodeKind::Deref,
        RawKind::VarQuote => NodeKind::VarQuote,
        RawKind::Tag => NodeKind::Tag,
        RawKind::Discard
        | RawKind::Comment
        | RawKind::SyntaxError
        | RawKind::RestSyntaxError => NodeKind::SyntaxError,
    }
}

/// Parses source text into a document plus its syntax errors
pub fn parse(source: &str) -> ParseResult {
    SExprParser::new(SExprScanner::new(source).scan_document()).parse()
}
