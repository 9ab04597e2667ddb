use serde::{Deserialize, Serialize};

/// A node of the raw parse tree produced by the reader
///
/// Offsets are character indices into the source; the raw text is
/// `source[start..end]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// The grammar rule that produced this node
    #[serde(rename = "type")]
    pub kind: RawKind,
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Nested nodes, in source order
    pub children: Vec<RawNode>,
}

impl RawNode {
    /// Creates a new raw node
    pub fn new(kind: RawKind, start: usize, end: usize, children: Vec<RawNode>) -> Self {
        RawNode {
            kind,
            start,
            end,
            children,
        }
    }

    /// Creates a node without children
    pub fn leaf(kind: RawKind, start: usize, end: usize) -> Self {
        RawNode::new(kind, start, end, Vec::new())
    }
}

/// All rule names the reader can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawKind {
    /// Whole source text
    Document,

    // Collections
    /// `( ... )`
    List,
    /// `[ ... ]`
    Vector,
    /// `{ ... }`
    Map,
    /// `#{ ... }`
    Set,
    /// `#( ... )`
    Lambda,

    // Atoms
    /// Plain identifier
    Symbol,
    /// `:name`
    Keyword,
    /// Double quoted string, escapes kept verbatim
    String,
    /// Decimal number
    Number,
    /// Decimal number with a leading minus
    NegNumber,
    /// `0x...`
    HexLiteral,
    /// `%`, `%1`, `%2`, ... inside anonymous functions
    ParamName,

    // Prefix forms
    /// `'x`
    Quote,
    /// `` `x ``
    Backtick,
    /// `~x`
    Unquote,
    /// `~@x`
    UnquoteSplicing,
    /// `@x`
    Deref,
    /// `#'x`
    VarQuote,
    /// `^meta target`
    Tag,
    /// `#_ x`, dropped by the parser adapter
    Discard,

    // Trivia and errors
    /// `; ...` up to end of line
    Comment,
    /// Malformed input
    SyntaxError,
    /// Malformed input that swallowed the rest of the source
    RestSyntaxError,
}

impl RawKind {
    /// True for nodes the parser adapter filters out
    pub fn is_trivia(self) -> bool {
        matches!(self, RawKind::Discard | RawKind::Comment)
    }

    /// True for error markers
    pub fn is_error(self) -> bool {
        matches!(self, RawKind::SyntaxError | RawKind::RestSyntaxError)
    }
}
