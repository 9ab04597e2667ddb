//! Syntax tree for Quoll
//!
//! The same [`Node`] type is the output of the parser, the input of the
//! evaluator and a first-class runtime value (`'(a b)` evaluates to a node).

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::runtime::{MapKey, Value, Var};

/// Discriminant of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// `(f a b)`
    List,
    /// `[a b]`
    Vector,
    /// `{k v}`
    Map,
    /// `#{a b}`
    Set,
    /// Identifier
    Symbol,
    /// `:name`
    Keyword,
    /// String literal
    String,
    /// Number literal
    Number,
    /// Negative number literal
    NegNumber,
    /// `0x..` literal
    HexLiteral,
    /// `%`, `%1`, ... inside `#(...)`
    ParamName,
    /// `#(...)`
    Lambda,
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
    /// Malformed source
    SyntaxError,
    /// Root of a parsed source text
    Document,
    /// A resolved var reference, produced by macro expansion of `#'x`
    Var,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Sparse per-node metadata
///
/// Nodes produced by the parser always carry `start`, `end` and `text`.
/// User code may attach arbitrary entries through `^{...}` tags.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    /// Start offset in the source (characters)
    pub start: Option<usize>,
    /// End offset in the source (characters)
    pub end: Option<usize>,
    /// Raw source text
    pub text: Option<String>,
    entries: BTreeMap<String, Value>,
}

impl Meta {
    /// Empty metadata
    pub fn new() -> Self {
        Meta::default()
    }

    /// Metadata for a parsed span
    pub fn spanned(start: usize, end: usize, text: impl Into<String>) -> Self {
        Meta {
            start: Some(start),
            end: Some(end),
            text: Some(text.into()),
            entries: BTreeMap::new(),
        }
    }

    /// Metadata carrying only a text
    pub fn with_text(text: impl Into<String>) -> Self {
        Meta {
            text: Some(text.into()),
            ..Meta::default()
        }
    }

    /// Builds metadata from a runtime map such as `{:doc "..."}`
    ///
    /// Keyword keys keep their leading colon (`":doc"`).
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut meta = Meta::new();
        match value {
            Value::Nil => {}
            Value::Map(entries) => {
                for (key, value) in entries.iter() {
                    let name = match key {
                        MapKey::Keyword(k) => k.to_string(),
                        MapKey::String(s) => s.clone(),
                    };
                    meta.insert(name, value.clone());
                }
            }
            other => {
                return Err(Error::UnexpectedNode {
                    expected: "metadata map".to_string(),
                    got: other.type_name(),
                })
            }
        }
        Ok(meta)
    }

    /// Entry lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Sets an entry, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// All user entries
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// True when nothing at all is attached
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.text.is_none() && self.entries.is_empty()
    }

    /// Merges `other` into `self`; keys present in `other` win, others stay
    pub fn merge(&mut self, other: &Meta) {
        if other.start.is_some() {
            self.start = other.start;
        }
        if other.end.is_some() {
            self.end = other.end;
        }
        if other.text.is_some() {
            self.text = other.text.clone();
        }
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }
}

struct NodeData {
    kind: NodeKind,
    children: Vec<Node>,
    /// Only set on `Var` nodes
    binding: Option<Rc<Var>>,
    meta: RefCell<Meta>,
}

/// A syntax tree node, cheap to clone
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

impl Node {
    /// Creates a leaf node of the given kind
    pub fn new(kind: NodeKind) -> Self {
        Node::with_children(kind, Vec::new())
    }

    /// Creates a node with children
    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Node::with_meta(kind, children, Meta::new())
    }

    /// Creates a node with children and metadata
    pub fn with_meta(kind: NodeKind, children: Vec<Node>, meta: Meta) -> Self {
        Node(Rc::new(NodeData {
            kind,
            children,
            binding: None,
            meta: RefCell::new(meta),
        }))
    }

    /// A symbol whose text is `name`
    pub fn symbol(name: impl Into<String>) -> Self {
        Node::with_meta(NodeKind::Symbol, Vec::new(), Meta::with_text(name))
    }

    /// A list node; `meta` usually comes from the node being rewritten
    pub fn list(children: Vec<Node>, meta: Meta) -> Self {
        Node::with_meta(NodeKind::List, children, meta)
    }

    /// A resolved var reference
    pub fn var(var: Rc<Var>, meta: Meta) -> Self {
        Node(Rc::new(NodeData {
            kind: NodeKind::Var,
            children: Vec::new(),
            binding: Some(var),
            meta: RefCell::new(meta),
        }))
    }

    /// The node's discriminant
    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    /// Child nodes, empty for leaves
    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    /// First child
    pub fn first(&self) -> Option<&Node> {
        self.0.children.first()
    }

    /// Second child
    pub fn second(&self) -> Option<&Node> {
        self.0.children.get(1)
    }

    /// The var held by a `Var` node
    pub fn binding(&self) -> Option<&Rc<Var>> {
        self.0.binding.as_ref()
    }

    /// Borrow the node's metadata
    pub fn meta(&self) -> Ref<'_, Meta> {
        self.0.meta.borrow()
    }

    /// Merges `meta` onto this node
    pub fn attach_meta(&self, meta: &Meta) {
        self.0.meta.borrow_mut().merge(meta);
    }

    /// Raw source text, or the synthesized text of generated symbols
    pub fn text(&self) -> Option<String> {
        self.0.meta.borrow().text.clone()
    }

    /// Text of a symbol node
    pub fn symbol_text(&self) -> Result<String> {
        if self.kind() != NodeKind::Symbol {
            return Err(Error::UnexpectedNode {
                expected: "symbol".to_string(),
                got: self.kind().to_string(),
            });
        }
        Ok(self.text().unwrap_or_default())
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({:?} {})", self.kind(), self)
    }
}
