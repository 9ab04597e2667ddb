//! Error types for the Quoll interpreter

use thiserror::Error;

use crate::parser::{Node, NodeKind};

/// Quoll interpreter errors
///
/// Parse-time problems are collected as data by [`crate::parser::parse`]; the
/// [`Error::SyntaxError`] variant only appears when a caller asks the
/// interpreter to reject a document that carries them. Everything else is an
/// evaluation error that bubbles up unrecovered, gaining an `at:` breadcrumb
/// for every frame it crosses.
#[derive(Error, Debug, Clone)]
pub enum Error {
    // Parse errors
    /// Syntax error found while reading the source
    ///
    /// **Triggered by:** unbalanced delimiters, unterminated strings, stray closers
    /// **Example:** `(def a 1` (missing closing parenthesis)
    #[error("Syntax error at {start}..{end}: {text}")]
    SyntaxError {
        /// Start offset (characters)
        start: usize,
        /// End offset (characters)
        end: usize,
        /// Offending source text
        text: String,
    },

    // Runtime errors
    /// Reference to a name no environment in the chain binds
    ///
    /// **Triggered by:** evaluating a symbol or param name that was never defined
    /// **Example:** `(core/str undefined-thing)`
    #[error("Variable not set '{name}' variables in scope: {}", .in_scope.join(", "))]
    UndefinedVariable {
        /// Variable name
        name: String,
        /// Names bound in the frame where the lookup started
        in_scope: Vec<String>,
    },

    /// Attempt to apply a value that is not a function
    ///
    /// **Triggered by:** a list whose head evaluates to data
    /// **Example:** `(1 2 3)`
    #[error("The form does not resolve into a function, got {type_name}")]
    NotCallable {
        /// Type of the value found in function position
        type_name: String,
    },

    /// The evaluator has no rule for this kind of node
    #[error("Cannot evaluate node of type {kind}")]
    CannotEvaluate {
        /// Kind of the offending node
        kind: NodeKind,
    },

    /// A construct received a node of the wrong kind
    ///
    /// **Triggered by:** `(def 1 2)`, `(fn (a) a)`, `(let (a 1) a)`
    #[error("Expected {expected}, got {got}")]
    UnexpectedNode {
        /// What the construct requires
        expected: String,
        /// Kind actually found
        got: String,
    },

    /// Arity or shape violation for a form or host function
    #[error("Invalid arguments for {form}: {reason}")]
    InvalidArguments {
        /// Name of the form or function
        form: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Literal text that does not decode into a value
    #[error("Invalid literal: {text}")]
    InvalidLiteral {
        /// Literal source text
        text: String,
    },

    /// Method lookup found nothing on the target
    #[error("Member '{name}' not found on {type_name}")]
    MissingMember {
        /// Member name
        name: String,
        /// Type of the target value
        type_name: String,
    },

    /// Dereferencing something that is not a var
    #[error("Value {value} does not implement deref")]
    NotDerefable {
        /// Printed form of the value
        value: String,
    },

    /// Map literal key that is neither a string nor a keyword
    #[error("Invalid map key: {key}")]
    InvalidMapKey {
        /// Printed form of the key
        key: String,
    },

    /// General runtime error, mostly raised by host functions
    #[error("Runtime error: {0}")]
    RuntimeError(String),

    /// Interpreter configuration could not be loaded
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error attributed to the node that raised it
    ///
    /// `trail` holds the source text of every evaluation frame the error
    /// crossed, innermost first.
    #[error("{source}{}", render_trail(.trail))]
    Located {
        /// The underlying error
        source: Box<Error>,
        /// Node the error is attributed to
        node: Node,
        /// `at:` breadcrumbs, innermost first
        trail: Vec<String>,
    },
}

fn render_trail(trail: &[String]) -> String {
    trail
        .iter()
        .map(|text| format!(".\n    at: {}", text))
        .collect()
}

fn source_text(node: &Node) -> String {
    node.text().unwrap_or_else(|| "???".to_string())
}

impl Error {
    /// Create a runtime error with a message
    pub fn runtime(msg: impl Into<String>) -> Self {
        Error::RuntimeError(msg.into())
    }

    /// Create an arity/shape error for `form`
    pub fn invalid_arguments(form: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArguments {
            form: form.into(),
            reason: reason.into(),
        }
    }

    /// Stamps `node` on an error that has no attribution yet
    pub fn attribute(self, node: &Node) -> Self {
        match self {
            located @ Error::Located { .. } => located,
            other => Error::Located {
                source: Box::new(other),
                node: node.clone(),
                trail: Vec::new(),
            },
        }
    }

    /// Stamps `node` if needed and appends its source text to the breadcrumb trail
    pub fn at(self, node: &Node) -> Self {
        match self.attribute(node) {
            Error::Located {
                source,
                node: attributed,
                mut trail,
            } => {
                trail.push(source_text(node));
                Error::Located {
                    source,
                    node: attributed,
                    trail,
                }
            }
            other => other,
        }
    }

    /// Node the error is attributed to, if any
    pub fn node(&self) -> Option<&Node> {
        match self {
            Error::Located { node, .. } => Some(node),
            _ => None,
        }
    }

    /// The error without attribution or breadcrumbs
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Located { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Breadcrumb trail, innermost first
    pub fn trail(&self) -> &[String] {
        match self {
            Error::Located { trail, .. } => trail,
            _ => &[],
        }
    }
}

/// Result type for Quoll operations
pub type Result<T> = std::result::Result<T, Error>;
