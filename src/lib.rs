//! # Quoll - An Embeddable Lisp
//!
//! A small Clojure-flavoured Lisp meant to be hosted inside Rust programs.
//! Source text goes through three stages:
//!
//! ```text
//! Source → Reader → Raw tree → Parser → Nodes → Macro expansion → Evaluator → Value
//! ```
//!
//! Code is data: quoted forms evaluate to the very [`Node`]s the parser
//! produced, so host code can inspect and print them.
//!
//! ## Quick Start
//!
//! ```rust
//! use quoll::{Interpreter, Value};
//!
//! # tokio_test::block_on(async {
//! let interpreter = Interpreter::new();
//! let value = interpreter
//!     .eval_str(r#"
//!         (def greet (fn [name] (core/str "Hi " name)))
//!         (greet "Bob")
//!     "#)
//!     .await
//!     .unwrap();
//!
//! assert_eq!(value, Value::string("Hi Bob"));
//! # });
//! ```
//!
//! ### Host Functions
//!
//! Host functions may be synchronous or `async`; the evaluator awaits them
//! in place, so a slow host call suspends the whole evaluation.
//!
//! ```rust
//! use quoll::{Interpreter, Value};
//! use quoll::tools::NativeFn;
//!
//! # tokio_test::block_on(async {
//! let interpreter = Interpreter::new();
//! interpreter.define_host_fn(NativeFn::new("fetch", |args: Vec<Value>| async move {
//!     Ok(Value::vector(args))
//! }));
//!
//! let value = interpreter.eval_str("(fetch 1 2)").await.unwrap();
//! assert_eq!(value.to_string(), "[1 2]");
//! # });
//! ```
//!
//! ## Language Overview
//!
//! ### Special Forms
//!
//! - `(def name doc? value?)` - Binds a var in the current environment
//! - `(fn name? [params] body...)` - Closure; missing arguments are `nil`
//! - `(let [name value ...] body...)` - Sequential local bindings
//! - `(if cond then else?)` - Only the chosen branch is evaluated
//! - `(do a b ...)` - Sequential evaluation, returns the last value
//! - `(. target member args...)` - Member access and method calls
//!
//! ### Reader Sugar
//!
//! - `[a b]`, `#{a b}`, `{:k v}` - Vector, set and map literals
//! - `#(f % %2)` - Anonymous function
//! - `'x` - Quote, `#'x` - var reference, `@v` - deref
//! - `(.member target)` and `(.-field target)` - Member access shorthand
//! - `#_ form` and `; comment` - Ignored by the reader
//!
//! ## Error Handling
//!
//! Parse problems are reported as data; evaluation failures are returned as
//! [`Error`] values that carry the failing node and an `at:` trail:
//!
//! ```rust
//! # use quoll::Interpreter;
//! # tokio_test::block_on(async {
//! let err = Interpreter::new().eval_str("(core/str undefined-thing)").await.unwrap_err();
//! assert!(err.to_string().starts_with("Variable not set 'undefined-thing'"));
//! assert!(err.to_string().contains("at: (core/str undefined-thing)"));
//! # });
//! ```

/// Version of the Quoll interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod tools;

// Re-export main types
pub use config::InterpreterConfig;
pub use error::{Error, Result};
pub use lexer::SExprScanner;
pub use parser::{parse, print_node, Meta, Node, NodeKind, ParseResult, SExprParser};
pub use runtime::{Environment, Interpreter, Value, Var};
pub use tools::{Library, NativeFn};

/// Convenient type alias for the reader
pub type Scanner = SExprScanner;

/// Convenient type alias for the parser
pub type Parser = SExprParser;
