//! Runtime execution for Quoll programs
//!
//! Evaluation is a recursive walk over [`crate::parser::Node`]s: each node
//! is macro-expanded, then evaluated according to its kind. List heads and
//! syntax sugar resolve to [`Callable`]s, which are either special forms
//! (given the unevaluated node) or ordinary functions (given values).

mod apply;
mod callable;
mod environment;
mod evaluator;
pub mod interop;
mod interpreter;
mod macros;
mod special_forms;
mod value;

pub use apply::{apply_to_forms, apply_to_values, form_args, materialize};
pub use callable::{BuiltinForm, Callable, EvalFuture, Function, SpecialForm, SpecialHandler};
pub use environment::{Environment, Var};
pub use evaluator::{evaluate, sugar_target};
pub use interpreter::{base_environment, Interpreter};
pub use macros::{macro_expand, macro_expand_1};
pub use special_forms::Lambda;
pub use value::{HostObject, Keyword, MapKey, Value};
