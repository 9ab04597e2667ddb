//! Things that can sit in function position

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;

use crate::error::Result;
use crate::parser::Node;
use crate::runtime::{Environment, Value};

/// Boxed evaluation future
///
/// Evaluation is recursive and single-threaded, so futures are boxed and
/// not `Send`.
pub type EvalFuture<'a> = LocalBoxFuture<'a, Result<Value>>;

/// An ordinary function: receives its arguments already evaluated
#[async_trait(?Send)]
pub trait Function {
    /// Name used when printing and in error messages
    fn name(&self) -> &str;

    /// Calls the function
    async fn call(&self, args: Vec<Value>) -> Result<Value>;
}

/// A special form: receives the calling node and environment unevaluated
///
/// For a list call `(if c a b)` the node is the whole list and the arguments
/// are the children after the head. For syntax sugar such as `[a b]` the
/// node is the sugar node itself and all children are arguments; see
/// [`crate::runtime::form_args`].
#[async_trait(?Send)]
pub trait SpecialForm {
    /// Name used when printing and in error messages
    fn name(&self) -> &str;

    /// Invokes the form
    async fn invoke(&self, node: &Node, env: &Environment) -> Result<Value>;
}

/// Value in function position
#[derive(Clone)]
pub enum Callable {
    /// Receives unevaluated nodes
    Special(Rc<dyn SpecialForm>),
    /// Receives evaluated values
    Function(Rc<dyn Function>),
}

impl Callable {
    /// Name of the wrapped form or function
    pub fn name(&self) -> &str {
        match self {
            Callable::Special(form) => form.name(),
            Callable::Function(func) => func.name(),
        }
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Special(a), Callable::Special(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
            }
            (Callable::Function(a), Callable::Function(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Special(form) => write!(f, "Special({})", form.name()),
            Callable::Function(func) => write!(f, "Function({})", func.name()),
        }
    }
}

/// Handler signature for built-in special forms
pub type SpecialHandler = for<'a> fn(&'a Node, &'a Environment) -> EvalFuture<'a>;

/// A special form implemented by a plain function
pub struct BuiltinForm {
    name: &'static str,
    handler: SpecialHandler,
}

impl BuiltinForm {
    /// Wraps `handler` under `name`
    pub fn new(name: &'static str, handler: SpecialHandler) -> Self {
        BuiltinForm { name, handler }
    }
}

#[async_trait(?Send)]
impl SpecialForm for BuiltinForm {
    fn name(&self) -> &str {
        self.name
    }

    async fn invoke(&self, node: &Node, env: &Environment) -> Result<Value> {
        (self.handler)(node, env).await
    }
}
