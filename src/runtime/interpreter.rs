use std::rc::Rc;

use crate::config::InterpreterConfig;
use crate::error::{Error, Result};
use crate::parser::{parse, Node, ParseResult};
use crate::runtime::{evaluate, macro_expand, special_forms, Environment, Function, Value, Var};
use crate::tools::Library;

/// Builds a root environment holding the core forms and functions
///
/// Binding order: special forms, the `core/` and `internal/` library,
/// `extra`, then the `nil`/`true`/`false` literals.
pub fn base_environment(extra: &Library) -> Environment {
    let env = Environment::new();
    special_forms::install(&env);
    Library::new().install(&env);
    extra.install(&env);
    env.define("nil", Value::Nil);
    env.define("true", Value::Bool(true));
    env.define("false", Value::Bool(false));
    env
}

/// Parse + evaluate entry point for host programs
///
/// # Example
///
/// ```
/// use quoll::{Interpreter, Value};
/// use quoll::tools::NativeFn;
///
/// # tokio_test::block_on(async {
/// let interpreter = Interpreter::new();
/// interpreter.define_host_fn(NativeFn::sync("twice", |args| match args {
///     [Value::Int(n)] => Ok(Value::Int(n * 2)),
///     _ => Ok(Value::Nil),
/// }));
///
/// let value = interpreter.eval_str("(def x 21) (twice x)").await.unwrap();
/// assert_eq!(value, Value::Int(42));
/// # });
/// ```
pub struct Interpreter {
    env: Environment,
    config: InterpreterConfig,
}

impl Interpreter {
    /// Creates an interpreter with the default configuration
    pub fn new() -> Self {
        Interpreter::with_config(InterpreterConfig::default())
    }

    /// Creates an interpreter with the given configuration
    pub fn with_config(config: InterpreterConfig) -> Self {
        Interpreter::with_options(config, &Library::empty())
    }

    /// Creates an interpreter whose root environment also binds `library`
    pub fn with_library(library: &Library) -> Self {
        Interpreter::with_options(InterpreterConfig::default(), library)
    }

    /// Creates an interpreter from a configuration and a host library
    pub fn with_options(config: InterpreterConfig, library: &Library) -> Self {
        Interpreter {
            env: base_environment(library),
            config,
        }
    }

    /// Root environment
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Active configuration
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Binds `name` in the root environment, as `def` would
    pub fn define(&self, name: impl Into<String>, value: Value) -> Rc<Var> {
        self.env.define(name, value)
    }

    /// Binds a host function under its own name
    pub fn define_host_fn<F: Function + 'static>(&self, f: F) -> Rc<Var> {
        let name = f.name().to_string();
        tracing::debug!(name = %name, "defined host fn");
        self.env.define(name, Value::function(f))
    }

    /// Reads source text
    pub fn parse(&self, source: &str) -> ParseResult {
        parse(source)
    }

    /// Macro-expands a node against the root environment
    pub fn macro_expand(&self, node: &Node) -> Node {
        macro_expand(node, &self.env)
    }

    /// Evaluates a node in the root environment
    pub async fn evaluate(&self, node: &Node) -> Result<Value> {
        evaluate(node, &self.env).await
    }

    /// Parses and evaluates source text, returning the last form's value
    pub async fn eval_str(&self, source: &str) -> Result<Value> {
        let parsed = self.parse(source);
        if self.config.strict_syntax {
            if let Some(error) = parsed.syntax_errors.first() {
                let meta = error.meta();
                return Err(Error::SyntaxError {
                    start: meta.start.unwrap_or_default(),
                    end: meta.end.unwrap_or_default(),
                    text: meta.text.clone().unwrap_or_default(),
                }
                .attribute(error));
            }
        }
        self.evaluate(&parsed.document).await
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
