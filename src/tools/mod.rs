//! Host function system for Quoll
//!
//! Provides [`NativeFn`], the adapter that turns a Rust closure into a
//! callable script value, and [`Library`], a named collection of values
//! installed into an environment.

pub mod stdlib;

use std::collections::BTreeMap;
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use futures_util::future::{self, LocalBoxFuture};
use futures_util::FutureExt;

use crate::error::{Error, Result};
use crate::runtime::{Environment, Function, Value};

type NativeHandler = Rc<dyn Fn(Vec<Value>) -> LocalBoxFuture<'static, Result<Value>>>;

/// A function implemented in Rust
///
/// ```
/// use quoll::tools::NativeFn;
/// use quoll::Value;
///
/// let twice = NativeFn::sync("twice", |args| match args {
///     [Value::Int(n)] => Ok(Value::Int(n * 2)),
///     _ => Ok(Value::Nil),
/// })
/// .with_arity(1);
/// ```
#[derive(Clone)]
pub struct NativeFn {
    name: String,
    arity: Option<usize>,
    handler: NativeHandler,
}

impl NativeFn {
    /// Wraps an async host function
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<Value>> + 'static,
    {
        NativeFn {
            name: name.into(),
            arity: None,
            handler: Rc::new(move |args: Vec<Value>| f(args).boxed_local()),
        }
    }

    /// Wraps a host function that completes immediately
    pub fn sync<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        NativeFn {
            name: name.into(),
            arity: None,
            handler: Rc::new(move |args: Vec<Value>| future::ready(f(&args)).boxed_local()),
        }
    }

    /// Requires exactly `arity` arguments
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Required argument count, `None` for variadic
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }
}

#[async_trait(?Send)]
impl Function for NativeFn {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, args: Vec<Value>) -> Result<Value> {
        if let Some(arity) = self.arity {
            if args.len() != arity {
                return Err(Error::invalid_arguments(
                    self.name.clone(),
                    format!("expected {} arguments, got {}", arity, args.len()),
                ));
            }
        }
        (self.handler)(args).await
    }
}

/// Named values to install into an environment
pub struct Library {
    entries: BTreeMap<String, Value>,
}

impl Library {
    /// Create a library holding the `core/` and `internal/` functions
    pub fn new() -> Self {
        let mut library = Library::empty();

        stdlib::register_all(&mut library);

        library
    }

    /// Create an empty library, for host additions
    pub fn empty() -> Self {
        Library {
            entries: BTreeMap::new(),
        }
    }

    /// Register a function under its own name
    pub fn register<F: Function + 'static>(&mut self, f: F) {
        let name = f.name().to_string();
        self.entries.insert(name, Value::function(f));
    }

    /// Register any value under `name`
    pub fn register_value(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    /// Get an entry by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Check if an entry exists
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// List all names, sorted
    pub fn list_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Get entry count
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Binds every entry in `env`
    pub fn install(&self, env: &Environment) {
        for (name, value) in &self.entries {
            env.define(name.clone(), value.clone());
        }
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sync_fn() {
        let f = NativeFn::sync("first", |args| Ok(args.first().cloned().unwrap_or(Value::Nil)));
        assert_eq!(f.call(vec![Value::Int(42)]).await.unwrap(), Value::Int(42));
        assert_eq!(f.call(vec![]).await.unwrap(), Value::Nil);
    }

    #[tokio::test]
    async fn test_async_fn() {
        let f = NativeFn::new("later", |args: Vec<Value>| async move {
            tokio::task::yield_now().await;
            Ok(Value::Int(args.len() as i64))
        });
        assert_eq!(
            f.call(vec![Value::Nil, Value::Nil]).await.unwrap(),
            Value::Int(2)
        );
    }

    #[tokio::test]
    async fn test_arity_is_checked() {
        let f = NativeFn::sync("one", |_| Ok(Value::Nil)).with_arity(1);
        let err = f.call(vec![]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { .. }));
    }

    #[test]
    fn test_registry_creation() {
        let library = Library::new();
        assert!(library.has("core/str"));
        assert!(library.has("internal/vec"));
        assert!(!library.has("if"));
    }

    #[test]
    fn test_empty_library() {
        let mut library = Library::empty();
        assert_eq!(library.count(), 0);

        library.register(NativeFn::sync("yield", |_| Ok(Value::Nil)));
        library.register_value("answer", Value::Int(42));
        assert_eq!(library.list_names(), vec!["answer", "yield"]);
    }

    #[test]
    fn test_install_binds_entries() {
        let mut library = Library::empty();
        library.register_value("answer", Value::Int(42));
        let env = Environment::new();
        library.install(&env);
        assert_eq!(env.get("answer").unwrap(), Value::Int(42));
    }
}
