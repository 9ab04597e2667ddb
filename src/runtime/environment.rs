use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::parser::Meta;
use crate::runtime::Value;

/// A named binding cell
///
/// Names such as `core/apply` are split into a namespace (`core`) and a
/// local name (`apply`); [`Var::qualified_name`] joins them back.
pub struct Var {
    name: String,
    ns: Option<String>,
    value: Value,
    meta: RefCell<Meta>,
}

impl Var {
    /// Creates a var holding `value`
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        let full: String = name.into();
        let (ns, name) = match full.split_once('/') {
            Some((ns, local)) if !ns.is_empty() && !local.is_empty() => {
                (Some(ns.to_string()), local.to_string())
            }
            _ => (None, full),
        };
        Var {
            name,
            ns,
            value,
            meta: RefCell::new(Meta::new()),
        }
    }

    /// Replaces the metadata
    pub fn with_meta(self, meta: Meta) -> Self {
        *self.meta.borrow_mut() = meta;
        self
    }

    /// Local name, without namespace
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace, if the name had one
    pub fn ns(&self) -> Option<&str> {
        self.ns.as_deref()
    }

    /// `ns/name`, or just `name`
    pub fn qualified_name(&self) -> String {
        match &self.ns {
            Some(ns) => format!("{}/{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// The held value
    pub fn value(&self) -> Value {
        self.value.clone()
    }

    /// Borrow the var's metadata
    pub fn meta(&self) -> Ref<'_, Meta> {
        self.meta.borrow()
    }

    /// Merges `meta` onto the var; later keys win
    pub fn attach_meta(&self, meta: &Meta) {
        self.meta.borrow_mut().merge(meta);
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#'{} = {}", self.qualified_name(), self.value)
    }
}

struct Scope {
    /// Vars defined in this frame
    variables: RefCell<HashMap<String, Rc<Var>>>,
    /// Enclosing frame (None for the root)
    parent: Option<Environment>,
}

/// Lexical environment: a frame of vars plus an optional parent
///
/// Cloning is cheap and shares the frame, so closures capture the
/// environment they were created in by cloning it.
#[derive(Clone)]
pub struct Environment(Rc<Scope>);

impl Environment {
    /// Creates an empty root environment
    ///
    /// Use [`Environment::base`] for one with the core forms installed.
    pub fn new() -> Self {
        Environment(Rc::new(Scope {
            variables: RefCell::new(HashMap::new()),
            parent: None,
        }))
    }

    /// Creates a child frame whose lookups fall through to `self`
    pub fn child(&self) -> Environment {
        Environment(Rc::new(Scope {
            variables: RefCell::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    /// The enclosing frame
    pub fn parent(&self) -> Option<&Environment> {
        self.0.parent.as_ref()
    }

    /// Binds `name` to a fresh var in this frame
    ///
    /// Redefining a name replaces the binding; vars already captured
    /// elsewhere keep their old value.
    pub fn define(&self, name: impl Into<String>, value: Value) -> Rc<Var> {
        let name = name.into();
        let var = Rc::new(Var::new(name.clone(), value));
        self.define_var(name, var.clone());
        var
    }

    /// Binds `name` to an existing var in this frame
    pub fn define_var(&self, name: impl Into<String>, var: Rc<Var>) {
        self.0.variables.borrow_mut().insert(name.into(), var);
    }

    /// Finds the var for `name`, walking from this frame outward
    pub fn get_var(&self, name: &str) -> Option<Rc<Var>> {
        let mut scope = self;
        loop {
            if let Some(var) = scope.0.variables.borrow().get(name) {
                return Some(var.clone());
            }
            match &scope.0.parent {
                Some(parent) => scope = parent,
                None => return None,
            }
        }
    }

    /// Gets the value bound to `name`
    ///
    /// The error lists the names bound in this frame only.
    pub fn get(&self, name: &str) -> Result<Value> {
        match self.get_var(name) {
            Some(var) => Ok(var.value()),
            None => Err(Error::UndefinedVariable {
                name: name.to_string(),
                in_scope: self.local_names(),
            }),
        }
    }

    /// Checks if a name is bound in this frame or any parent
    pub fn exists(&self, name: &str) -> bool {
        self.get_var(name).is_some()
    }

    /// Names bound directly in this frame, sorted
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.variables.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of frames from here to the root (1 for a root)
    pub fn scope_depth(&self) -> usize {
        let mut depth = 1;
        let mut scope = self;
        while let Some(parent) = &scope.0.parent {
            depth += 1;
            scope = parent;
        }
        depth
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("depth", &self.scope_depth())
            .field("names", &self.local_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_define_and_get() {
        let env = Environment::new();
        env.define("x", Value::Int(42));

        assert_eq!(env.get("x").unwrap(), Value::Int(42));
    }

    #[test]
    fn test_undefined_variable() {
        let env = Environment::new();
        env.define("b", Value::Nil);
        env.define("a", Value::Nil);

        let err = env.get("undefined").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Variable not set 'undefined' variables in scope: a, b"
        );
    }

    #[test]
    fn test_undefined_variable_lists_only_local_frame() {
        let root = Environment::new();
        root.define("outer", Value::Nil);
        let child = root.child();
        child.define("inner", Value::Nil);

        match child.get("missing").unwrap_err() {
            Error::UndefinedVariable { in_scope, .. } => {
                assert_eq!(in_scope, vec!["inner".to_string()])
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_nested_scopes() {
        let env = Environment::new();
        env.define("x", Value::Int(1));

        let inner = env.child();
        inner.define("y", Value::Int(2));

        let innermost = inner.child();
        innermost.define("z", Value::Int(3));

        assert_eq!(innermost.get("x").unwrap(), Value::Int(1));
        assert_eq!(innermost.get("y").unwrap(), Value::Int(2));
        assert_eq!(innermost.get("z").unwrap(), Value::Int(3));

        assert!(inner.get("z").is_err());
        assert!(env.get("y").is_err());
    }

    #[test]
    fn test_variable_shadowing() {
        let env = Environment::new();
        env.define("x", Value::Int(10));

        let inner = env.child();
        inner.define("x", Value::String("shadowed".to_string()));

        assert_eq!(
            inner.get("x").unwrap(),
            Value::String("shadowed".to_string())
        );
        assert_eq!(env.get("x").unwrap(), Value::Int(10));
    }

    #[test]
    fn test_child_sees_later_parent_definitions() {
        let env = Environment::new();
        let inner = env.child();
        env.define("late", Value::Int(7));

        assert_eq!(inner.get("late").unwrap(), Value::Int(7));
    }

    #[test]
    fn test_redefinition_replaces_binding_not_captured_var() {
        let env = Environment::new();
        let first = env.define("x", Value::Int(1));
        env.define("x", Value::Int(2));

        assert_eq!(first.value(), Value::Int(1));
        assert_eq!(env.get("x").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_exists() {
        let env = Environment::new();
        assert!(!env.exists("x"));

        env.define("x", Value::Int(42));
        assert!(env.exists("x"));

        let inner = env.child();
        assert!(inner.exists("x"));
        inner.define("y", Value::Int(10));
        assert!(!env.exists("y"));
    }

    #[test]
    fn test_scope_depth() {
        let env = Environment::new();
        assert_eq!(env.scope_depth(), 1);
        let inner = env.child();
        assert_eq!(inner.scope_depth(), 2);
        assert_eq!(inner.child().scope_depth(), 3);
        assert!(inner.parent().unwrap().ptr_eq(&env));
    }

    #[test]
    fn test_var_namespace_split() {
        let var = Var::new("core/apply", Value::Nil);
        assert_eq!(var.ns(), Some("core"));
        assert_eq!(var.name(), "apply");
        assert_eq!(var.qualified_name(), "core/apply");

        let plain = Var::new("yield", Value::Nil);
        assert_eq!(plain.ns(), None);
        assert_eq!(plain.qualified_name(), "yield");

        // a lone slash is a name, not a namespace separator
        assert_eq!(Var::new("/", Value::Nil).qualified_name(), "/");
    }
}
