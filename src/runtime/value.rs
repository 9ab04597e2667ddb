use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::parser::{Meta, Node};
use crate::runtime::callable::{Callable, Function, SpecialForm};
use crate::runtime::environment::Var;

/// Interned-style keyword such as `:a`
///
/// Stores the name without the leading colon.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Keyword(Rc<str>);

impl Keyword {
    /// Creates a keyword; a leading `:` is stripped
    pub fn new(name: &str) -> Self {
        Keyword(Rc::from(name.strip_prefix(':').unwrap_or(name)))
    }

    /// Name without the colon
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

/// Keys allowed in map values
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    /// `:name`
    Keyword(Keyword),
    /// `"name"`
    String(String),
}

impl TryFrom<&Value> for MapKey {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Keyword(k) => Ok(MapKey::Keyword(k.clone())),
            Value::String(s) => Ok(MapKey::String(s.clone())),
            other => Err(Error::InvalidMapKey {
                key: other.to_string(),
            }),
        }
    }
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        match key {
            MapKey::Keyword(k) => Value::Keyword(k),
            MapKey::String(s) => Value::String(s),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Keyword(k) => write!(f, "{}", k),
            MapKey::String(s) => write_quoted(f, s),
        }
    }
}

/// Host-side object exposed to scripts
///
/// Scripts reach its members with `(. obj -name)`, `(.name obj ...)` and
/// `(core/get obj "name")`.
pub trait HostObject: fmt::Debug {
    /// Name used in error messages
    fn type_name(&self) -> &str;

    /// Member lookup by name
    fn get(&self, name: &str) -> Option<Value>;
}

/// Runtime value representation
#[derive(Debug, Clone)]
pub enum Value {
    // Primitives
    /// `nil`, also stands in for "undefined"
    Nil,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Int(i64),
    /// 64-bit floating-point value
    Float(f64),
    /// String value
    String(String),
    /// Keyword value
    Keyword(Keyword),

    // Collections
    /// `[a b]`
    Vector(Rc<Vec<Value>>),
    /// `#{a b}`, without duplicates
    Set(Rc<Vec<Value>>),
    /// `{k v}`
    Map(Rc<BTreeMap<MapKey, Value>>),

    // Code as data
    /// Quoted syntax tree
    Node(Node),
    /// Binding cell, from `def`, `core/var` or `#'x`
    Var(Rc<Var>),

    // Callables and host data
    /// Special form or ordinary function
    Function(Callable),
    /// Host object
    Object(Rc<dyn HostObject>),
}

impl Value {
    /// Creates a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Creates a keyword value
    pub fn keyword(name: &str) -> Self {
        Value::Keyword(Keyword::new(name))
    }

    /// Creates a vector value
    pub fn vector(values: Vec<Value>) -> Self {
        Value::Vector(Rc::new(values))
    }

    /// Creates a set value, dropping duplicates (first occurrence wins)
    pub fn set(values: Vec<Value>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(values.len());
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Value::Set(Rc::new(unique))
    }

    /// Creates a map value
    pub fn map(entries: BTreeMap<MapKey, Value>) -> Self {
        Value::Map(Rc::new(entries))
    }

    /// Wraps an ordinary function
    pub fn function(f: impl Function + 'static) -> Self {
        Value::Function(Callable::Function(Rc::new(f)))
    }

    /// Wraps a special form
    pub fn special(form: impl SpecialForm + 'static) -> Self {
        Value::Function(Callable::Special(Rc::new(form)))
    }

    /// Wraps a host object
    pub fn object(obj: impl HostObject + 'static) -> Self {
        Value::Object(Rc::new(obj))
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Keyword(_) => "keyword".to_string(),
            Value::Vector(_) => "vector".to_string(),
            Value::Set(_) => "set".to_string(),
            Value::Map(_) => "map".to_string(),
            Value::Node(_) => "node".to_string(),
            Value::Var(_) => "var".to_string(),
            Value::Function(Callable::Special(_)) => "special-form".to_string(),
            Value::Function(Callable::Function(_)) => "function".to_string(),
            Value::Object(obj) => obj.type_name().to_string(),
        }
    }

    /// Only `nil` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Converts value to a 64-bit integer
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
            _ => Err(Error::UnexpectedNode {
                expected: "int".to_string(),
                got: self.type_name(),
            }),
        }
    }

    /// Borrows the string contents
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(Error::UnexpectedNode {
                expected: "string".to_string(),
                got: self.type_name(),
            }),
        }
    }

    /// Text used by string concatenation: strings unquoted, `nil` empty
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Nil => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Metadata of values that can carry it; empty for everything else
    pub fn meta(&self) -> Meta {
        match self {
            Value::Node(node) => node.meta().clone(),
            Value::Var(var) => var.meta().clone(),
            _ => Meta::new(),
        }
    }

    /// Value held by a var
    pub fn deref(&self) -> Result<Value> {
        match self {
            Value::Var(var) => Ok(var.value()),
            other => Err(Error::NotDerefable {
                value: other.to_string(),
            }),
        }
    }

    /// Elements of a sequential value, for `core/apply`
    pub fn to_seq(&self) -> Result<Vec<Value>> {
        match self {
            Value::Nil => Ok(Vec::new()),
            Value::Vector(items) | Value::Set(items) => Ok(items.as_ref().clone()),
            other => Err(Error::UnexpectedNode {
                expected: "vector".to_string(),
                got: other.type_name(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a.ptr_eq(b),
            (Value::Var(a), Value::Var(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    match serde_json::to_string(s) {
        Ok(quoted) => f.write_str(&quoted),
        Err(_) => write!(f, "{:?}", s),
    }
}

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a Value>,
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write_quoted(f, s),
            Value::Keyword(k) => write!(f, "{}", k),
            Value::Vector(items) => write_seq(f, "[", items.iter(), "]"),
            Value::Set(items) => write_seq(f, "#{", items.iter(), "}"),
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{} {}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Node(node) => write!(f, "{}", node),
            Value::Var(var) => write!(f, "#'{}", var.qualified_name()),
            Value::Function(callable) => write!(f, "#<fn {}>", callable.name()),
            Value::Object(obj) => write!(f, "#<{}>", obj.type_name()),
        }
    }
}
