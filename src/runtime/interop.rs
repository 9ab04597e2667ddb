//! Member access on runtime values
//!
//! Backs `(. target member ...)`, its `(.member target ...)` sugar and
//! `core/get`. Data members are looked up first (map entries and host
//! object fields, by name and then as a keyword), then the built-in
//! methods of the target's type.

use crate::error::{Error, Result};
use crate::runtime::{Keyword, MapKey, Value};
use crate::tools::NativeFn;

/// Finds member `name` on `target`
///
/// Built-in methods come back as functions bound to `target`.
pub fn get_member(target: &Value, name: &str) -> Option<Value> {
    data_member(target, name)
        .or_else(|| keyword_member(target, name))
        .or_else(|| builtin_property(target, name))
        .or_else(|| builtin_method(target, name))
}

/// `core/get`: map entry, vector index or host object field; `nil` otherwise
pub fn get_by_key(target: &Value, key: &Value) -> Value {
    let found = match (target, key) {
        (Value::Map(entries), key) => MapKey::try_from(key)
            .ok()
            .and_then(|key| entries.get(&key).cloned()),
        (Value::Vector(items), Value::Int(index)) => usize::try_from(*index)
            .ok()
            .and_then(|index| items.get(index).cloned()),
        (Value::Object(obj), Value::String(name)) => obj.get(name),
        (Value::Object(obj), Value::Keyword(k)) => obj.get(&k.to_string()),
        _ => None,
    };
    found.unwrap_or(Value::Nil)
}

fn data_member(target: &Value, name: &str) -> Option<Value> {
    match target {
        Value::Map(entries) => entries.get(&MapKey::String(name.to_string())).cloned(),
        Value::Object(obj) => obj.get(name),
        _ => None,
    }
}

fn keyword_member(target: &Value, name: &str) -> Option<Value> {
    let keyword = Keyword::new(name);
    match target {
        Value::Map(entries) => entries.get(&MapKey::Keyword(keyword)).cloned(),
        Value::Object(obj) => obj.get(&keyword.to_string()),
        _ => None,
    }
}

fn builtin_property(target: &Value, name: &str) -> Option<Value> {
    let len = match (target, name) {
        (Value::String(s), "length") => s.chars().count(),
        (Value::Vector(items), "length") => items.len(),
        (Value::Set(items), "size") => items.len(),
        (Value::Map(entries), "size") => entries.len(),
        _ => return None,
    };
    Some(Value::Int(len as i64))
}

fn builtin_method(target: &Value, name: &str) -> Option<Value> {
    let method = match (target, name) {
        (_, "toString") => {
            let s = target.to_display_string();
            NativeFn::sync(name, move |_| Ok(Value::String(s.clone())))
        }
        (Value::String(s), _) => string_method(s, name)?,
        (Value::Vector(items), "includes") => {
            let items = items.clone();
            NativeFn::sync(name, move |args| Ok(Value::Bool(items.contains(&arg(args, 0)))))
        }
        (Value::Vector(items), "indexOf") => {
            let items = items.clone();
            NativeFn::sync(name, move |args| {
                let needle = arg(args, 0);
                let index = items.iter().position(|item| *item == needle);
                Ok(Value::Int(index.map_or(-1, |i| i as i64)))
            })
        }
        (Value::Vector(items), "join") => {
            let items = items.clone();
            NativeFn::sync(name, move |args| {
                let separator = match args.first() {
                    Some(sep) => sep.to_display_string(),
                    None => ",".to_string(),
                };
                let parts: Vec<String> = items.iter().map(Value::to_display_string).collect();
                Ok(Value::String(parts.join(&separator)))
            })
        }
        (Value::Set(items), "has") => {
            let items = items.clone();
            NativeFn::sync(name, move |args| Ok(Value::Bool(items.contains(&arg(args, 0)))))
        }
        (Value::Map(entries), "has") => {
            let entries = entries.clone();
            NativeFn::sync(name, move |args| {
                let found = MapKey::try_from(&arg(args, 0))
                    .map(|key| entries.contains_key(&key))
                    .unwrap_or(false);
                Ok(Value::Bool(found))
            })
        }
        _ => return None,
    };
    Some(Value::function(method))
}

/// Argument `index`, `nil` when absent
fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Nil)
}

fn string_arg<'a>(method: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(Error::invalid_arguments(
            method,
            format!("argument {} must be a string", index + 1),
        )),
    }
}

fn string_method(s: &str, name: &str) -> Option<NativeFn> {
    let s = s.to_string();
    let method = match name {
        "toUpperCase" => NativeFn::sync(name, move |_| Ok(Value::String(s.to_uppercase()))),
        "toLowerCase" => NativeFn::sync(name, move |_| Ok(Value::String(s.to_lowercase()))),
        "trim" => NativeFn::sync(name, move |_| Ok(Value::string(s.trim()))),
        "includes" => NativeFn::sync(name, move |args| {
            Ok(Value::Bool(s.contains(string_arg("includes", args, 0)?)))
        }),
        "startsWith" => NativeFn::sync(name, move |args| {
            Ok(Value::Bool(s.starts_with(string_arg("startsWith", args, 0)?)))
        }),
        "endsWith" => NativeFn::sync(name, move |args| {
            Ok(Value::Bool(s.ends_with(string_arg("endsWith", args, 0)?)))
        }),
        "split" => NativeFn::sync(name, move |args| {
            let separator = string_arg("split", args, 0)?;
            let parts = if separator.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(separator).map(Value::string).collect()
            };
            Ok(Value::vector(parts))
        }),
        "substring" => NativeFn::sync(name, move |args| substring(&s, args)),
        _ => return None,
    };
    Some(method)
}

/// Character range `[start, end)`; bounds are clamped and swapped if reversed
fn substring(s: &str, args: &[Value]) -> Result<Value> {
    let len = s.chars().count() as i64;
    let clamp = |v: i64| v.clamp(0, len) as usize;

    let start = clamp(arg(args, 0).as_int()?);
    let end = match args.get(1) {
        Some(Value::Nil) | None => len as usize,
        Some(end) => clamp(end.as_int()?),
    };
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(Value::String(s.chars().skip(from).take(to - from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Callable, Function, HostObject};
    use std::collections::BTreeMap;

    async fn call_method(target: &Value, name: &str, args: Vec<Value>) -> Value {
        match get_member(target, name) {
            Some(Value::Function(Callable::Function(f))) => f.call(args).await.unwrap(),
            other => panic!("no method {name}: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_string_methods() {
        let s = Value::string("Hello World");
        assert_eq!(
            call_method(&s, "substring", vec![Value::Int(2), Value::Int(5)]).await,
            Value::string("llo")
        );
        assert_eq!(
            call_method(&s, "substring", vec![Value::Int(5), Value::Int(2)]).await,
            Value::string("llo")
        );
        assert_eq!(
            call_method(&s, "toUpperCase", vec![]).await,
            Value::string("HELLO WORLD")
        );
        assert_eq!(
            call_method(&s, "split", vec![Value::string(" ")]).await,
            Value::vector(vec![Value::string("Hello"), Value::string("World")])
        );
        assert_eq!(get_member(&s, "length"), Some(Value::Int(11)));
    }

    #[tokio::test]
    async fn test_to_string_on_any_value() {
        assert_eq!(call_method(&Value::Int(1), "toString", vec![]).await, Value::string("1"));
        assert_eq!(
            call_method(&Value::keyword("k"), "toString", vec![]).await,
            Value::string(":k")
        );
    }

    #[tokio::test]
    async fn test_collection_methods() {
        let set = Value::set(vec![Value::keyword("aKey")]);
        assert_eq!(
            call_method(&set, "has", vec![Value::keyword("aKey")]).await,
            Value::Bool(true)
        );

        let vector = Value::vector(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(
            call_method(&vector, "indexOf", vec![Value::Int(2)]).await,
            Value::Int(1)
        );
        assert_eq!(
            call_method(&vector, "join", vec![Value::string("-")]).await,
            Value::string("1-2")
        );
    }

    #[test]
    fn test_map_lookup_falls_back_to_keyword() {
        let mut entries = BTreeMap::new();
        entries.insert(MapKey::Keyword(Keyword::new("age")), Value::Int(28));
        entries.insert(MapKey::String("name".into()), Value::string("Ann"));
        let map = Value::map(entries);

        assert_eq!(get_member(&map, "age"), Some(Value::Int(28)));
        assert_eq!(get_member(&map, "name"), Some(Value::string("Ann")));
        assert_eq!(get_member(&map, "missing"), None);
        assert_eq!(get_by_key(&map, &Value::keyword("age")), Value::Int(28));
        assert_eq!(get_by_key(&map, &Value::keyword("nope")), Value::Nil);
    }

    #[derive(Debug)]
    struct Point;

    impl HostObject for Point {
        fn type_name(&self) -> &str {
            "Point"
        }

        fn get(&self, name: &str) -> Option<Value> {
            match name {
                "x" => Some(Value::Int(3)),
                ":y" => Some(Value::Int(4)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_host_object_members() {
        let point = Value::object(Point);
        assert_eq!(get_member(&point, "x"), Some(Value::Int(3)));
        assert_eq!(get_member(&point, "y"), Some(Value::Int(4)));
        assert_eq!(get_by_key(&point, &Value::string("x")), Value::Int(3));
        assert!(get_member(&point, "z").is_none());
    }

    #[test]
    fn test_vector_index() {
        let vector = Value::vector(vec![Value::Int(10), Value::Int(20)]);
        assert_eq!(get_by_key(&vector, &Value::Int(1)), Value::Int(20));
        assert_eq!(get_by_key(&vector, &Value::Int(-1)), Value::Nil);
        assert_eq!(get_by_key(&Value::Nil, &Value::Int(0)), Value::Nil);
    }
}
