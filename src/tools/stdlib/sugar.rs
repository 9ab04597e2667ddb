//! `internal/` targets of reader sugar

use std::collections::BTreeMap;

use futures_util::FutureExt;

use crate::error::{Error, Result};
use crate::parser::Node;
use crate::runtime::{form_args, materialize, BuiltinForm, Environment, EvalFuture, MapKey, Value};
use crate::tools::{Library, NativeFn};

/// Register all `internal/` entries
pub fn register(library: &mut Library) {
    library.register(NativeFn::sync("internal/vec", |args| Ok(Value::vector(args.to_vec()))));
    library.register(NativeFn::sync("internal/set", |args| Ok(Value::set(args.to_vec()))));
    library.register_value(
        "internal/map",
        Value::special(BuiltinForm::new("internal/map", map)),
    );
    library.register_value(
        "internal/macro-var",
        Value::special(BuiltinForm::new("internal/macro-var", macro_var)),
    );
}

/// `{k v ...}`; the pair count is checked before anything is evaluated
fn map<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let forms = form_args(node);
        if forms.len() % 2 != 0 {
            return Err(Error::invalid_arguments(
                "internal/map",
                "a map literal needs an even number of forms",
            ));
        }
        let values = materialize(forms, env).await?;
        Ok(Value::map(entries(values)?))
    }
    .boxed_local()
}

fn entries(values: Vec<Value>) -> Result<BTreeMap<MapKey, Value>> {
    let mut map = BTreeMap::new();
    let mut values = values.into_iter();
    while let (Some(key), Some(value)) = (values.next(), values.next()) {
        map.insert(MapKey::try_from(&key)?, value);
    }
    Ok(map)
}

/// `#'name` when it reaches evaluation unexpanded: the live var
fn macro_var<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let Some(name_node) = form_args(node).first() else {
            return Err(Error::invalid_arguments("internal/macro-var", "missing name"));
        };
        let name = name_node.symbol_text()?;
        env.get_var(&name).map(Value::Var).ok_or_else(|| Error::UndefinedVariable {
            name,
            in_scope: env.local_names(),
        })
    }
    .boxed_local()
}
