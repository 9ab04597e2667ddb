//! `core/` functions and forms

use futures_util::FutureExt;

use crate::error::{Error, Result};
use crate::parser::{Node, NodeKind};
use crate::runtime::{
    apply_to_values, form_args, interop, materialize, BuiltinForm, Environment, EvalFuture,
    Value,
};
use crate::tools::{Library, NativeFn};

/// Register all `core/` entries
pub fn register(library: &mut Library) {
    // Forms that need their arguments unevaluated
    library.register_value("core/apply", Value::special(BuiltinForm::new("core/apply", apply)));
    library.register_value("core/var", Value::special(BuiltinForm::new("core/var", var)));
    library.register_value("core/quote", Value::special(BuiltinForm::new("core/quote", quote)));
    library.register_value(
        "core/keyword",
        Value::special(BuiltinForm::new("core/keyword", keyword)),
    );
    library.register_value(
        "core/unquote",
        Value::special(BuiltinForm::new("core/unquote", unquote)),
    );
    library.register_value(
        "core/unquote-splicing",
        Value::special(BuiltinForm::new("core/unquote-splicing", unquote)),
    );

    // Plain functions
    library.register(
        NativeFn::sync("core/get", |args| Ok(interop::get_by_key(&args[0], &args[1]))).with_arity(2),
    );
    library.register(NativeFn::sync("core/deref", |args| args[0].deref()).with_arity(1));
    library.register(NativeFn::sync("core/str", concat));
}

/// `(core/apply f [args...])`
fn apply<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let mut values = materialize(form_args(node), env).await?.into_iter();
        let (Some(f), Some(args), None) = (values.next(), values.next(), values.next()) else {
            return Err(Error::invalid_arguments(
                "core/apply",
                "expected a function and an argument vector",
            ));
        };
        apply_to_values(node, &f, env, args.to_seq()?).await
    }
    .boxed_local()
}

/// `(core/var name)`: the var bound to `name`, unevaluated
fn var<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let Some(name_node) = form_args(node).first() else {
            return Err(Error::invalid_arguments("core/var", "missing name"));
        };
        let name = name_node.symbol_text()?;
        match env.get_var(&name) {
            Some(var) => Ok(Value::Var(var)),
            None => Err(Error::UndefinedVariable {
                name,
                in_scope: env.local_names(),
            }),
        }
    }
    .boxed_local()
}

/// `(core/quote form)`
fn quote<'a>(node: &'a Node, _env: &'a Environment) -> EvalFuture<'a> {
    async move {
        Ok(form_args(node)
            .first()
            .map(|quoted| Value::Node(quoted.clone()))
            .unwrap_or(Value::Nil))
    }
    .boxed_local()
}

/// `:name` literals, or `(core/keyword "name")`
fn keyword<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        if node.kind() == NodeKind::Keyword {
            return Ok(Value::keyword(&node.text().unwrap_or_default()));
        }
        let args = materialize(form_args(node), env).await?;
        match args.as_slice() {
            [Value::String(name)] => Ok(Value::keyword(name)),
            [Value::Keyword(k)] => Ok(Value::Keyword(k.clone())),
            _ => Err(Error::invalid_arguments("core/keyword", "expected a name string")),
        }
    }
    .boxed_local()
}

/// `~x` and `~@x` outside of a syntax quote
fn unquote<'a>(node: &'a Node, _env: &'a Environment) -> EvalFuture<'a> {
    async move {
        Err(Error::runtime(format!(
            "{} is only valid inside a syntax quote",
            node.text().unwrap_or_else(|| "unquote".to_string())
        )))
    }
    .boxed_local()
}

/// `(core/str a b ...)`: concatenation, strings unquoted and `nil` empty
fn concat(args: &[Value]) -> Result<Value> {
    Ok(Value::String(
        args.iter().map(Value::to_display_string).collect(),
    ))
}
