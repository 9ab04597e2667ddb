use crate::error::{Error, Result};
use crate::parser::{Node, NodeKind};
use crate::runtime::callable::Callable;
use crate::runtime::evaluator::evaluate;
use crate::runtime::{Environment, Value};

/// Argument nodes of a special-form invocation
///
/// For a list call or a `#(..)` body the head is skipped; for sugar nodes
/// (`[..]`, `{..}`, documents) every child is an argument.
pub fn form_args(node: &Node) -> &[Node] {
    match node.kind() {
        NodeKind::List | NodeKind::Lambda => node.children().get(1..).unwrap_or(&[]),
        _ => node.children(),
    }
}

/// Evaluates each node in order, stopping at the first failure
pub async fn materialize(forms: &[Node], env: &Environment) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(forms.len());
    for form in forms {
        values.push(evaluate(form, env).await?);
    }
    Ok(values)
}

fn callable(f: &Value) -> Result<&Callable> {
    match f {
        Value::Function(callable) => Ok(callable),
        other => Err(Error::NotCallable {
            type_name: other.type_name(),
        }),
    }
}

/// Applies `f` to argument forms
///
/// Special forms get `node` and `env` untouched; functions get the
/// materialized `args`. Errors are attributed to `node` unless something
/// deeper already claimed them.
pub async fn apply_to_forms(
    node: &Node,
    f: &Value,
    env: &Environment,
    args: &[Node],
) -> Result<Value> {
    let result = match callable(f) {
        Ok(Callable::Special(form)) => form.invoke(node, env).await,
        Ok(Callable::Function(func)) => match materialize(args, env).await {
            Ok(values) => func.call(values).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    result.map_err(|e| e.attribute(node))
}

/// Applies `f` to already-evaluated arguments
///
/// A special form still receives `node`, so this is only meaningful for
/// functions; `core/apply` and member calls use it.
pub async fn apply_to_values(
    node: &Node,
    f: &Value,
    env: &Environment,
    args: Vec<Value>,
) -> Result<Value> {
    let result = match callable(f) {
        Ok(Callable::Special(form)) => form.invoke(node, env).await,
        Ok(Callable::Function(func)) => func.call(args).await,
        Err(e) => Err(e),
    };
    result.map_err(|e| e.attribute(node))
}
