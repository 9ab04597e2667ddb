use async_trait::async_trait;
use futures_util::FutureExt;

use crate::error::{Error, Result};
use crate::parser::{Node, NodeKind};
use crate::runtime::apply::apply_to_forms;
use crate::runtime::callable::{EvalFuture, Function};
use crate::runtime::macros::macro_expand;
use crate::runtime::{Environment, Value};

/// Node kinds evaluated by applying a named function to the node itself
///
/// `{:a 1}` evaluates exactly as `(internal/map :a 1)` would, except that
/// the form sees the map node rather than a list.
const SUGAR_SYNTAX: &[(NodeKind, &str)] = &[
    (NodeKind::VarQuote, "internal/macro-var"),
    (NodeKind::Deref, "core/deref"),
    (NodeKind::UnquoteSplicing, "core/unquote-splicing"),
    (NodeKind::Unquote, "core/unquote"),
    (NodeKind::Keyword, "core/keyword"),
    (NodeKind::Map, "internal/map"),
    (NodeKind::Set, "internal/set"),
    (NodeKind::Vector, "internal/vec"),
    (NodeKind::Document, "do"),
];

/// Name of the function a sugar node kind desugars to
pub fn sugar_target(kind: NodeKind) -> Option<&'static str> {
    SUGAR_SYNTAX
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, name)| *name)
}

/// Evaluates a node in `env`
///
/// The node is macro-expanded first. Any failure gets attributed to the
/// innermost node that raised it and picks up an `at:` line for every
/// frame it passes through.
pub fn evaluate<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let form = macro_expand(node, env);
        tracing::trace!(kind = %form.kind(), "evaluating node");
        eval_form(&form, env).await.map_err(|e| e.at(&form))
    }
    .boxed_local()
}

async fn eval_form(form: &Node, env: &Environment) -> Result<Value> {
    match form.kind() {
        NodeKind::Var => match form.binding() {
            Some(var) => Ok(Value::Var(var.clone())),
            None => Err(Error::CannotEvaluate { kind: form.kind() }),
        },
        NodeKind::Quote => match form.first() {
            Some(quoted) => Ok(Value::Node(quoted.clone())),
            None => Err(Error::invalid_arguments("quote", "nothing to quote")),
        },
        NodeKind::String => decode_string(form),
        NodeKind::Number | NodeKind::NegNumber => decode_number(form),
        NodeKind::HexLiteral => decode_hex(form),
        NodeKind::Symbol | NodeKind::ParamName => {
            let name = form.text().unwrap_or_default();
            env.get(&name)
        }
        NodeKind::Lambda => anonymous_fn(form, env),
        NodeKind::List => eval_list(form, env).await,
        kind => match sugar_target(kind) {
            Some(name) => {
                let f = env.get(name)?;
                apply_to_forms(form, &f, env, form.children()).await
            }
            None => Err(Error::CannotEvaluate { kind }),
        },
    }
}

async fn eval_list(form: &Node, env: &Environment) -> Result<Value> {
    let expanded: Vec<Node> = form
        .children()
        .iter()
        .map(|child| macro_expand(child, env))
        .collect();
    let Some((head, args)) = expanded.split_first() else {
        return Err(Error::invalid_arguments("()", "cannot call an empty list"));
    };
    let f = evaluate(head, env).await?;
    apply_to_forms(form, &f, env, args).await
}

fn literal_text(form: &Node) -> String {
    form.text().unwrap_or_default()
}

fn invalid_literal(form: &Node) -> Error {
    Error::InvalidLiteral {
        text: literal_text(form),
    }
}

fn decode_string(form: &Node) -> Result<Value> {
    // Raw line breaks and tabs inside a literal are allowed
    let text = literal_text(form)
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    serde_json::from_str::<String>(&text)
        .map(Value::String)
        .map_err(|_| invalid_literal(form))
}

fn decode_number(form: &Node) -> Result<Value> {
    let number: serde_json::Number =
        serde_json::from_str(&literal_text(form)).map_err(|_| invalid_literal(form))?;
    if let Some(n) = number.as_i64() {
        Ok(Value::Int(n))
    } else if let Some(f) = number.as_f64() {
        Ok(Value::Float(f))
    } else {
        Err(invalid_literal(form))
    }
}

fn decode_hex(form: &Node) -> Result<Value> {
    let text = literal_text(form);
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| invalid_literal(form))?;
    i64::from_str_radix(digits, 16)
        .map(Value::Int)
        .map_err(|_| invalid_literal(form))
}

/// `#(f % %2)`: a function whose parameters are `%`, `%1`, `%2`, ...
struct AnonymousFn {
    form: Node,
    head: Node,
    args: Vec<Node>,
    /// Highest `%n` the body mentions
    params: usize,
    env: Environment,
}

/// Highest positional parameter referenced under `nodes`, `%` counting as `%1`
fn max_param_index(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node.kind() {
            NodeKind::ParamName => match node.text().as_deref() {
                Some("%") => 1,
                Some(text) => text
                    .strip_prefix('%')
                    .and_then(|n| n.parse::<usize>().ok())
                    .unwrap_or(0),
                None => 0,
            },
            // nested `#()` bodies have their own parameters
            NodeKind::Lambda => 0,
            _ => max_param_index(node.children()),
        })
        .max()
        .unwrap_or(0)
}

fn anonymous_fn(form: &Node, env: &Environment) -> Result<Value> {
    let mut children = form.children().iter().map(|child| macro_expand(child, env));
    let Some(head) = children.next() else {
        return Err(Error::invalid_arguments("#()", "missing function position"));
    };
    let args: Vec<Node> = children.collect();
    let params = max_param_index(form.children());
    tracing::debug!(form = %form, params, "created anonymous fn");
    Ok(Value::function(AnonymousFn {
        form: form.clone(),
        head,
        args,
        params,
        env: env.clone(),
    }))
}

#[async_trait(?Send)]
impl Function for AnonymousFn {
    fn name(&self) -> &str {
        "#()"
    }

    async fn call(&self, args: Vec<Value>) -> Result<Value> {
        let scope = self.env.child();
        // referenced parameters past the supplied arguments are nil
        let count = self.params.max(args.len());
        let mut args = args.into_iter();
        for n in 1..=count {
            let arg = args.next().unwrap_or(Value::Nil);
            if n == 1 {
                scope.define("%", arg.clone());
            }
            scope.define(format!("%{}", n), arg);
        }
        // the head resolves in the defining scope, arguments in the call scope
        let result = match evaluate(&self.head, &self.env).await {
            Ok(f) => apply_to_forms(&self.form, &f, &scope, &self.args).await,
            Err(e) => Err(e),
        };
        result.map_err(|e| e.at(&self.form))
    }
}
