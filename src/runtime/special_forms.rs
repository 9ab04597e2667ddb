//! Core special forms: `if`, `do`, `def`, `.`, `fn` and `let`
//!
//! Each form receives its calling node unevaluated and decides what to
//! evaluate and when.

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::error::{Error, Result};
use crate::parser::{Meta, Node, NodeKind};
use crate::runtime::apply::{apply_to_values, form_args, materialize};
use crate::runtime::callable::{BuiltinForm, EvalFuture, Function, SpecialHandler};
use crate::runtime::evaluator::evaluate;
use crate::runtime::interop;
use crate::runtime::{Environment, Value};

const SPECIAL_FORMS: &[(&str, SpecialHandler)] = &[
    ("if", eval_if),
    ("do", eval_do),
    ("def", eval_def),
    (".", eval_member),
    ("fn", eval_fn),
    ("let", eval_let),
];

/// Binds the core special forms in `env`
pub fn install(env: &Environment) {
    for (name, handler) in SPECIAL_FORMS {
        env.define(*name, Value::special(BuiltinForm::new(*name, *handler)));
    }
}

/// Wraps several body forms in `(do ...)`
fn implicit_do(body: &[Node], meta: Meta) -> Node {
    let mut children = Vec::with_capacity(body.len() + 1);
    children.push(Node::symbol("do"));
    children.extend(body.iter().cloned());
    Node::list(children, meta)
}

async fn eval_body(node: &Node, body: &[Node], env: &Environment) -> Result<Value> {
    match body {
        [] => Ok(Value::Nil),
        [single] => evaluate(single, env).await,
        many => {
            let meta = node.meta().clone();
            evaluate(&implicit_do(many, meta), env).await
        }
    }
}

fn unexpected(expected: &str, node: &Node) -> Error {
    Error::UnexpectedNode {
        expected: expected.to_string(),
        got: node.kind().to_string(),
    }
    .attribute(node)
}

/// `(if cond then else?)`; only the chosen branch is evaluated
fn eval_if<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let args = form_args(node);
        let Some(condition) = args.first() else {
            return Err(Error::invalid_arguments("if", "missing condition"));
        };
        let branch = if evaluate(condition, env).await?.is_truthy() {
            args.get(1)
        } else {
            args.get(2)
        };
        match branch {
            Some(branch) => evaluate(branch, env).await,
            None => Ok(Value::Nil),
        }
    }
    .boxed_local()
}

/// `(do a b c)`; also evaluates whole documents
fn eval_do<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let mut values = materialize(form_args(node), env).await?;
        Ok(values.pop().unwrap_or(Value::Nil))
    }
    .boxed_local()
}

/// `(def name)`, `(def name value)`, `(def name "doc" value)`
///
/// The name may be tagged, as in `(def ^{:private true} name value)`;
/// tag entries are merged after the docstring and win on conflicts.
fn eval_def<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let (name_node, doc_node, value_node) = match form_args(node) {
            [] => return Err(Error::invalid_arguments("def", "missing name")),
            [name] => (name, None, None),
            [name, value] => (name, None, Some(value)),
            [name, doc, value] => (name, Some(doc), Some(value)),
            _ => {
                return Err(Error::invalid_arguments(
                    "def",
                    "expected (def name doc? value?)",
                ))
            }
        };

        let (tag_node, symbol) = match name_node.kind() {
            NodeKind::Tag => match (name_node.first(), name_node.second()) {
                (Some(tag), Some(target)) if target.kind() == NodeKind::Symbol => {
                    (Some(tag), target)
                }
                _ => return Err(unexpected("symbol", name_node)),
            },
            NodeKind::Symbol => (None, name_node),
            _ => return Err(unexpected("symbol", name_node)),
        };
        let name = symbol.symbol_text()?;

        let mut meta = Meta::new();
        if let Some(doc_node) = doc_node {
            if doc_node.kind() == NodeKind::String {
                meta.insert(":doc", evaluate(doc_node, env).await?);
            }
        }
        if let Some(tag_node) = tag_node {
            let tag = evaluate(tag_node, env).await?;
            meta.merge(&Meta::from_value(&tag).map_err(|e| e.attribute(tag_node))?);
        }

        let value = match value_node {
            Some(value_node) => evaluate(value_node, env).await?,
            None => Value::Nil,
        };

        let var = env.define(name.clone(), value);
        var.attach_meta(&meta);
        tracing::debug!(name = %name, "defined var");
        Ok(Value::Var(var))
    }
    .boxed_local()
}

/// `(. target member args...)` and `(. target -property)`
fn eval_member<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let [target_node, member_node, arg_nodes @ ..] = form_args(node) else {
            return Err(Error::invalid_arguments(".", "expected (. target member args...)"));
        };
        let member = member_node
            .symbol_text()
            .map_err(|e| e.attribute(member_node))?;
        let target = evaluate(target_node, env).await?;

        if let Some(property) = member.strip_prefix('-') {
            return Ok(interop::get_member(&target, property).unwrap_or(Value::Nil));
        }

        let Some(method) = interop::get_member(&target, &member) else {
            return Err(Error::MissingMember {
                name: member,
                type_name: target.type_name(),
            });
        };
        let args = materialize(arg_nodes, env).await?;
        apply_to_values(node, &method, env, args).await
    }
    .boxed_local()
}

/// A closure created by `fn`
#[derive(Clone)]
pub struct Lambda {
    name: Option<String>,
    params: Vec<String>,
    body: Node,
    env: Environment,
}

#[async_trait(?Send)]
impl Function for Lambda {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("fn")
    }

    async fn call(&self, args: Vec<Value>) -> Result<Value> {
        let scope = self.env.child();
        if let Some(name) = &self.name {
            scope.define(name.clone(), Value::function(self.clone()));
        }
        // missing arguments are nil, extra ones are ignored
        let mut args = args.into_iter();
        for param in &self.params {
            scope.define(param.clone(), args.next().unwrap_or(Value::Nil));
        }
        evaluate(&self.body, &scope).await
    }
}

/// `(fn name? [params...] body...)`
fn eval_fn<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let mut rest = form_args(node);
        let mut name = None;
        if let Some(first) = rest.first().filter(|n| n.kind() == NodeKind::Symbol) {
            name = Some(first.symbol_text()?);
            rest = &rest[1..];
        }

        let Some((params_node, body)) = rest.split_first() else {
            return Err(Error::invalid_arguments("fn", "missing parameters vector"));
        };
        if params_node.kind() != NodeKind::Vector {
            return Err(unexpected("parameters vector", params_node));
        }
        let params = params_node
            .children()
            .iter()
            .map(|param| param.symbol_text().map_err(|e| e.attribute(param)))
            .collect::<Result<Vec<_>>>()?;

        let body = match body {
            [] => return Err(Error::invalid_arguments("fn", "missing body")),
            [single] => single.clone(),
            many => implicit_do(many, node.meta().clone()),
        };

        tracing::debug!(name = ?name, arity = params.len(), "created fn");
        Ok(Value::function(Lambda {
            name,
            params,
            body,
            env: env.clone(),
        }))
    }
    .boxed_local()
}

/// `(let [name value ...] body...)`; each binding sees the ones before it
fn eval_let<'a>(node: &'a Node, env: &'a Environment) -> EvalFuture<'a> {
    async move {
        let Some((bindings, body)) = form_args(node).split_first() else {
            return Err(Error::invalid_arguments("let", "missing bindings vector"));
        };
        if bindings.kind() != NodeKind::Vector {
            return Err(unexpected("bindings vector", bindings));
        }
        if bindings.children().len() % 2 != 0 {
            return Err(Error::invalid_arguments(
                "let",
                "bindings need an even number of forms",
            )
            .attribute(bindings));
        }

        let scope = env.child();
        for pair in bindings.children().chunks(2) {
            let name = pair[0].symbol_text().map_err(|e| e.attribute(&pair[0]))?;
            let value = evaluate(&pair[1], &scope).await?;
            scope.define(name, value);
        }
        eval_body(node, body, &scope).await
    }
    .boxed_local()
}
