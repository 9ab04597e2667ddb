//! Node rewrites applied before evaluation
//!
//! Only the node handed to [`macro_expand`] is rewritten; its children are
//! expanded when they are evaluated in turn.

use std::rc::Rc;

use crate::parser::{Node, NodeKind};
use crate::runtime::{Environment, Value, Var};

/// Applies one rewrite, or returns the same node when nothing applies
///
/// - `#'name` becomes a `Var` node holding a snapshot of the binding's
///   current value (`nil` when unbound).
/// - `(.member target args...)` becomes `(. target member args...)`.
pub fn macro_expand_1(node: &Node, env: &Environment) -> Node {
    let rewritten = match node.kind() {
        NodeKind::VarQuote => expand_var_quote(node, env),
        NodeKind::List => expand_member_call(node),
        _ => None,
    };
    rewritten.unwrap_or_else(|| node.clone())
}

/// Rewrites until the node stops changing
pub fn macro_expand(node: &Node, env: &Environment) -> Node {
    let mut current = node.clone();
    loop {
        let next = macro_expand_1(&current, env);
        if next.ptr_eq(&current) {
            return current;
        }
        tracing::trace!(from = %current, to = %next, "macro expanded");
        current = next;
    }
}

fn expand_var_quote(node: &Node, env: &Environment) -> Option<Node> {
    let name = node.first()?.text()?;
    let snapshot = match env.get_var(&name) {
        Some(var) => Var::new(var.qualified_name(), var.value()).with_meta(var.meta().clone()),
        None => Var::new(name, Value::Nil),
    };
    let meta = node.meta().clone();
    Some(Node::var(Rc::new(snapshot), meta))
}

fn expand_member_call(node: &Node) -> Option<Node> {
    let (head, tail) = node.children().split_first()?;
    if head.kind() != NodeKind::Symbol {
        return None;
    }
    let text = head.text()?;
    let member = text.strip_prefix('.').filter(|m| !m.is_empty())?;
    // `(.member)` has no target and is left alone
    let (target, args) = tail.split_first()?;

    let mut children = Vec::with_capacity(node.children().len() + 1);
    children.push(Node::symbol("."));
    children.push(target.clone());
    children.push(Node::symbol(member));
    children.extend(args.iter().cloned());

    let meta = node.meta().clone();
    Some(Node::list(children, meta))
}
