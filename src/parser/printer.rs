//! Writes nodes back as source-like text

use std::fmt;

use super::ast::{Node, NodeKind};

fn join(children: &[Node]) -> String {
    children
        .iter()
        .map(print_node)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a node in reader syntax
///
/// Quoted data round-trips: printing the node read from `(a [b] {:c 1})`
/// yields the same text. Kinds without a surface form print a `#_(?? ...)`
/// placeholder instead of failing.
pub fn print_node(node: &Node) -> String {
    let children = node.children();
    match node.kind() {
        NodeKind::List => format!("({})", join(children)),
        NodeKind::Vector => format!("[{}]", join(children)),
        NodeKind::Map => format!("{{{}}}", join(children)),
        NodeKind::Set => format!("#{{{}}}", join(children)),
        NodeKind::Lambda => format!("#({})", join(children)),
        NodeKind::Var => match node.binding() {
            Some(var) => format!("#'{}", var.qualified_name()),
            None => "#'?".to_string(),
        },
        NodeKind::Quote => format!("'{}", join(children)),
        NodeKind::Backtick => format!("`{}", join(children)),
        NodeKind::Unquote => format!("~{}", join(children)),
        NodeKind::UnquoteSplicing => format!("~@{}", join(children)),
        NodeKind::Deref => format!("@{}", join(children)),
        NodeKind::VarQuote => format!("#'{}", join(children)),
        NodeKind::Tag => format!("^{}", join(children)),
        NodeKind::Document => join(children),
        NodeKind::Symbol
        | NodeKind::ParamName
        | NodeKind::Keyword
        | NodeKind::Number
        | NodeKind::NegNumber
        | NodeKind::HexLiteral
        | NodeKind::String => node.text().unwrap_or_default(),
        NodeKind::SyntaxError => format!(
            "#_(?? {} {} ???)",
            node.kind(),
            node.text().unwrap_or_default()
        ),
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_node(self))
    }
}
