//! Tests for macro expansion

use quoll::{Interpreter, NodeKind, Value};

fn expand_each(interpreter: &Interpreter, source: &str) -> String {
    let parsed = interpreter.parse(source);
    assert!(parsed.is_clean(), "{:?}", parsed.syntax_errors);
    parsed
        .document
        .children()
        .iter()
        .map(|form| interpreter.macro_expand(form).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_member_shorthand_expands_to_dot_form() {
    let interpreter = Interpreter::new();
    assert_eq!(expand_each(&interpreter, "(.obj t)"), "(. t obj)");
    assert_eq!(
        expand_each(&interpreter, "(.substring s 2 5)"),
        "(. s substring 2 5)"
    );
}

#[test]
fn test_var_quote_prints_unchanged() {
    let interpreter = Interpreter::new();
    assert_eq!(
        expand_each(&interpreter, "(def a 1) #'a"),
        "(def a 1) #'a"
    );
}

#[test]
fn test_plain_forms_are_returned_as_is() {
    let interpreter = Interpreter::new();
    let parsed = interpreter.parse("(f x) [1 2] :k");
    for form in parsed.document.children() {
        assert!(interpreter.macro_expand(form).ptr_eq(form));
    }
}

#[tokio::test]
async fn test_var_quote_captures_value_at_expansion() {
    let interpreter = Interpreter::new();
    interpreter.eval_str("(def a 1)").await.unwrap();

    let parsed = interpreter.parse("#'a");
    let expanded = interpreter.macro_expand(&parsed.document.children()[0]);
    assert_eq!(expanded.kind(), NodeKind::Var);

    interpreter.eval_str("(def a 2)").await.unwrap();
    let var = expanded.binding().unwrap();
    assert_eq!(var.value(), Value::Int(1));
    assert_eq!(var.qualified_name(), "a");
}

#[tokio::test]
async fn test_namespaced_var_quote() {
    let interpreter = Interpreter::new();
    let value = interpreter.eval_str("#'core/str").await.unwrap();
    match value {
        Value::Var(var) => {
            assert_eq!(var.ns(), Some("core"));
            assert_eq!(var.name(), "str");
        }
        other => panic!("expected var, got {other:?}"),
    }
    assert_eq!(
        interpreter.eval_str("#'core/str").await.unwrap().to_string(),
        "#'core/str"
    );
}

#[tokio::test]
async fn test_expansion_happens_at_every_evaluated_level() {
    let interpreter = Interpreter::new();
    let value = interpreter
        .eval_str(r#"(let [s "quoll"] (.toUpperCase (.substring s 0 2)))"#)
        .await
        .unwrap();
    assert_eq!(value, Value::string("QU"));
}
