//! End-to-end evaluation tests
//!
//! Scripts report results through a host `yield` function that records its
//! argument and returns it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use quoll::runtime::HostObject;
use quoll::tools::NativeFn;
use quoll::{Interpreter, Value};

struct Harness {
    interpreter: Interpreter,
    yielded: Rc<RefCell<Vec<Value>>>,
}

impl Harness {
    fn new() -> Self {
        let yielded = Rc::new(RefCell::new(Vec::new()));
        let sink = yielded.clone();
        let interpreter = Interpreter::new();
        interpreter.define_host_fn(NativeFn::sync("yield", move |args| {
            let value = args.first().cloned().unwrap_or(Value::Nil);
            sink.borrow_mut().push(value.clone());
            Ok(value)
        }));
        Harness {
            interpreter,
            yielded,
        }
    }

    async fn run(&self, source: &str) -> Value {
        match self.interpreter.eval_str(source).await {
            Ok(value) => value,
            Err(e) => panic!("{source}\n{e}"),
        }
    }

    fn yielded(&self) -> Vec<Value> {
        self.yielded.borrow().clone()
    }

    /// Printed form of every yielded value
    fn printed(&self) -> Vec<String> {
        self.yielded().iter().map(|v| v.to_string()).collect()
    }
}

async fn yields(source: &str) -> Vec<Value> {
    let harness = Harness::new();
    harness.run(source).await;
    harness.yielded()
}

async fn prints(source: &str) -> String {
    let harness = Harness::new();
    harness.run(source).await;
    harness.printed().join(" ")
}

fn ints(values: &[i64]) -> Value {
    Value::vector(values.iter().map(|n| Value::Int(*n)).collect())
}

// =============================================================================
// Anonymous functions and apply
// =============================================================================

#[tokio::test]
async fn test_anonymous_fn_single_param() {
    assert_eq!(
        yields("(def the-fn #(yield %)) (the-fn 1)").await,
        vec![Value::Int(1)]
    );
}

#[tokio::test]
async fn test_anonymous_fn_numbered_param() {
    assert_eq!(
        yields("(def fun #(yield %2)) (fun 11 22)").await,
        vec![Value::Int(22)]
    );
}

#[tokio::test]
async fn test_apply_spreads_vector() {
    assert_eq!(
        yields("(core/apply #(yield %2) [11 22])").await,
        vec![Value::Int(22)]
    );
}

#[tokio::test]
async fn test_anonymous_fn_sees_defining_scope() {
    assert_eq!(
        yields("(def x 5) (def f #(yield [x %])) (let [x 6] (f 1))").await,
        vec![ints(&[5, 1])]
    );
}

#[tokio::test]
async fn test_anonymous_fn_with_special_form_head() {
    assert_eq!(
        prints("(def f #(if %1 :yes :no)) (yield (f false)) (yield (f 1))").await,
        ":no :yes"
    );
    assert_eq!(
        prints("(def pair (fn [a b] [a b])) (def g #(core/apply pair [%1 %2])) (yield (g 1 2))")
            .await,
        "[1 2]"
    );
    assert_eq!(
        yields("(def h #(do (yield %1) (yield %2))) (h 3 4)").await,
        vec![Value::Int(3), Value::Int(4)]
    );
    assert_eq!(
        prints("(def k #(let [x %] (yield [x x]))) (k 7)").await,
        "[7 7]"
    );
}

#[tokio::test]
async fn test_anonymous_fn_missing_params_are_nil() {
    assert_eq!(
        yields("(def f #(yield [%1 %2 %3])) (f 1)").await,
        vec![Value::vector(vec![Value::Int(1), Value::Nil, Value::Nil])]
    );
    assert_eq!(yields("(def g #(yield %)) (g)").await, vec![Value::Nil]);
}

// =============================================================================
// Member access
// =============================================================================

#[tokio::test]
async fn test_method_stored_in_map() {
    assert_eq!(
        yields(r#"(def obj {:age 28, :greet #(core/str "Hi " %)}) (yield (.greet obj "Bob"))"#)
            .await,
        vec![Value::string("Hi Bob")]
    );
}

#[tokio::test]
async fn test_property_access() {
    assert_eq!(
        yields("(def obj {:age 28}) (yield (.-age obj))").await,
        vec![Value::Int(28)]
    );
    assert_eq!(
        yields("(def obj {:age 28}) (yield (.-height obj))").await,
        vec![Value::Nil]
    );
}

#[tokio::test]
async fn test_builtin_methods() {
    assert_eq!(yields("(yield (.toString 1))").await, vec![Value::string("1")]);
    assert_eq!(
        yields("(yield (.has #{:aKey} :aKey))").await,
        vec![Value::Bool(true)]
    );
    assert_eq!(
        yields(r#"(yield (.substring "Hello" 1 3))"#).await,
        vec![Value::string("el")]
    );
    assert_eq!(
        yields(r#"(yield (. "abc" -length))"#).await,
        vec![Value::Int(3)]
    );
}

#[derive(Debug)]
struct Account {
    owner: String,
    balance: i64,
}

impl HostObject for Account {
    fn type_name(&self) -> &str {
        "Account"
    }

    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "owner" => Some(Value::string(self.owner.clone())),
            "balance" => Some(Value::Int(self.balance)),
            _ => None,
        }
    }
}

#[tokio::test]
async fn test_host_object_members() {
    let harness = Harness::new();
    harness.interpreter.define(
        "acct",
        Value::object(Account {
            owner: "ann".into(),
            balance: 40,
        }),
    );
    harness
        .run(r#"(yield (.-balance acct)) (yield (core/get acct "owner")) (yield (.toString acct))"#)
        .await;
    assert_eq!(
        harness.yielded(),
        vec![
            Value::Int(40),
            Value::string("ann"),
            Value::string("#<Account>")
        ]
    );
}

// =============================================================================
// Reader sugar
// =============================================================================

#[tokio::test]
async fn test_discard_inside_vector() {
    assert_eq!(
        yields("(yield [1 2 3 #_ 4 5])").await,
        vec![ints(&[1, 2, 3, 5])]
    );
}

#[tokio::test]
async fn test_collection_literals() {
    assert_eq!(
        prints(r#"(yield {:a 1 "b" [true nil]}) (yield #{1 2 1})"#).await,
        r#"{:a 1 "b" [true nil]} #{1 2}"#
    );
}

#[tokio::test]
async fn test_core_get() {
    assert_eq!(
        yields("(yield (core/get {:a 1} :a)) (yield (core/get [7 8] 1)) (yield (core/get nil :a))")
            .await,
        vec![Value::Int(1), Value::Int(8), Value::Nil]
    );
}

// =============================================================================
// Quoting prints the original form
// =============================================================================

#[tokio::test]
async fn test_quoted_forms_print_as_written() {
    let cases = [
        ("(yield '(a thing))", "(a thing)"),
        ("(yield #'yield)", "#'yield"),
        ("(yield (core/var yield))", "#'yield"),
        ("(yield ':hola)", ":hola"),
        (r#"(yield '"str")"#, r#""str""#),
        ("(yield '123)", "123"),
        ("(yield '[1 3])", "[1 3]"),
        ("(yield '@b)", "@b"),
        ("(yield '{})", "{}"),
        ("(yield '{:a 1 :b 1})", "{:a 1 :b 1}"),
        ("(yield '#(a-thing (str %)))", "#(a-thing (str %))"),
        (
            "(yield '`(let [and# ~x] (if and# (and ~@next) and#)))",
            "`(let [and# ~x] (if and# (and ~@next) and#))",
        ),
        ("(yield (core/quote (x y)))", "(x y)"),
    ];
    for (source, expected) in cases {
        assert_eq!(prints(source).await, expected, "{source}");
    }
}

// =============================================================================
// Vars
// =============================================================================

#[tokio::test]
async fn test_var_quote_and_deref() {
    assert_eq!(
        yields("(def a 1) (def b #'a) (yield [a @b])").await,
        vec![ints(&[1, 1])]
    );
}

#[tokio::test]
async fn test_var_snapshot_ignores_local_shadowing() {
    assert_eq!(
        yields("(def a 999) (def c #'a) (let [a 1 b 2 c @c] (yield [a b c]))").await,
        vec![ints(&[1, 2, 999])]
    );
}

#[tokio::test]
async fn test_var_snapshot_ignores_redefinition() {
    assert_eq!(
        yields("(def a 1) (def b #'a) (def a 2) (yield [a @b])").await,
        vec![ints(&[2, 1])]
    );
}

#[tokio::test]
async fn test_def_returns_var() {
    assert_eq!(prints("(yield (def z 5))").await, "#'z");
}

#[tokio::test]
async fn test_def_metadata() {
    let harness = Harness::new();
    harness
        .run(r#"(def documented "Says hi" 1) (def ^{:private true :doc "tag"} tagged "doc" 2)"#)
        .await;

    let env = harness.interpreter.env();
    let documented = env.get_var("documented").unwrap();
    assert_eq!(documented.value(), Value::Int(1));
    assert_eq!(
        documented.meta().get(":doc"),
        Some(&Value::string("Says hi"))
    );

    let tagged = env.get_var("tagged").unwrap();
    assert_eq!(tagged.meta().get(":private"), Some(&Value::Bool(true)));
    assert_eq!(tagged.meta().get(":doc"), Some(&Value::string("tag")));
}

#[tokio::test]
async fn test_def_without_value_binds_nil() {
    assert_eq!(yields("(def empty) (yield empty)").await, vec![Value::Nil]);
}

// =============================================================================
// Special forms
// =============================================================================

#[tokio::test]
async fn test_if_evaluates_only_chosen_branch() {
    assert_eq!(
        yields("(if true (yield 1) (yield 2)) (if nil (yield 3) (yield 4)) (if false (yield 5))")
            .await,
        vec![Value::Int(1), Value::Int(4)]
    );
    // the untaken branch may reference unknown names
    assert_eq!(
        yields("(if 0 (yield :zero-is-truthy) (undefined-fn))").await,
        vec![Value::keyword("zero-is-truthy")]
    );
}

#[tokio::test]
async fn test_do_returns_last_value() {
    let harness = Harness::new();
    assert_eq!(harness.run("(do (yield 1) (yield 2) 3)").await, Value::Int(3));
    assert_eq!(harness.yielded(), vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(harness.run("(do)").await, Value::Nil);
}

#[tokio::test]
async fn test_document_returns_last_value() {
    let harness = Harness::new();
    assert_eq!(harness.run("1 2 :three").await, Value::keyword("three"));
    assert_eq!(harness.run("").await, Value::Nil);
}

#[tokio::test]
async fn test_fn_closures() {
    assert_eq!(
        yields("(def x 1) (def f (fn [] x)) (let [x 2] (yield (f)))").await,
        vec![Value::Int(1)]
    );
}

#[tokio::test]
async fn test_fn_argument_binding() {
    assert_eq!(
        prints("(def f (fn [a b] (yield [a b]))) (f 1) (f 1 2 3)").await,
        "[1 nil] [1 2]"
    );
}

#[tokio::test]
async fn test_fn_body_is_implicit_do() {
    assert_eq!(
        yields("(def f (fn [a] (yield a) (yield :after))) (f 1)").await,
        vec![Value::Int(1), Value::keyword("after")]
    );
}

#[tokio::test]
async fn test_named_fn_recursion() {
    assert_eq!(
        yields(r#"((fn walk [items] (if items (walk nil) (yield "done"))) [1 2])"#).await,
        vec![Value::string("done")]
    );
}

#[tokio::test]
async fn test_let_bindings_are_sequential() {
    assert_eq!(
        yields("(let [a 1 b a] (yield [a b]))").await,
        vec![ints(&[1, 1])]
    );
}

#[tokio::test]
async fn test_let_shadowing_is_local() {
    assert_eq!(
        yields("(def a 1) (let [a 2] (yield a)) (yield a)").await,
        vec![Value::Int(2), Value::Int(1)]
    );
}

#[tokio::test]
async fn test_let_with_empty_body_is_nil() {
    let harness = Harness::new();
    assert_eq!(harness.run("(let [a 1])").await, Value::Nil);
}

// =============================================================================
// Host integration
// =============================================================================

#[tokio::test]
async fn test_async_host_function_is_awaited() {
    let harness = Harness::new();
    harness
        .interpreter
        .define_host_fn(NativeFn::new("slow-echo", |args: Vec<Value>| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(args.into_iter().next().unwrap_or(Value::Nil))
        }));

    harness
        .run("(yield :before) (yield (slow-echo 42)) (yield :after)")
        .await;
    assert_eq!(
        harness.yielded(),
        vec![
            Value::keyword("before"),
            Value::Int(42),
            Value::keyword("after")
        ]
    );
}

#[tokio::test]
async fn test_host_library_install() {
    let mut library = quoll::Library::empty();
    library.register_value("answer", Value::Int(42));
    let interpreter = Interpreter::with_library(&library);
    assert_eq!(
        interpreter.eval_str("answer").await.unwrap(),
        Value::Int(42)
    );
}

#[tokio::test]
async fn test_quoted_code_is_data() {
    let harness = Harness::new();
    let value = harness.run("'(f [1 2])").await;
    match value {
        Value::Node(node) => {
            assert_eq!(node.kind(), quoll::NodeKind::List);
            assert_eq!(node.children().len(), 2);
            // quoted nodes keep their source span
            assert_eq!(node.meta().start, Some(1));
        }
        other => panic!("expected a node, got {other:?}"),
    }
}
