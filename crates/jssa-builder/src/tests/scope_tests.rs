use super::*;
use jssa_ast::{Expr, ForInit, Function, Stmt, VarKind, VariableDeclaration, VariableDeclarator};

fn id(name: &str) -> Expr {
    Expr::ident(name)
}

fn nested(name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
    Stmt::function(Function::new(Some(name), params, body))
}

fn bindings<'a>(scope: &ScopeInfo<'a>) -> Vec<(&'a str, Binding)> {
    scope.bindings().collect()
}

#[test]
fn test_hoists_vars_in_first_occurrence_order() {
    let for_init = ForInit::Var(VariableDeclaration {
        kind: VarKind::Var,
        declarations: vec![VariableDeclarator {
            id: id("e"),
            init: None,
        }],
    });
    let params = [id("a"), id("b")];
    let body = vec![
        Stmt::var("c", None),
        Stmt::if_(
            id("x"),
            Stmt::block(vec![Stmt::var("a", None), Stmt::var("d", None)]),
            None,
        ),
        Stmt::for_(Some(for_init), None, None, Stmt::Empty),
        Stmt::var("c", Some(Expr::num(1.0))),
        nested("f", &[], vec![Stmt::var("inner", None)]),
    ];

    let scope = ScopeInfo::analyze(None, &params, &body).unwrap();

    assert_eq!(scope.params, ["a", "b"]);
    assert_eq!(scope.vars, ["c", "d", "e"]);
    assert_eq!(scope.functions.len(), 1);
    assert_eq!(scope.functions[0].name(), Some("f"));
    assert_eq!(
        bindings(&scope),
        [
            ("a", Binding::Local),
            ("b", Binding::Local),
            ("c", Binding::Local),
            ("d", Binding::Local),
            ("e", Binding::Local),
            ("f", Binding::Local),
        ]
    );
    assert_eq!(scope.lookup("inner"), None);
    assert_eq!(scope.context_size(), 0);
}

#[test]
fn test_let_and_const_are_not_hoisted() {
    let body = vec![Stmt::Var(VariableDeclaration {
        kind: VarKind::Let,
        declarations: vec![VariableDeclarator {
            id: id("a"),
            init: None,
        }],
    })];

    let scope = ScopeInfo::analyze(None, &[], &body).unwrap();
    assert!(scope.vars.is_empty());
    assert_eq!(scope.lookup("a"), None);
}

#[test]
fn test_captured_names_get_slots_in_declaration_order() {
    let body = vec![
        Stmt::var("a", None),
        Stmt::var("b", None),
        Stmt::var("c", None),
        nested(
            "g",
            &[],
            vec![Stmt::ret(Some(Expr::binary(
                id("c"),
                jssa_ast::BinaryOperator::Add,
                id("a"),
            )))],
        ),
    ];

    let scope = ScopeInfo::analyze(None, &[], &body).unwrap();

    assert_eq!(scope.lookup("a"), Some(Binding::Context(0)));
    assert_eq!(scope.lookup("b"), Some(Binding::Local));
    assert_eq!(scope.lookup("c"), Some(Binding::Context(1)));
    assert_eq!(scope.lookup("g"), Some(Binding::Local));
    assert_eq!(scope.context_size(), 2);
}

#[test]
fn test_capture_through_several_function_levels() {
    let inner = Expr::function(Function::new(None, &[], vec![Stmt::ret(Some(id("a")))]));
    let body = vec![
        Stmt::var("a", None),
        nested("g", &[], vec![Stmt::ret(Some(inner))]),
    ];

    let scope = ScopeInfo::analyze(None, &[], &body).unwrap();
    assert_eq!(scope.lookup("a"), Some(Binding::Context(0)));
}

#[test]
fn test_write_from_nested_function_captures() {
    let body = vec![
        Stmt::var("a", None),
        nested("g", &[], vec![Stmt::expr(Expr::assign(id("a"), Expr::num(1.0)))]),
    ];

    let scope = ScopeInfo::analyze(None, &[], &body).unwrap();
    assert_eq!(scope.lookup("a"), Some(Binding::Context(0)));
}

#[test]
fn test_nested_declarations_shadow_outer_names() {
    let body = vec![
        Stmt::var("a", None),
        Stmt::var("b", None),
        Stmt::var("h", None),
        nested("g", &["a"], vec![Stmt::var("b", None), Stmt::ret(Some(id("a")))]),
        Stmt::expr(Expr::function(Function::new(
            Some("h"),
            &[],
            vec![Stmt::ret(Some(id("h")))],
        ))),
        nested("k", &[], vec![Stmt::expr(Expr::assign(id("b"), id("a")))]),
    ];

    let scope = ScopeInfo::analyze(None, &[], &body).unwrap();

    // `h` inside `function h` is the function itself.
    assert_eq!(scope.lookup("h"), Some(Binding::Local));
    // `k` reads `a` and writes `b`, neither of which it declares.
    assert_eq!(scope.lookup("a"), Some(Binding::Context(0)));
    assert_eq!(scope.lookup("b"), Some(Binding::Context(1)));
    assert_eq!(scope.context_size(), 2);
}

#[test]
fn test_own_name_read_from_nested_function_gets_last_slot() {
    let sum = Expr::binary(id("f"), jssa_ast::BinaryOperator::Add, id("x"));
    let body = vec![Stmt::var("x", None), nested("g", &[], vec![Stmt::ret(Some(sum))])];

    let scope = ScopeInfo::analyze(Some("f"), &[], &body).unwrap();

    assert!(scope.is_self("f"));
    assert_eq!(scope.lookup("x"), Some(Binding::Context(0)));
    assert_eq!(scope.self_slot(), Some(1));
    assert_eq!(scope.context_size(), 2);
}

#[test]
fn test_own_name_without_nested_reference_has_no_slot() {
    let body = vec![
        Stmt::ret(Some(Expr::call(id("f"), vec![]))),
        nested("g", &[], vec![Stmt::expr(Expr::assign(id("f"), Expr::num(1.0)))]),
    ];

    let scope = ScopeInfo::analyze(Some("f"), &[], &body).unwrap();

    assert!(scope.is_self("f"));
    assert_eq!(scope.self_slot(), None);
    assert_eq!(scope.context_size(), 0);
}

#[test]
fn test_declaration_shadows_own_name() {
    let body = vec![Stmt::var("f", None)];
    let scope = ScopeInfo::analyze(Some("f"), &[], &body).unwrap();

    assert_eq!(scope.self_name, None);
    assert!(!scope.is_self("f"));
    assert_eq!(scope.lookup("f"), Some(Binding::Local));
}

#[test]
fn test_pattern_parameter_is_unsupported() {
    let params = [Expr::member(id("a"), "b")];
    let err = ScopeInfo::analyze(None, &params, &[]).unwrap_err();
    assert_eq!(
        err,
        BuildError::Unsupported {
            kind: "parameter pattern MemberExpression".to_string()
        }
    );
}
