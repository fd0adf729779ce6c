use jssa_ast::*;
use serde_json::json;

fn decode(value: serde_json::Value) -> Program {
    Program::from_value(&value).expect("valid ESTree")
}

#[test]
fn test_decode_var_and_binary() {
    let program = decode(json!({
        "type": "Program",
        "body": [{
            "type": "VariableDeclaration",
            "kind": "var",
            "declarations": [{
                "type": "VariableDeclarator",
                "id": { "type": "Identifier", "name": "a" },
                "init": {
                    "type": "BinaryExpression",
                    "operator": "+",
                    "left": { "type": "Literal", "value": 1, "raw": "1" },
                    "right": { "type": "Identifier", "name": "b" }
                }
            }]
        }]
    }));

    assert_eq!(
        program.body,
        vec![Stmt::var(
            "a",
            Some(Expr::binary(Expr::num(1.0), BinaryOperator::Add, Expr::ident("b")))
        )]
    );
}

#[test]
fn test_decode_control_flow() {
    let program = decode(json!({
        "type": "Program",
        "body": [{
            "type": "LabeledStatement",
            "label": { "type": "Identifier", "name": "outer" },
            "body": {
                "type": "ForStatement",
                "init": null,
                "test": null,
                "update": {
                    "type": "UpdateExpression",
                    "operator": "++",
                    "prefix": false,
                    "argument": { "type": "Identifier", "name": "i" }
                },
                "body": {
                    "type": "IfStatement",
                    "test": { "type": "Identifier", "name": "done" },
                    "consequent": {
                        "type": "BreakStatement",
                        "label": { "type": "Identifier", "name": "outer" }
                    },
                    "alternate": null
                }
            }
        }]
    }));

    let expected = Stmt::labeled(
        "outer",
        Stmt::for_(
            None,
            None,
            Some(Expr::update(UpdateOperator::Increment, false, Expr::ident("i"))),
            Stmt::if_(Expr::ident("done"), Stmt::break_(Some("outer")), None),
        ),
    );
    assert_eq!(program.body, vec![expected]);
}

#[test]
fn test_decode_function_expression_call() {
    let program = decode(json!([{
        "type": "ExpressionStatement",
        "expression": {
            "type": "CallExpression",
            "callee": {
                "type": "FunctionExpression",
                "id": null,
                "params": [{ "type": "Identifier", "name": "x" }],
                "body": {
                    "type": "BlockStatement",
                    "body": [{
                        "type": "ReturnStatement",
                        "argument": { "type": "ThisExpression" }
                    }]
                },
                "generator": false,
                "async": false
            },
            "arguments": [{ "type": "Literal", "value": "s", "raw": "'s'" }]
        }
    }]));

    let function = Function::new(None, &["x"], vec![Stmt::ret(Some(Expr::this()))]);
    assert_eq!(
        program.body,
        vec![Stmt::expr(Expr::call(Expr::function(function), vec![Expr::string("s")]))]
    );
}

#[test]
fn test_unknown_kinds_decode_as_unsupported() {
    let program = decode(json!({
        "type": "Program",
        "body": [
            { "type": "TryStatement", "block": { "type": "BlockStatement", "body": [] } },
            {
                "type": "ExpressionStatement",
                "expression": { "type": "ArrowFunctionExpression", "params": [] }
            },
            {
                "type": "ExpressionStatement",
                "expression": {
                    "type": "Literal",
                    "value": {},
                    "raw": "/a/",
                    "regex": { "pattern": "a", "flags": "" }
                }
            },
            {
                "type": "ExpressionStatement",
                "expression": {
                    "type": "LogicalExpression",
                    "operator": "??",
                    "left": { "type": "Identifier", "name": "a" },
                    "right": { "type": "Identifier", "name": "b" }
                }
            }
        ]
    }));

    assert_eq!(
        program.body,
        vec![
            Stmt::Unsupported("TryStatement".into()),
            Stmt::expr(Expr::Unsupported("ArrowFunctionExpression".into())),
            Stmt::expr(Expr::Unsupported("Literal(regex)".into())),
            Stmt::expr(Expr::Unsupported("LogicalExpression(??)".into())),
        ]
    );
}

#[test]
fn test_object_properties_keep_kind_and_computed_flag() {
    let program = decode(json!([{
        "type": "ExpressionStatement",
        "expression": {
            "type": "ObjectExpression",
            "properties": [
                {
                    "type": "Property",
                    "key": { "type": "Literal", "value": 2, "raw": "2" },
                    "value": { "type": "Identifier", "name": "x" },
                    "kind": "init",
                    "computed": false
                },
                {
                    "type": "Property",
                    "key": { "type": "Identifier", "name": "y" },
                    "value": {
                        "type": "FunctionExpression",
                        "id": null,
                        "params": [],
                        "body": { "type": "BlockStatement", "body": [] }
                    },
                    "kind": "get",
                    "computed": false
                }
            ]
        }
    }]));

    let Stmt::Expr(Expr::Object(properties)) = &program.body[0] else {
        panic!("expected an object literal, got {:?}", program.body[0]);
    };
    assert_eq!(properties.len(), 2);
    assert_eq!(properties[0].key, Expr::num(2.0));
    assert_eq!(properties[0].kind, PropertyKind::Init);
    assert_eq!(properties[1].kind, PropertyKind::Get);
}

#[test]
fn test_object_spread_decodes_as_unsupported() {
    let program = decode(json!([{
        "type": "ExpressionStatement",
        "expression": {
            "type": "ObjectExpression",
            "properties": [
                {
                    "type": "Property",
                    "key": { "type": "Identifier", "name": "a" },
                    "value": { "type": "Literal", "value": 1, "raw": "1" },
                    "kind": "init",
                    "computed": false
                },
                {
                    "type": "SpreadElement",
                    "argument": { "type": "Identifier", "name": "rest" }
                }
            ]
        }
    }]));

    assert_eq!(program.body, vec![Stmt::expr(Expr::Unsupported("SpreadElement".into()))]);
}

#[test]
fn test_missing_field_is_reported() {
    let err = Program::from_value(&json!([{ "type": "IfStatement", "consequent": { "type": "EmptyStatement" } }]))
        .expect_err("test is required");
    assert!(matches!(
        err,
        DecodeError::MissingField { field: "test", .. }
    ));
    assert_eq!(err.to_string(), "IfStatement: missing field `test`");
}

#[test]
fn test_from_json_text_and_serde_entry_point() {
    let text = r#"{"type":"Program","body":[{"type":"EmptyStatement"}]}"#;
    let via_text = Program::from_json(text).expect("valid");
    let via_serde: Program = serde_json::from_str(text).expect("valid");
    assert_eq!(via_text, via_serde);
    assert_eq!(via_text.body, vec![Stmt::Empty]);

    assert!(matches!(Program::from_json("{"), Err(DecodeError::Json(_))));
}
