//! Decoding of ESTree JSON into the typed tree.
//!
//! The input is the JSON produced by ESTree parsers such as esprima or acorn.
//! Nodes are dispatched on their `type` field. Node kinds outside the
//! supported subset decode to `Stmt::Unsupported` / `Expr::Unsupported`;
//! only structurally broken JSON (missing or mistyped fields of a supported
//! node) is a decode error.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::node::*;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{node}: missing field `{field}`")]
    MissingField { node: String, field: &'static str },
    #[error("{node}: field `{field}` has an unexpected shape")]
    InvalidField { node: String, field: &'static str },
    #[error("expected an ESTree node object")]
    NotANode,
}

type Result<T> = std::result::Result<T, DecodeError>;

impl Program {
    /// Decode an ESTree `Program` from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Decode an ESTree `Program` (or a bare array of statements).
    pub fn from_value(value: &Value) -> Result<Self> {
        let body = match value {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("body") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(DecodeError::InvalidField {
                        node: node_type(map).to_string(),
                        field: "body",
                    });
                }
                None => {
                    return Err(DecodeError::MissingField {
                        node: node_type(map).to_string(),
                        field: "body",
                    });
                }
            },
            _ => return Err(DecodeError::NotANode),
        };
        let body = body.iter().map(decode_stmt).collect::<Result<_>>()?;
        Ok(Self { body })
    }
}

impl<'de> Deserialize<'de> for Program {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Stmt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_stmt(&value).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_expr(&value).map_err(serde::de::Error::custom)
    }
}

// =========================================================================
// Field access helpers
// =========================================================================

struct Node<'a> {
    kind: &'a str,
    map: &'a Map<String, Value>,
}

fn node_type(map: &Map<String, Value>) -> &str {
    map.get("type").and_then(Value::as_str).unwrap_or("<untyped>")
}

impl<'a> Node<'a> {
    fn new(value: &'a Value) -> Result<Self> {
        let map = value.as_object().ok_or(DecodeError::NotANode)?;
        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::NotANode)?;
        Ok(Self { kind, map })
    }

    fn missing(&self, field: &'static str) -> DecodeError {
        DecodeError::MissingField {
            node: self.kind.to_string(),
            field,
        }
    }

    fn invalid(&self, field: &'static str) -> DecodeError {
        DecodeError::InvalidField {
            node: self.kind.to_string(),
            field,
        }
    }

    fn field(&self, field: &'static str) -> Result<&'a Value> {
        self.map.get(field).ok_or_else(|| self.missing(field))
    }

    /// Field that may be absent or `null`.
    fn optional(&self, field: &'static str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    fn str(&self, field: &'static str) -> Result<&'a str> {
        self.field(field)?
            .as_str()
            .ok_or_else(|| self.invalid(field))
    }

    fn flag(&self, field: &'static str) -> Result<bool> {
        match self.optional(field) {
            None => Ok(false),
            Some(v) => v.as_bool().ok_or_else(|| self.invalid(field)),
        }
    }

    fn array(&self, field: &'static str) -> Result<&'a Vec<Value>> {
        self.field(field)?
            .as_array()
            .ok_or_else(|| self.invalid(field))
    }

    fn expr(&self, field: &'static str) -> Result<Box<Expr>> {
        decode_expr(self.field(field)?).map(Box::new)
    }

    fn opt_expr(&self, field: &'static str) -> Result<Option<Expr>> {
        self.optional(field).map(decode_expr).transpose()
    }

    fn stmt(&self, field: &'static str) -> Result<Box<Stmt>> {
        decode_stmt(self.field(field)?).map(Box::new)
    }

    fn exprs(&self, field: &'static str) -> Result<Vec<Expr>> {
        self.array(field)?.iter().map(decode_expr).collect()
    }

    fn ident(&self, field: &'static str) -> Result<Identifier> {
        let node = Node::new(self.field(field)?)?;
        if node.kind != "Identifier" {
            return Err(self.invalid(field));
        }
        Ok(Identifier::new(node.str("name")?))
    }

    fn opt_ident(&self, field: &'static str) -> Result<Option<Identifier>> {
        match self.optional(field) {
            None => Ok(None),
            Some(_) => self.ident(field).map(Some),
        }
    }

    fn operator<T>(&self, parse: fn(&str) -> Option<T>) -> Result<Option<T>> {
        Ok(parse(self.str("operator")?))
    }
}

// =========================================================================
// Statements
// =========================================================================

fn decode_stmt(value: &Value) -> Result<Stmt> {
    let node = Node::new(value)?;
    Ok(match node.kind {
        "VariableDeclaration" => Stmt::Var(decode_var_declaration(&node)?),
        "FunctionDeclaration" => Stmt::Function(decode_function(&node)?),
        "ExpressionStatement" => Stmt::Expr(*node.expr("expression")?),
        "BlockStatement" => Stmt::Block(decode_body(&node)?),
        "EmptyStatement" => Stmt::Empty,
        "IfStatement" => Stmt::If {
            test: *node.expr("test")?,
            consequent: node.stmt("consequent")?,
            alternate: node
                .optional("alternate")
                .map(|v| decode_stmt(v).map(Box::new))
                .transpose()?,
        },
        "WhileStatement" => Stmt::While {
            test: *node.expr("test")?,
            body: node.stmt("body")?,
        },
        "DoWhileStatement" => Stmt::DoWhile {
            body: node.stmt("body")?,
            test: *node.expr("test")?,
        },
        "ForStatement" => Stmt::For {
            init: node.optional("init").map(decode_for_init).transpose()?,
            test: node.opt_expr("test")?,
            update: node.opt_expr("update")?,
            body: node.stmt("body")?,
        },
        "BreakStatement" => Stmt::Break(node.opt_ident("label")?),
        "ContinueStatement" => Stmt::Continue(node.opt_ident("label")?),
        "ReturnStatement" => Stmt::Return(node.opt_expr("argument")?),
        "LabeledStatement" => Stmt::Labeled {
            label: node.ident("label")?,
            body: node.stmt("body")?,
        },
        other => Stmt::Unsupported(other.to_string()),
    })
}

fn decode_body(node: &Node<'_>) -> Result<Vec<Stmt>> {
    node.array("body")?.iter().map(decode_stmt).collect()
}

fn decode_var_declaration(node: &Node<'_>) -> Result<VariableDeclaration> {
    let kind = match node.str("kind")? {
        "var" => VarKind::Var,
        "let" => VarKind::Let,
        "const" => VarKind::Const,
        _ => return Err(node.invalid("kind")),
    };
    let declarations = node
        .array("declarations")?
        .iter()
        .map(|d| {
            let declarator = Node::new(d)?;
            Ok(VariableDeclarator {
                id: *declarator.expr("id")?,
                init: declarator.opt_expr("init")?,
            })
        })
        .collect::<Result<_>>()?;
    Ok(VariableDeclaration { kind, declarations })
}

fn decode_for_init(value: &Value) -> Result<ForInit> {
    let node = Node::new(value)?;
    if node.kind == "VariableDeclaration" {
        Ok(ForInit::Var(decode_var_declaration(&node)?))
    } else {
        decode_expr(value).map(ForInit::Expr)
    }
}

fn decode_function(node: &Node<'_>) -> Result<Function> {
    let body = Node::new(node.field("body")?)?;
    if body.kind != "BlockStatement" {
        return Err(node.invalid("body"));
    }
    Ok(Function {
        id: node.opt_ident("id")?,
        params: node.exprs("params")?,
        body: decode_body(&body)?,
        generator: node.flag("generator")?,
        is_async: node.flag("async")?,
    })
}

// =========================================================================
// Expressions
// =========================================================================

fn decode_expr(value: &Value) -> Result<Expr> {
    let node = Node::new(value)?;
    let unsupported = |detail: &str| Expr::Unsupported(format!("{}({detail})", node.kind));
    Ok(match node.kind {
        "Identifier" => Expr::ident(node.str("name")?),
        "Literal" => match decode_literal(&node)? {
            Some(literal) => Expr::Literal(literal),
            None => unsupported("regex"),
        },
        "ThisExpression" => Expr::This,
        "ArrayExpression" => Expr::Array(
            node.array("elements")?
                .iter()
                .map(|e| if e.is_null() { Ok(None) } else { decode_expr(e).map(Some) })
                .collect::<Result<_>>()?,
        ),
        "ObjectExpression" => {
            let entries = node.array("properties")?;
            // A spread (or any other non-`Property` member) rejects the literal.
            match entries.iter().map(Node::new).find(|e| !matches!(e, Ok(n) if n.kind == "Property")) {
                Some(entry) => Expr::Unsupported(entry?.kind.to_string()),
                None => Expr::Object(entries.iter().map(decode_property).collect::<Result<_>>()?),
            }
        }
        "FunctionExpression" => Expr::Function(Box::new(decode_function(&node)?)),
        "UnaryExpression" => match node.operator(UnaryOperator::parse)? {
            Some(operator) => Expr::Unary {
                operator,
                argument: node.expr("argument")?,
            },
            None => unsupported(node.str("operator")?),
        },
        "UpdateExpression" => match node.operator(UpdateOperator::parse)? {
            Some(operator) => Expr::Update {
                operator,
                prefix: node.flag("prefix")?,
                argument: node.expr("argument")?,
            },
            None => unsupported(node.str("operator")?),
        },
        "BinaryExpression" => match node.operator(BinaryOperator::parse)? {
            Some(operator) => Expr::Binary {
                operator,
                left: node.expr("left")?,
                right: node.expr("right")?,
            },
            None => unsupported(node.str("operator")?),
        },
        "LogicalExpression" => match node.operator(LogicalOperator::parse)? {
            Some(operator) => Expr::Logical {
                operator,
                left: node.expr("left")?,
                right: node.expr("right")?,
            },
            None => unsupported(node.str("operator")?),
        },
        "AssignmentExpression" => match node.operator(AssignOperator::parse)? {
            Some(operator) => Expr::Assign {
                operator,
                left: node.expr("left")?,
                right: node.expr("right")?,
            },
            None => unsupported(node.str("operator")?),
        },
        "ConditionalExpression" => Expr::Conditional {
            test: node.expr("test")?,
            consequent: node.expr("consequent")?,
            alternate: node.expr("alternate")?,
        },
        "SequenceExpression" => Expr::Sequence(node.exprs("expressions")?),
        "MemberExpression" => Expr::Member {
            object: node.expr("object")?,
            property: node.expr("property")?,
            computed: node.flag("computed")?,
        },
        "CallExpression" => Expr::Call {
            callee: node.expr("callee")?,
            arguments: node.exprs("arguments")?,
        },
        "NewExpression" => Expr::New {
            callee: node.expr("callee")?,
            arguments: node.exprs("arguments")?,
        },
        other => Expr::Unsupported(other.to_string()),
    })
}

/// Returns `None` for regular expression literals.
fn decode_literal(node: &Node<'_>) -> Result<Option<Literal>> {
    if node.optional("regex").is_some() {
        return Ok(None);
    }
    let literal = match node.map.get("value") {
        None | Some(Value::Null) => Literal::Null,
        Some(Value::Bool(b)) => Literal::Bool(*b),
        Some(Value::Number(n)) => Literal::Number(n.as_f64().ok_or_else(|| node.invalid("value"))?),
        Some(Value::String(s)) => Literal::String(s.clone()),
        // Some parsers serialize regex values as `{}`.
        Some(Value::Object(_)) => return Ok(None),
        Some(Value::Array(_)) => return Err(node.invalid("value")),
    };
    Ok(Some(literal))
}

fn decode_property(value: &Value) -> Result<Property> {
    let node = Node::new(value)?;
    if node.kind != "Property" {
        return Err(node.invalid("type"));
    }
    let kind = match node.optional("kind").and_then(Value::as_str).unwrap_or("init") {
        "init" => PropertyKind::Init,
        "get" => PropertyKind::Get,
        "set" => PropertyKind::Set,
        _ => return Err(node.invalid("kind")),
    };
    Ok(Property {
        key: *node.expr("key")?,
        value: *node.expr("value")?,
        kind,
        computed: node.flag("computed")?,
    })
}
