//! Syntax tree nodes
//!
//! The tree follows the ESTree shape for the ECMAScript 5 subset the SSA
//! builder understands. Anything outside that subset is preserved as an
//! `Unsupported` node carrying the ESTree node kind, so callers get a precise
//! diagnostic from the builder instead of a decode failure.

/// Root of a syntax tree: the body of the top-level function.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Function declaration or function expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Own name. Inside the body it refers to the function itself.
    pub id: Option<Identifier>,
    /// Parameter patterns; only plain identifiers are lowered.
    pub params: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub generator: bool,
    pub is_async: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Let => "let",
            Self::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub kind: VarKind,
    pub declarations: Vec<VariableDeclarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// Binding pattern; only plain identifiers are lowered.
    pub id: Expr,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var(VariableDeclaration),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    // =========================================================================
    // Declarations
    // =========================================================================
    Var(VariableDeclaration),
    Function(Function),

    // =========================================================================
    // Statements
    // =========================================================================
    Expr(Expr),
    Block(Vec<Stmt>),
    Empty,
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    Break(Option<Identifier>),
    Continue(Option<Identifier>),
    Return(Option<Expr>),
    Labeled {
        label: Identifier,
        body: Box<Stmt>,
    },

    /// Statement kind outside the supported subset (ESTree `type`).
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

/// Object literal member: `key: value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: Expr,
    pub value: Expr,
    pub kind: PropertyKind,
    pub computed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // =========================================================================
    // Primary expressions
    // =========================================================================
    Ident(Identifier),
    Literal(Literal),
    This,
    /// Array literal; `None` marks a hole (`[1, , 3]`).
    Array(Vec<Option<Expr>>),
    Object(Vec<Property>),
    Function(Box<Function>),

    // =========================================================================
    // Operators
    // =========================================================================
    Unary {
        operator: UnaryOperator,
        argument: Box<Expr>,
    },
    Update {
        operator: UpdateOperator,
        prefix: bool,
        argument: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        operator: AssignOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Sequence(Vec<Expr>),

    // =========================================================================
    // Access and calls
    // =========================================================================
    /// `object.property` when `computed` is false, `object[property]` otherwise.
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },

    /// Expression kind outside the supported subset (ESTree `type`).
    Unsupported(String),
}

// =========================================================================
// Operators
// =========================================================================

macro_rules! operator_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Source spelling of the operator.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parse the ESTree `operator` field.
            pub fn parse(text: &str) -> Option<Self> {
                match text {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operator_enum!(BinaryOperator {
    Eq => "==",
    NotEq => "!=",
    StrictEq => "===",
    StrictNotEq => "!==",
    Lt => "<",
    LtEq => "<=",
    Gt => ">",
    GtEq => ">=",
    Shl => "<<",
    Shr => ">>",
    UShr => ">>>",
    Add => "+",
    Sub => "-",
    Mul => "*",
    Div => "/",
    Mod => "%",
    BitOr => "|",
    BitXor => "^",
    BitAnd => "&",
    In => "in",
    InstanceOf => "instanceof",
});

operator_enum!(LogicalOperator {
    Or => "||",
    And => "&&",
});

operator_enum!(UnaryOperator {
    Minus => "-",
    Plus => "+",
    Not => "!",
    BitNot => "~",
    TypeOf => "typeof",
    Void => "void",
    Delete => "delete",
});

operator_enum!(UpdateOperator {
    Increment => "++",
    Decrement => "--",
});

operator_enum!(AssignOperator {
    Assign => "=",
    AddAssign => "+=",
    SubAssign => "-=",
    MulAssign => "*=",
    DivAssign => "/=",
    ModAssign => "%=",
    ShlAssign => "<<=",
    ShrAssign => ">>=",
    UShrAssign => ">>>=",
    BitOrAssign => "|=",
    BitXorAssign => "^=",
    BitAndAssign => "&=",
});

impl UpdateOperator {
    /// Arithmetic performed by the update: `+` for `++`, `-` for `--`.
    pub fn binary(self) -> BinaryOperator {
        match self {
            Self::Increment => BinaryOperator::Add,
            Self::Decrement => BinaryOperator::Sub,
        }
    }
}

impl AssignOperator {
    /// Operator applied before storing, `None` for plain `=`.
    pub fn binary(self) -> Option<BinaryOperator> {
        Some(match self {
            Self::Assign => return None,
            Self::AddAssign => BinaryOperator::Add,
            Self::SubAssign => BinaryOperator::Sub,
            Self::MulAssign => BinaryOperator::Mul,
            Self::DivAssign => BinaryOperator::Div,
            Self::ModAssign => BinaryOperator::Mod,
            Self::ShlAssign => BinaryOperator::Shl,
            Self::ShrAssign => BinaryOperator::Shr,
            Self::UShrAssign => BinaryOperator::UShr,
            Self::BitOrAssign => BinaryOperator::BitOr,
            Self::BitXorAssign => BinaryOperator::BitXor,
            Self::BitAndAssign => BinaryOperator::BitAnd,
        })
    }
}

// =========================================================================
// Convenience constructors
// =========================================================================

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(Identifier::new(name))
    }

    pub fn num(value: f64) -> Self {
        Self::Literal(Literal::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::Literal(Literal::Bool(value))
    }

    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// `object.name`
    pub fn member(object: Self, name: impl Into<String>) -> Self {
        Self::Member {
            object: Box::new(object),
            property: Box::new(Self::ident(name)),
            computed: false,
        }
    }

    /// `object[property]`
    pub fn computed(object: Self, property: Self) -> Self {
        Self::Member {
            object: Box::new(object),
            property: Box::new(property),
            computed: true,
        }
    }

    pub fn call(callee: Self, arguments: Vec<Self>) -> Self {
        Self::Call {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn new_expr(callee: Self, arguments: Vec<Self>) -> Self {
        Self::New {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn binary(left: Self, operator: BinaryOperator, right: Self) -> Self {
        Self::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical(left: Self, operator: LogicalOperator, right: Self) -> Self {
        Self::Logical {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `target = value`
    pub fn assign(target: Self, value: Self) -> Self {
        Self::assign_op(target, AssignOperator::Assign, value)
    }

    pub fn assign_op(target: Self, operator: AssignOperator, value: Self) -> Self {
        Self::Assign {
            operator,
            left: Box::new(target),
            right: Box::new(value),
        }
    }

    pub fn update(operator: UpdateOperator, prefix: bool, argument: Self) -> Self {
        Self::Update {
            operator,
            prefix,
            argument: Box::new(argument),
        }
    }

    pub fn unary(operator: UnaryOperator, argument: Self) -> Self {
        Self::Unary {
            operator,
            argument: Box::new(argument),
        }
    }

    pub fn conditional(test: Self, consequent: Self, alternate: Self) -> Self {
        Self::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    pub fn seq(expressions: Vec<Self>) -> Self {
        Self::Sequence(expressions)
    }

    pub fn array(elements: Vec<Self>) -> Self {
        Self::Array(elements.into_iter().map(Some).collect())
    }

    /// Object literal with plain `key: value` members.
    pub fn object(properties: Vec<(Self, Self)>) -> Self {
        Self::Object(
            properties
                .into_iter()
                .map(|(key, value)| Property {
                    key,
                    value,
                    kind: PropertyKind::Init,
                    computed: false,
                })
                .collect(),
        )
    }

    pub fn function(function: Function) -> Self {
        Self::Function(Box::new(function))
    }

    pub fn this() -> Self {
        Self::This
    }
}

impl Function {
    pub fn new(name: Option<&str>, params: &[&str], body: Vec<Stmt>) -> Self {
        Self {
            id: name.map(Identifier::new),
            params: params.iter().map(|p| Expr::ident(*p)).collect(),
            body,
            generator: false,
            is_async: false,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.name.as_str())
    }
}

impl Stmt {
    /// `var name = init;`
    pub fn var(name: impl Into<String>, init: Option<Expr>) -> Self {
        Self::Var(VariableDeclaration {
            kind: VarKind::Var,
            declarations: vec![VariableDeclarator {
                id: Expr::ident(name),
                init,
            }],
        })
    }

    pub fn expr(expr: Expr) -> Self {
        Self::Expr(expr)
    }

    pub fn ret(argument: Option<Expr>) -> Self {
        Self::Return(argument)
    }

    pub fn if_(test: Expr, consequent: Self, alternate: Option<Self>) -> Self {
        Self::If {
            test,
            consequent: Box::new(consequent),
            alternate: alternate.map(Box::new),
        }
    }

    pub fn while_(test: Expr, body: Self) -> Self {
        Self::While {
            test,
            body: Box::new(body),
        }
    }

    pub fn do_while(body: Self, test: Expr) -> Self {
        Self::DoWhile {
            body: Box::new(body),
            test,
        }
    }

    pub fn for_(init: Option<ForInit>, test: Option<Expr>, update: Option<Expr>, body: Self) -> Self {
        Self::For {
            init,
            test,
            update,
            body: Box::new(body),
        }
    }

    pub fn block(body: Vec<Self>) -> Self {
        Self::Block(body)
    }

    pub fn break_(label: Option<&str>) -> Self {
        Self::Break(label.map(Identifier::new))
    }

    pub fn continue_(label: Option<&str>) -> Self {
        Self::Continue(label.map(Identifier::new))
    }

    pub fn function(function: Function) -> Self {
        Self::Function(function)
    }

    pub fn labeled(label: impl Into<String>, body: Self) -> Self {
        Self::Labeled {
            label: Identifier::new(label),
            body: Box::new(body),
        }
    }

    /// ESTree node kind, used in diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Self::Var(_) => "VariableDeclaration",
            Self::Function(_) => "FunctionDeclaration",
            Self::Expr(_) => "ExpressionStatement",
            Self::Block(_) => "BlockStatement",
            Self::Empty => "EmptyStatement",
            Self::If { .. } => "IfStatement",
            Self::While { .. } => "WhileStatement",
            Self::DoWhile { .. } => "DoWhileStatement",
            Self::For { .. } => "ForStatement",
            Self::Break(_) => "BreakStatement",
            Self::Continue(_) => "ContinueStatement",
            Self::Return(_) => "ReturnStatement",
            Self::Labeled { .. } => "LabeledStatement",
            Self::Unsupported(kind) => kind,
        }
    }
}

impl Expr {
    /// ESTree node kind, used in diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            Self::Ident(_) => "Identifier",
            Self::Literal(_) => "Literal",
            Self::This => "ThisExpression",
            Self::Array(_) => "ArrayExpression",
            Self::Object(_) => "ObjectExpression",
            Self::Function(_) => "FunctionExpression",
            Self::Unary { .. } => "UnaryExpression",
            Self::Update { .. } => "UpdateExpression",
            Self::Binary { .. } => "BinaryExpression",
            Self::Logical { .. } => "LogicalExpression",
            Self::Assign { .. } => "AssignmentExpression",
            Self::Conditional { .. } => "ConditionalExpression",
            Self::Sequence(_) => "SequenceExpression",
            Self::Member { .. } => "MemberExpression",
            Self::Call { .. } => "CallExpression",
            Self::New { .. } => "NewExpression",
            Self::Unsupported(kind) => kind,
        }
    }
}
