use crate::node::*;

/// Read-only traversal over the syntax tree.
///
/// Every `visit_*` method defaults to the matching `walk_*` function, which
/// visits the children in source order. Overrides that want to stop at a
/// node simply don't call `walk_*`.
pub trait Visitor<'v>: Sized {
    fn visit_program(&mut self, p: &'v Program) {
        walk_program(self, p);
    }

    fn visit_stmt(&mut self, s: &'v Stmt) {
        walk_stmt(self, s);
    }

    fn visit_expr(&mut self, e: &'v Expr) {
        walk_expr(self, e);
    }

    /// Function declarations and function expressions.
    fn visit_fct(&mut self, f: &'v Function) {
        walk_fct(self, f);
    }

    fn visit_var_declaration(&mut self, d: &'v VariableDeclaration) {
        walk_var_declaration(self, d);
    }

    fn visit_ident(&mut self, _i: &'v Identifier) {}
}

pub fn walk_program<'v, V: Visitor<'v>>(v: &mut V, p: &'v Program) {
    for s in &p.body {
        v.visit_stmt(s);
    }
}

pub fn walk_fct<'v, V: Visitor<'v>>(v: &mut V, f: &'v Function) {
    for param in &f.params {
        v.visit_expr(param);
    }
    for s in &f.body {
        v.visit_stmt(s);
    }
}

pub fn walk_var_declaration<'v, V: Visitor<'v>>(v: &mut V, d: &'v VariableDeclaration) {
    for declarator in &d.declarations {
        v.visit_expr(&declarator.id);
        if let Some(init) = &declarator.init {
            v.visit_expr(init);
        }
    }
}

pub fn walk_stmt<'v, V: Visitor<'v>>(v: &mut V, s: &'v Stmt) {
    match s {
        Stmt::Var(d) => v.visit_var_declaration(d),
        Stmt::Function(f) => v.visit_fct(f),
        Stmt::Expr(e) => v.visit_expr(e),
        Stmt::Block(body) => {
            for s in body {
                v.visit_stmt(s);
            }
        }
        Stmt::If {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr(test);
            v.visit_stmt(consequent);
            if let Some(alternate) = alternate {
                v.visit_stmt(alternate);
            }
        }
        Stmt::While { test, body } => {
            v.visit_expr(test);
            v.visit_stmt(body);
        }
        Stmt::DoWhile { body, test } => {
            v.visit_stmt(body);
            v.visit_expr(test);
        }
        Stmt::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Var(d)) => v.visit_var_declaration(d),
                Some(ForInit::Expr(e)) => v.visit_expr(e),
                None => {}
            }
            if let Some(test) = test {
                v.visit_expr(test);
            }
            if let Some(update) = update {
                v.visit_expr(update);
            }
            v.visit_stmt(body);
        }
        Stmt::Return(Some(e)) => v.visit_expr(e),
        Stmt::Labeled { body, .. } => v.visit_stmt(body),
        Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Return(None)
        | Stmt::Empty
        | Stmt::Unsupported(_) => {}
    }
}

pub fn walk_expr<'v, V: Visitor<'v>>(v: &mut V, e: &'v Expr) {
    match e {
        Expr::Ident(ident) => v.visit_ident(ident),
        Expr::Literal(_) | Expr::This | Expr::Unsupported(_) => {}
        Expr::Array(elements) => {
            for element in elements.iter().flatten() {
                v.visit_expr(element);
            }
        }
        Expr::Object(properties) => {
            for property in properties {
                if property.computed {
                    v.visit_expr(&property.key);
                }
                v.visit_expr(&property.value);
            }
        }
        Expr::Function(f) => v.visit_fct(f),
        Expr::Unary { argument, .. } | Expr::Update { argument, .. } => v.visit_expr(argument),
        Expr::Binary { left, right, .. }
        | Expr::Logical { left, right, .. }
        | Expr::Assign { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr(test);
            v.visit_expr(consequent);
            v.visit_expr(alternate);
        }
        Expr::Sequence(expressions) => {
            for e in expressions {
                v.visit_expr(e);
            }
        }
        Expr::Member {
            object,
            property,
            computed,
        } => {
            v.visit_expr(object);
            // `a.b` names a property, not a variable
            if *computed {
                v.visit_expr(property);
            }
        }
        Expr::Call { callee, arguments } | Expr::New { callee, arguments } => {
            v.visit_expr(callee);
            for arg in arguments {
                v.visit_expr(arg);
            }
        }
    }
}
