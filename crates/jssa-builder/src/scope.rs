//! Declaration analysis for a single function.
//!
//! Before a function body is lowered we need to know:
//! - its parameters,
//! - every `var`-declared name (hoisted to the top of the function),
//! - every function declaration reachable without crossing a function
//!   boundary (also hoisted),
//! - which of those names (and the function's own name) are referenced from a
//!   nested function. Those get a context slot instead of an SSA binding.

use indexmap::IndexMap;
use jssa_ast::visit::{self, Visitor};
use jssa_ast::{Expr, ForInit, Function, Identifier, Stmt, VarKind, VariableDeclaration};
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::error::{BuildError, Result};

/// Storage chosen for a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// SSA value, only visible to the declaring function.
    Local,
    /// Slot in the declaring function's context.
    Context(u32),
}

#[derive(Debug, Clone)]
pub struct ScopeInfo<'a> {
    /// Own name of the function; visible inside the body unless shadowed.
    pub self_name: Option<&'a str>,
    pub params: Vec<&'a str>,
    /// Hoisted `var` names, in first-occurrence order. Parameters are not
    /// repeated here.
    pub vars: Vec<&'a str>,
    /// Hoisted function declarations, in source order.
    pub functions: Vec<&'a Function>,
    bindings: IndexMap<&'a str, Binding>,
    self_slot: Option<u32>,
    context_size: u32,
}

impl<'a> ScopeInfo<'a> {
    /// Analyze a function (or the top-level program when `self_name` is `None`
    /// and `params` is empty).
    pub fn analyze(self_name: Option<&'a str>, params: &'a [Expr], body: &'a [Stmt]) -> Result<Self> {
        let params = params
            .iter()
            .map(|p| match p {
                Expr::Ident(ident) => Ok(ident.name.as_str()),
                other => Err(BuildError::unsupported(format!("parameter pattern {}", other.kind()))),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut hoisted = HoistedDeclarations::default();
        hoisted.collect(body);

        let mut declared: IndexMap<&'a str, Binding> = IndexMap::new();
        for &name in &params {
            declared.insert(name, Binding::Local);
        }
        let vars: Vec<&'a str> = hoisted
            .vars
            .into_iter()
            .filter(|name| !declared.contains_key(name))
            .collect();
        for &name in &vars {
            declared.insert(name, Binding::Local);
        }
        for &f in &hoisted.functions {
            if let Some(name) = f.name() {
                declared.entry(name).or_insert(Binding::Local);
            }
        }

        let self_name = self_name.filter(|name| !declared.contains_key(name));
        let captured = captured_names(&declared, self_name, body);

        let mut context_size = 0;
        for (name, binding) in declared.iter_mut() {
            if captured.contains(name) {
                *binding = Binding::Context(context_size);
                context_size += 1;
            }
        }
        let self_slot = match self_name {
            Some(name) if captured.contains(name) => {
                context_size += 1;
                Some(context_size - 1)
            }
            _ => None,
        };

        trace!(
            params = params.len(),
            vars = vars.len(),
            functions = hoisted.functions.len(),
            context_size,
            "analyzed scope"
        );

        Ok(Self {
            self_name,
            params,
            vars,
            functions: hoisted.functions,
            bindings: declared,
            self_slot,
            context_size,
        })
    }

    /// Binding of a name declared by this function.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.bindings.get(name).copied()
    }

    /// Whether `name` reads as the function itself.
    pub fn is_self(&self, name: &str) -> bool {
        self.self_name == Some(name)
    }

    /// Context slot holding the function itself, when a nested function
    /// refers to it by name.
    pub fn self_slot(&self) -> Option<u32> {
        self.self_slot
    }

    /// Number of context slots the function allocates.
    pub fn context_size(&self) -> u32 {
        self.context_size
    }

    /// Declared names with their bindings, in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&'a str, Binding)> + '_ {
        self.bindings.iter().map(|(name, binding)| (*name, *binding))
    }
}

// =========================================================================
// Hoisting
// =========================================================================

#[derive(Default)]
struct HoistedDeclarations<'a> {
    vars: Vec<&'a str>,
    seen: FxHashSet<&'a str>,
    functions: Vec<&'a Function>,
}

impl<'a> HoistedDeclarations<'a> {
    fn collect(&mut self, statements: &'a [Stmt]) {
        for stmt in statements {
            self.collect_stmt(stmt);
        }
    }

    /// Walks statement positions only: expressions cannot declare `var`s, and
    /// function bodies are separate scopes.
    fn collect_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Var(decl) => self.collect_var_decl(decl),
            Stmt::Function(f) => self.functions.push(f),
            Stmt::Block(body) => self.collect(body),
            Stmt::If {
                consequent,
                alternate,
                ..
            } => {
                self.collect_stmt(consequent);
                if let Some(alternate) = alternate {
                    self.collect_stmt(alternate);
                }
            }
            Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => self.collect_stmt(body),
            Stmt::For { init, body, .. } => {
                if let Some(ForInit::Var(decl)) = init {
                    self.collect_var_decl(decl);
                }
                self.collect_stmt(body);
            }
            Stmt::Labeled { body, .. } => self.collect_stmt(body),
            Stmt::Expr(_)
            | Stmt::Empty
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Return(_)
            | Stmt::Unsupported(_) => {}
        }
    }

    fn collect_var_decl(&mut self, decl: &'a VariableDeclaration) {
        if decl.kind != VarKind::Var {
            return;
        }
        for declarator in &decl.declarations {
            // Non-identifier patterns are rejected when the declaration is lowered.
            if let Expr::Ident(Identifier { name }) = &declarator.id
                && self.seen.insert(name)
            {
                self.vars.push(name);
            }
        }
    }
}

// =========================================================================
// Capture detection
// =========================================================================

/// Names of a nested function that hide outer declarations.
struct Shadow<'a> {
    declared: FxHashSet<&'a str>,
    /// Own name; hides outer names for reads only.
    self_name: Option<&'a str>,
}

impl<'a> Shadow<'a> {
    fn of(f: &'a Function) -> Self {
        let mut hoisted = HoistedDeclarations::default();
        hoisted.collect(&f.body);
        let mut declared: FxHashSet<&'a str> = hoisted.vars.into_iter().collect();
        declared.extend(f.params.iter().filter_map(|p| match p {
            Expr::Ident(ident) => Some(ident.name.as_str()),
            _ => None,
        }));
        declared.extend(hoisted.functions.into_iter().filter_map(Function::name));
        Self {
            declared,
            self_name: f.name(),
        }
    }
}

/// Finds which of `declared` (and `self_name`) nested functions reference.
struct CaptureScan<'a, 's> {
    declared: &'s IndexMap<&'a str, Binding>,
    self_name: Option<&'a str>,
    shadows: Vec<Shadow<'a>>,
    captured: FxHashSet<&'a str>,
}

impl<'a> CaptureScan<'a, '_> {
    fn note_read(&mut self, name: &'a str) {
        if self.shadows.is_empty() {
            return;
        }
        let hidden = self
            .shadows
            .iter()
            .any(|s| s.declared.contains(name) || s.self_name == Some(name));
        if !hidden {
            self.note(name);
        }
    }

    fn note_write(&mut self, name: &'a str) {
        if self.shadows.is_empty() {
            return;
        }
        // Writes never target the own name, so only declarations count.
        if self.declared.contains_key(name) && !self.shadows.iter().any(|s| s.declared.contains(name)) {
            self.note(name);
        }
    }

    fn note(&mut self, name: &'a str) {
        if (self.declared.contains_key(name) || self.self_name == Some(name)) && self.captured.insert(name) {
            trace!(name, "captured by nested function");
        }
    }
}

impl<'a> Visitor<'a> for CaptureScan<'a, '_> {
    fn visit_fct(&mut self, f: &'a Function) {
        self.shadows.push(Shadow::of(f));
        visit::walk_fct(self, f);
        self.shadows.pop();
    }

    fn visit_ident(&mut self, i: &'a Identifier) {
        self.note_read(&i.name);
    }

    fn visit_expr(&mut self, e: &'a Expr) {
        match e {
            Expr::Assign {
                operator,
                left,
                right,
            } if matches!(**left, Expr::Ident(_)) => {
                if let Expr::Ident(target) = &**left {
                    self.note_write(&target.name);
                    if operator.binary().is_some() {
                        self.note_read(&target.name);
                    }
                }
                self.visit_expr(right);
            }
            Expr::Update { argument, .. } if matches!(**argument, Expr::Ident(_)) => {
                if let Expr::Ident(target) = &**argument {
                    self.note_write(&target.name);
                    self.note_read(&target.name);
                }
            }
            _ => visit::walk_expr(self, e),
        }
    }
}

fn captured_names<'a>(
    declared: &IndexMap<&'a str, Binding>,
    self_name: Option<&'a str>,
    body: &'a [Stmt],
) -> FxHashSet<&'a str> {
    let mut scan = CaptureScan {
        declared,
        self_name,
        shadows: Vec::new(),
        captured: FxHashSet::default(),
    };
    for stmt in body {
        scan.visit_stmt(stmt);
    }
    scan.captured
}
