//! Statement lowering: sequencing, `if`, loops and jumps.

use jssa_ast::{Expr, ForInit, Identifier, Stmt, VarKind, VariableDeclaration};
use jssa_ir::{BlockId, Constant, Opcode};
use tracing::trace;

use crate::builder::{FunctionBuilder, LoopFrame};
use crate::error::{BuildError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopKind {
    While,
    DoWhile,
    For,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Jump {
    Break,
    Continue,
}

impl Jump {
    fn as_str(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Continue => "continue",
        }
    }
}

impl<'a> FunctionBuilder<'a, '_> {
    pub(crate) fn lower_stmts(&mut self, statements: &'a [Stmt]) -> Result<()> {
        for stmt in statements {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &'a Stmt) -> Result<()> {
        // Declarations were hoisted into the prologue.
        if matches!(stmt, Stmt::Function(_) | Stmt::Empty) {
            return Ok(());
        }
        if self.is_terminated() {
            let dead = self.new_block();
            trace!(block = %dead, "unreachable statement");
            self.switch_to(dead);
        }

        match stmt {
            Stmt::Var(decl) => self.lower_var_decl(decl),
            Stmt::Expr(e) => self.lower_expr(e).map(drop),
            Stmt::Block(body) => self.lower_stmts(body),
            Stmt::If {
                test,
                consequent,
                alternate,
            } => self.lower_if(test, consequent, alternate.as_deref()),
            Stmt::While { .. } | Stmt::DoWhile { .. } | Stmt::For { .. } => self.lower_loop(stmt, Vec::new()),
            Stmt::Labeled { .. } => self.lower_labeled(stmt),
            Stmt::Break(label) => self.lower_jump(Jump::Break, label.as_ref()),
            Stmt::Continue(label) => self.lower_jump(Jump::Continue, label.as_ref()),
            Stmt::Return(argument) => {
                let value = match argument {
                    Some(e) => self.lower_expr(e)?,
                    None => self.literal(Constant::Undefined),
                };
                self.emit(Opcode::Ret, [value]);
                Ok(())
            }
            Stmt::Unsupported(kind) => Err(BuildError::unsupported(kind.as_str())),
            Stmt::Function(_) | Stmt::Empty => Ok(()),
        }
    }

    pub(crate) fn lower_var_decl(&mut self, decl: &'a VariableDeclaration) -> Result<()> {
        if decl.kind != VarKind::Var {
            return Err(BuildError::unsupported(format!(
                "VariableDeclaration({})",
                decl.kind.as_str()
            )));
        }
        for declarator in &decl.declarations {
            let Expr::Ident(Identifier { name }) = &declarator.id else {
                return Err(BuildError::unsupported(format!(
                    "binding pattern {}",
                    declarator.id.kind()
                )));
            };
            if let Some(init) = &declarator.init {
                let value = self.lower_expr(init)?;
                self.write_name(name, value);
            }
        }
        Ok(())
    }

    // =========================================================================
    // If
    // =========================================================================

    fn lower_if(&mut self, test: &'a Expr, consequent: &'a Stmt, alternate: Option<&'a Stmt>) -> Result<()> {
        let test = self.lower_expr(test)?;
        self.emit(Opcode::Branch, [test]);

        let then_block = self.new_block();
        let else_block = self.new_block();
        let join = self.new_block();
        self.link(self.current(), &[then_block, else_block]);

        self.switch_to(then_block);
        self.lower_stmt(consequent)?;
        self.fall_through(join);

        self.switch_to(else_block);
        if let Some(alternate) = alternate {
            self.lower_stmt(alternate)?;
        }
        self.fall_through(join);

        self.switch_to(join);
        Ok(())
    }

    /// Link the current block to `target` unless control already left it.
    fn fall_through(&mut self, target: BlockId) {
        if !self.is_terminated() {
            self.link(self.current(), &[target]);
        }
    }

    // =========================================================================
    // Loops
    // =========================================================================

    fn lower_labeled(&mut self, stmt: &'a Stmt) -> Result<()> {
        let mut labels = Vec::new();
        let mut body = stmt;
        while let Stmt::Labeled { label, body: inner } = body {
            labels.push(label.name.as_str());
            body = inner;
        }
        match body {
            Stmt::While { .. } | Stmt::DoWhile { .. } | Stmt::For { .. } => self.lower_loop(body, labels),
            other => Err(BuildError::unsupported(format!(
                "LabeledStatement({})",
                other.kind()
            ))),
        }
    }

    /// All loops share one block template, allocated in this order:
    /// continue entry, break target, header, test, body. The after-loop block
    /// is allocated once the body is done.
    fn lower_loop(&mut self, stmt: &'a Stmt, labels: Vec<&'a str>) -> Result<()> {
        let (kind, init, test, update, body) = match stmt {
            Stmt::While { test, body } => (LoopKind::While, None, Some(test), None, body),
            Stmt::DoWhile { body, test } => (LoopKind::DoWhile, None, Some(test), None, body),
            Stmt::For {
                init,
                test,
                update,
                body,
            } => (LoopKind::For, init.as_ref(), test.as_ref(), update.as_ref(), body),
            other => return Err(BuildError::unsupported(other.kind())),
        };

        match init {
            Some(ForInit::Var(decl)) => self.lower_var_decl(decl)?,
            Some(ForInit::Expr(e)) => {
                self.lower_expr(e)?;
            }
            None => {}
        }

        let continue_entry = self.new_block();
        let break_target = self.new_block();
        let header = self.new_block();
        let test_block = self.new_block();
        let body_block = self.new_block();
        trace!(?kind, %header, "loop");

        self.link(self.current(), &[header]);
        // do-while enters the body straight from the header.
        let first = if kind == LoopKind::DoWhile { body_block } else { test_block };
        self.link(header, &[first]);

        self.switch_to(test_block);
        let condition = match test {
            Some(test) => self.lower_expr(test)?,
            None => self.literal(Constant::Bool(true)),
        };
        self.emit(Opcode::Branch, [condition]);
        self.link(self.current(), &[body_block, break_target]);

        let depth = self.loops.len();
        self.loops.push(LoopFrame {
            labels,
            continue_entry,
            continue_target: continue_entry,
            first_continue: None,
            break_target,
        });
        self.switch_to(body_block);
        self.lower_stmt(body)?;
        let frame = self.loops.remove(depth);
        self.fall_through(frame.continue_entry);

        self.switch_to(frame.continue_entry);
        if let Some(update) = update {
            self.lower_expr(update)?;
        }
        match frame.first_continue {
            Some(first) => {
                self.link(self.current(), &[first]);
                self.link(frame.continue_target, &[header]);
            }
            None => self.link(self.current(), &[header]),
        }

        let after = self.new_block();
        self.link(frame.break_target, &[after]);
        self.switch_to(after);
        Ok(())
    }

    /// `break`/`continue`: jump to a fresh merge block and chain it onto the
    /// loop's current target.
    fn lower_jump(&mut self, jump: Jump, label: Option<&'a Identifier>) -> Result<()> {
        let label = label.map(|l| l.name.as_str());
        let Some(depth) = self
            .loops
            .iter()
            .rposition(|frame| label.is_none_or(|l| frame.labels.contains(&l)))
        else {
            return Err(BuildError::UnresolvedJump {
                statement: jump.as_str(),
                label: label.map(str::to_string),
            });
        };

        let merge = self.new_block();
        self.link(self.current(), &[merge]);

        let frame = &self.loops[depth];
        let (continue_entry, continue_target, first_continue, break_target) = (
            frame.continue_entry,
            frame.continue_target,
            frame.first_continue,
            frame.break_target,
        );
        match jump {
            Jump::Break => {
                self.link(break_target, &[merge]);
                self.loops[depth].break_target = merge;
            }
            Jump::Continue => {
                // The continue entry is still being filled by the body; its
                // edge is added after the update code.
                if first_continue.is_none() {
                    debug_assert_eq!(continue_target, continue_entry);
                    self.loops[depth].first_continue = Some(merge);
                } else {
                    self.link(continue_target, &[merge]);
                }
                self.loops[depth].continue_target = merge;
            }
        }
        trace!(jump = jump.as_str(), %merge, "jump");
        Ok(())
    }
}
