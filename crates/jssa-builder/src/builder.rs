//! Per-function CFG construction state and the block graph primitives.
//!
//! Statement and expression lowering live in `statements.rs` and
//! `expressions.rs`; both extend [`FunctionBuilder`].

use jssa_ast::{Expr, Function, Stmt};
use jssa_ir::{Block, BlockId, Cfg, Constant, InstrId, Instruction, Opcode, Operand, Operands};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::counters::IdCounters;
use crate::error::{BuildError, Result};
use crate::phi::PhiRecorder;
use crate::scope::{Binding, ScopeInfo};
use crate::worklist::Worklist;

/// State shared by every function built in one run.
pub(crate) struct BuildContext<'a> {
    pub(crate) counters: IdCounters,
    /// Scopes of the functions currently being built, outermost first.
    scopes: Vec<ScopeInfo<'a>>,
    pub(crate) worklist: Worklist,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(counters: IdCounters) -> Self {
        Self {
            counters,
            scopes: Vec::new(),
            worklist: Worklist::default(),
        }
    }
}

/// How an identifier resolves from the function being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// The function's own name.
    SelfRef,
    Local,
    Context { depth: u32, index: u32 },
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
}

/// Jump targets of an enclosing loop.
#[derive(Debug)]
pub(crate) struct LoopFrame<'a> {
    pub(crate) labels: Vec<&'a str>,
    /// Block holding the update code; the body falls through into it.
    pub(crate) continue_entry: BlockId,
    /// Merge block the next `continue` chains onto.
    pub(crate) continue_target: BlockId,
    /// First `continue` merge block. Linked from the continue entry once the
    /// update code has been lowered.
    pub(crate) first_continue: Option<BlockId>,
    /// Merge block the next `break` chains onto.
    pub(crate) break_target: BlockId,
}

/// Build one function into a CFG. Nested function literals recurse through
/// this entry point and land on the worklist.
#[tracing::instrument(level = "debug", skip_all, fields(name = name.unwrap_or("<anonymous>")))]
pub(crate) fn build_function<'a>(
    ctx: &mut BuildContext<'a>,
    name: Option<&'a str>,
    params: &'a [Expr],
    body: &'a [Stmt],
) -> Result<Cfg> {
    let scope = ScopeInfo::analyze(name, params, body)?;
    let prologue = Prologue {
        params: scope.params.clone(),
        self_slot: scope.self_slot(),
        vars: scope.vars.clone(),
        functions: scope.functions.clone(),
    };
    ctx.scopes.push(scope);
    let result = FunctionBuilder::new(ctx).build(name, prologue, body);
    ctx.scopes.pop();
    result
}

/// Declarations initialized on function entry.
struct Prologue<'a> {
    params: Vec<&'a str>,
    self_slot: Option<u32>,
    vars: Vec<&'a str>,
    functions: Vec<&'a Function>,
}

pub(crate) struct FunctionBuilder<'a, 'c> {
    pub(crate) ctx: &'c mut BuildContext<'a>,
    blocks: Vec<Block>,
    index: FxHashMap<BlockId, usize>,
    current: BlockId,
    pub(crate) loops: Vec<LoopFrame<'a>>,
    phis: PhiRecorder,
}

impl<'a, 'c> FunctionBuilder<'a, 'c> {
    fn new(ctx: &'c mut BuildContext<'a>) -> Self {
        Self {
            ctx,
            blocks: Vec::new(),
            index: FxHashMap::default(),
            current: BlockId(u32::MAX),
            loops: Vec::new(),
            phis: PhiRecorder::default(),
        }
    }

    fn build(mut self, name: Option<&'a str>, prologue: Prologue<'a>, body: &'a [Stmt]) -> Result<Cfg> {
        let entry = self.new_block();
        self.switch_to(entry);
        self.lower_prologue(prologue)?;
        self.lower_stmts(body)?;

        debug!(%entry, blocks = self.blocks.len(), "function built");
        Ok(Cfg {
            entry,
            name: name.map(str::to_string),
            blocks: self.blocks,
            phis: self.phis.finish()?,
        })
    }

    /// Parameters, the captured own name, hoisted `var`s, then hoisted
    /// function declarations.
    fn lower_prologue(&mut self, prologue: Prologue<'a>) -> Result<()> {
        for (i, name) in prologue.params.into_iter().enumerate() {
            let index = self.count(i as u32);
            let arg = self.emit(Opcode::LoadArg, [index]);
            self.write_name(name, Operand::Instr(arg));
        }

        if let Some(slot) = prologue.self_slot {
            let this_fn = self.emit(Opcode::SelfRef, []);
            self.store_context(0, slot, Operand::Instr(this_fn));
        }

        // Hoisted vars start out as local `undefined`, even when captured.
        for name in prologue.vars {
            let undefined = self.literal(Constant::Undefined);
            self.bind_local(name, undefined);
        }

        for f in prologue.functions {
            let value = self.function_literal(f)?;
            if let Some(name) = f.name() {
                self.write_name(name, value);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Block graph
    // =========================================================================

    /// Allocate a block without entering it.
    pub(crate) fn new_block(&mut self) -> BlockId {
        let id = self.ctx.counters.block();
        self.index.insert(id, self.blocks.len());
        self.blocks.push(Block::new(id));
        trace!(block = %id, "block allocated");
        id
    }

    pub(crate) fn switch_to(&mut self, block: BlockId) {
        debug_assert!(self.index.contains_key(&block), "{block} belongs to another function");
        self.current = block;
    }

    pub(crate) fn current(&self) -> BlockId {
        self.current
    }

    fn block_mut(&mut self, id: BlockId) -> &mut Block {
        let i = self.index[&id];
        &mut self.blocks[i]
    }

    fn block(&self, id: BlockId) -> &Block {
        &self.blocks[self.index[&id]]
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.block(self.current).is_terminated()
    }

    /// Record the successors of `from`. Successors are set once per block.
    pub(crate) fn link(&mut self, from: BlockId, successors: &[BlockId]) {
        let block = self.block_mut(from);
        debug_assert!(block.successors.is_empty(), "{from} linked twice");
        block.successors = SmallVec::from_slice(successors);
        trace!(%from, ?successors, "linked");
    }

    /// Append an instruction to the current block.
    pub(crate) fn emit<const N: usize>(&mut self, opcode: Opcode, operands: [Operand; N]) -> InstrId {
        let id = self.ctx.counters.instr();
        let operands: Operands = operands.into_iter().collect();
        let current = self.current;
        self.block_mut(current)
            .instructions
            .push(Instruction::new(id, opcode, operands));
        id
    }

    // =========================================================================
    // Phis
    // =========================================================================

    pub(crate) fn reserve_phi(&mut self) -> InstrId {
        self.ctx.counters.instr()
    }

    pub(crate) fn open_phi(&mut self, phi: InstrId, join: BlockId) {
        self.phis.open(phi, join);
    }

    /// Emit `to_phi phi, value` at the end of the current block.
    pub(crate) fn contribute_phi(&mut self, phi: InstrId, value: Operand) -> Result<()> {
        let from = self.current;
        self.phis.contribute(phi, from, value.clone())?;
        self.emit(Opcode::ToPhi, [Operand::Instr(phi), value]);
        Ok(())
    }

    /// Enter a merge block, placing its phi first.
    pub(crate) fn enter_join(&mut self, join: BlockId, phi: InstrId) {
        self.switch_to(join);
        let block = self.block_mut(join);
        debug_assert!(block.instructions.is_empty());
        block
            .instructions
            .insert(0, Instruction::new(phi, Opcode::Phi, Operands::new()));
    }

    // =========================================================================
    // Value handles
    // =========================================================================

    pub(crate) fn constant(&mut self, value: Constant) -> Operand {
        self.ctx.counters.instr();
        Operand::Constant(value)
    }

    pub(crate) fn count(&mut self, n: u32) -> Operand {
        self.ctx.counters.instr();
        Operand::Count(n)
    }

    pub(crate) fn block_ref(&mut self, block: BlockId) -> Operand {
        self.ctx.counters.instr();
        Operand::Block(block)
    }

    pub(crate) fn operator(&mut self, op: &str) -> Operand {
        self.constant(Constant::string(op))
    }

    /// `literal %value`
    pub(crate) fn literal(&mut self, value: Constant) -> Operand {
        let c = self.constant(value);
        Operand::Instr(self.emit(Opcode::Literal, [c]))
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// Resolve `name` from the innermost scope outwards. The function's own
    /// name is only visible to reads; writes to it go to the enclosing scopes.
    pub(crate) fn resolve(&self, name: &str, access: Access) -> Resolved {
        for (depth, scope) in self.ctx.scopes.iter().rev().enumerate() {
            let depth = depth as u32;
            match scope.lookup(name) {
                Some(Binding::Context(index)) => return Resolved::Context { depth, index },
                Some(Binding::Local) => {
                    debug_assert_eq!(depth, 0, "`{name}` used across functions without a context slot");
                    return if depth == 0 { Resolved::Local } else { Resolved::Global };
                }
                None => {}
            }
            if access == Access::Read && scope.is_self(name) {
                if depth == 0 {
                    return Resolved::SelfRef;
                }
                if let Some(index) = scope.self_slot() {
                    return Resolved::Context { depth, index };
                }
            }
        }
        Resolved::Global
    }

    pub(crate) fn read_name(&mut self, name: &str) -> Operand {
        match self.resolve(name, Access::Read) {
            Resolved::SelfRef => Operand::Instr(self.emit(Opcode::SelfRef, [])),
            Resolved::Local => {
                self.ctx.counters.instr();
                Operand::Local(name.to_string())
            }
            Resolved::Context { depth, index } => {
                let depth = self.count(depth);
                let index = self.count(index);
                Operand::Instr(self.emit(Opcode::LoadContext, [depth, index]))
            }
            Resolved::Global => {
                let name = self.constant(Constant::string(name));
                Operand::Instr(self.emit(Opcode::LoadGlobal, [name]))
            }
        }
    }

    /// Store `value` into `name`; returns the value of the assignment.
    pub(crate) fn write_name(&mut self, name: &str, value: Operand) -> Operand {
        match self.resolve(name, Access::Write) {
            Resolved::Local => {
                self.bind_local(name, value);
                Operand::Local(name.to_string())
            }
            Resolved::Context { depth, index } => {
                self.store_context(depth, index, value.clone());
                value
            }
            Resolved::Global | Resolved::SelfRef => {
                let key = self.constant(Constant::string(name));
                self.emit(Opcode::StoreGlobal, [key, value.clone()]);
                value
            }
        }
    }

    fn store_context(&mut self, depth: u32, index: u32, value: Operand) {
        let depth = self.count(depth);
        let index = self.count(index);
        self.emit(Opcode::StoreContext, [depth, index, value]);
    }

    /// Make `value` the current value of local `name`. The instruction that
    /// just produced the value takes the binding; anything else goes through
    /// a `nop`.
    pub(crate) fn bind_local(&mut self, name: &str, value: Operand) {
        let current = self.current;
        if let Some(id) = value.as_instr()
            && let Some(last) = self.block_mut(current).instructions.last_mut()
            && last.id == id
            && last.binding.is_none()
            && last.opcode.produces_value()
            && last.opcode != Opcode::Phi
        {
            last.binding = Some(name.to_string());
            return;
        }
        let nop = self.emit(Opcode::Nop, [value]);
        if let Some(last) = self.block_mut(current).instructions.last_mut() {
            debug_assert_eq!(last.id, nop);
            last.binding = Some(name.to_string());
        }
    }

    // =========================================================================
    // Nested functions
    // =========================================================================

    /// Build a nested function and emit `fn %"B<entry>"` for it.
    pub(crate) fn function_literal(&mut self, f: &'a Function) -> Result<Operand> {
        if f.generator {
            return Err(BuildError::unsupported("generator function"));
        }
        if f.is_async {
            return Err(BuildError::unsupported("async function"));
        }
        let cfg = build_function(self.ctx, f.name(), &f.params, &f.body)?;
        let entry = cfg.entry;
        self.ctx.worklist.push(cfg);
        let entry = self.block_ref(entry);
        Ok(Operand::Instr(self.emit(Opcode::Fn, [entry])))
    }
}
