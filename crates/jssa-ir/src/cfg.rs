//! Basic blocks and per-function control-flow graphs.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::instruction::{BlockId, InstrId, Instruction, Opcode, Operand};

pub type Successors = SmallVec<[BlockId; 2]>;

/// A straight-line run of instructions.
///
/// Control leaves through `successors`: none (return or fall off the end of
/// the function), one (jump), or two (`[true, false]` after a `branch`).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub instructions: Vec<Instruction>,
    pub successors: Successors,
}

impl Block {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            instructions: Vec::new(),
            successors: SmallVec::new(),
        }
    }

    /// True once control can no longer fall through to a following statement.
    pub fn is_terminated(&self) -> bool {
        !self.successors.is_empty()
            || self
                .instructions
                .last()
                .is_some_and(|instr| instr.opcode == Opcode::Ret)
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// One contribution to a phi: the value flowing in from `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct PhiInput {
    pub from: BlockId,
    pub value: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhiEntry {
    /// Block whose first instruction is the phi.
    pub block: BlockId,
    pub inputs: SmallVec<[PhiInput; 2]>,
}

/// Resolved phis of one function, in reservation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhiTable {
    entries: IndexMap<InstrId, PhiEntry>,
}

impl PhiTable {
    pub fn new(entries: IndexMap<InstrId, PhiEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, phi: InstrId) -> Option<&PhiEntry> {
        self.entries.get(&phi)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstrId, &PhiEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Control-flow graph of a single function.
#[derive(Debug, Clone, PartialEq)]
pub struct Cfg {
    pub entry: BlockId,
    /// Own name of the function, `None` for the top level and anonymous
    /// function expressions.
    pub name: Option<String>,
    /// Blocks in creation order; the entry block comes first.
    pub blocks: Vec<Block>,
    pub phis: PhiTable,
}

impl Cfg {
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }

    pub fn instruction(&self, id: InstrId) -> Option<&Instruction> {
        self.instructions().find(|instr| instr.id == id)
    }

    /// Predecessor lists, in block creation order of the source blocks.
    pub fn predecessors(&self) -> FxHashMap<BlockId, SmallVec<[BlockId; 2]>> {
        let mut preds: FxHashMap<BlockId, SmallVec<[BlockId; 2]>> = FxHashMap::default();
        for block in &self.blocks {
            preds.entry(block.id).or_default();
            for succ in &block.successors {
                preds.entry(*succ).or_default().push(block.id);
            }
        }
        preds
    }
}
