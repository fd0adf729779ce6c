use jssa_ir::{BlockId, InstrId};

/// Id sources shared by every CFG of one construction run.
///
/// Instruction ids are also drawn for value handles (constants, local reads,
/// block references) that never become instructions, so printed ids have
/// gaps wherever such a handle was created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IdCounters {
    next_instr: u32,
    next_block: u32,
}

impl IdCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instr(&mut self) -> InstrId {
        let id = InstrId(self.next_instr);
        self.next_instr += 1;
        id
    }

    pub fn block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        id
    }

    /// Number of instruction ids handed out so far.
    pub fn instrs_issued(&self) -> u32 {
        self.next_instr
    }

    /// Number of block ids handed out so far.
    pub fn blocks_issued(&self) -> u32 {
        self.next_block
    }
}
