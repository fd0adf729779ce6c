//! SSA intermediate representation.
//!
//! Every function lowers to a [`Cfg`]: basic blocks of [`Instruction`]s
//! linked by successor edges, plus a [`PhiTable`] recording which value each
//! predecessor contributes to every phi. Instruction and block ids are
//! unique across all CFGs of one construction run.

pub mod cfg;
pub mod instruction;
pub mod printer;

pub use cfg::{Block, Cfg, PhiEntry, PhiInput, PhiTable, Successors};
pub use instruction::{BlockId, Constant, InstrId, Instruction, Opcode, Operand, Operands};
pub use printer::stringify;

#[cfg(test)]
#[path = "tests/cfg_tests.rs"]
mod cfg_tests;
