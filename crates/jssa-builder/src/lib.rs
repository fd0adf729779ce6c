//! SSA construction.
//!
//! [`construct`] lowers a [`Program`] into one [`Cfg`] per function: the
//! top-level code first, then every nested function in the order its
//! construction completed. Block and instruction ids are unique across the
//! whole result.
//!
//! Names resolve lexically. A name declared by a function and referenced
//! from a nested function lives in a context slot (`loadContext` /
//! `storeContext` with a depth and slot index); other declared names are SSA
//! locals (`@name`); undeclared names are globals.

mod builder;
pub mod counters;
pub mod error;
mod expressions;
pub mod phi;
pub mod scope;
mod statements;
pub mod worklist;

pub use counters::IdCounters;
pub use error::BuildError;
pub use scope::{Binding, ScopeInfo};

use jssa_ast::Program;
use jssa_ir::Cfg;
use tracing::debug;

use crate::builder::{BuildContext, build_function};

/// Build the CFGs of `program` with fresh id counters.
pub fn construct(program: &Program) -> Result<Vec<Cfg>, BuildError> {
    construct_with(program, &mut IdCounters::new())
}

/// Build the CFGs of `program`, continuing the numbering of `counters`.
pub fn construct_with(program: &Program, counters: &mut IdCounters) -> Result<Vec<Cfg>, BuildError> {
    let mut ctx = BuildContext::new(std::mem::take(counters));
    let main = build_function(&mut ctx, None, &[], &program.body);
    *counters = std::mem::take(&mut ctx.counters);
    let mut cfgs = vec![main?];
    cfgs.extend(ctx.worklist.drain());
    debug!(
        functions = cfgs.len(),
        instrs = counters.instrs_issued(),
        blocks = counters.blocks_issued(),
        "construction finished"
    );
    Ok(cfgs)
}

#[cfg(test)]
#[path = "tests/scope_tests.rs"]
mod scope_tests;

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod builder_tests;
