use std::collections::VecDeque;

use jssa_ir::Cfg;
use tracing::trace;

/// Completed CFGs of nested functions, in completion order.
///
/// Nested functions are built as soon as their literal is reached, so an
/// inner function completes (and is queued) before the function containing it.
#[derive(Debug, Default)]
pub struct Worklist {
    done: VecDeque<Cfg>,
}

impl Worklist {
    pub fn push(&mut self, cfg: Cfg) {
        trace!(entry = %cfg.entry, name = ?cfg.name, "queued nested function");
        self.done.push_back(cfg);
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Cfg> + '_ {
        self.done.drain(..)
    }
}
