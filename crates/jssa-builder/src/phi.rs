use indexmap::IndexMap;
use jssa_ir::{BlockId, InstrId, Operand, PhiEntry, PhiInput, PhiTable};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{BuildError, Result};

/// Accumulates phi contributions while a function is being lowered.
///
/// A phi is opened when its merge block is allocated; each arm that flows
/// into the merge block contributes the value it produced. Once the function
/// is complete the recorder is frozen into a [`PhiTable`].
#[derive(Debug, Default)]
pub struct PhiRecorder {
    entries: IndexMap<InstrId, PhiEntry>,
}

impl PhiRecorder {
    pub fn open(&mut self, phi: InstrId, block: BlockId) {
        trace!(%phi, %block, "phi opened");
        self.entries.insert(
            phi,
            PhiEntry {
                block,
                inputs: SmallVec::new(),
            },
        );
    }

    pub fn contribute(&mut self, phi: InstrId, from: BlockId, value: Operand) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&phi)
            .ok_or(BuildError::UnresolvedPhi { phi })?;
        trace!(%phi, %from, %value, "phi contribution");
        entry.inputs.push(PhiInput { from, value });
        Ok(())
    }

    /// Freeze the recorded phis. Every opened phi must have been contributed to.
    pub fn finish(self) -> Result<PhiTable> {
        if let Some((phi, _)) = self.entries.iter().find(|(_, e)| e.inputs.is_empty()) {
            return Err(BuildError::UnresolvedPhi { phi: *phi });
        }
        Ok(PhiTable::new(self.entries))
    }
}
