//! Textual form of the IR.
//!
//! ```text
//! block B0 -> B1, B2
//!   @a = literal %1
//!   i3 = branch @a
//! ```

use std::fmt::{self, Write};

use crate::cfg::{Block, Cfg};

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {}", self.id)?;
        for (i, succ) in self.successors.iter().enumerate() {
            f.write_str(if i == 0 { " -> " } else { ", " })?;
            write!(f, "{succ}")?;
        }
        for instr in &self.instructions {
            write!(f, "\n  {instr}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Cfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

/// Render a sequence of CFGs, one after another.
pub fn stringify(cfgs: &[Cfg]) -> String {
    let mut out = String::new();
    for (i, cfg) in cfgs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{cfg}");
    }
    out
}
