//! SSA control-flow graph construction for ECMAScript syntax trees.
//!
//! The workspace is split into three crates, re-exported here:
//!
//! - [`ast`]: the syntax tree and its ESTree JSON decoder,
//! - [`ir`]: blocks, instructions, phi tables and the textual printer,
//! - [`builder`]: scope analysis and lowering into [`ir::Cfg`]s.
//!
//! ```
//! let json = r#"{"type": "Program", "body": [
//!     {"type": "ReturnStatement", "argument": {"type": "Identifier", "name": "a"}}
//! ]}"#;
//! let text = jssa::construct_json(json).unwrap();
//! assert_eq!(text, "block B0\n  i1 = loadGlobal %\"a\"\n  i2 = ret i1");
//! ```

pub mod tracing_config;

pub use jssa_ast as ast;
pub use jssa_builder as builder;
pub use jssa_ir as ir;

pub use jssa_builder::{BuildError, IdCounters, construct, construct_with};
pub use jssa_ir::stringify;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] ast::DecodeError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Decode an ESTree program, build its CFGs and render them as text.
pub fn construct_json(text: &str) -> Result<String, Error> {
    let program = ast::Program::from_json(text)?;
    debug!(statements = program.body.len(), "decoded program");
    let cfgs = construct(&program)?;
    Ok(stringify(&cfgs))
}
