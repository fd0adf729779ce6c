//! Syntax tree for the ECMAScript 5 subset lowered by `jssa-builder`.
//!
//! Trees are either built directly with the convenience constructors on
//! [`Stmt`] and [`Expr`], or decoded from ESTree JSON with
//! [`Program::from_json`].

pub mod estree;
pub mod node;
pub mod visit;

pub use estree::DecodeError;
pub use node::*;
pub use visit::Visitor;

#[cfg(test)]
#[path = "tests/visit_tests.rs"]
mod visit_tests;
