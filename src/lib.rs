//! `xcdcl`: an extended DPLL/CDCL core combining a clausal SAT engine, pseudo-Boolean aggregates,
//! inductive (stable/well-founded) definitions and a bounded finite-domain bridge under a single
//! theory coordinator.
//!
//! Library users build a problem incrementally against
//! [`engine::coordinator::TheoryCoordinator`], call `finish_parsing`, then drive
//! `solve_with_assumptions` directly or through one of the [`engine::optimization`] drivers.
//! Parsers (`parsing`) and the CLI binary are thin front ends over that same API.

pub mod asserts;
pub mod basic_types;
pub mod engine;
pub mod options;
pub mod output;
pub mod parsing;
pub mod remap;

pub use basic_types::Atom;
pub use basic_types::Literal;
pub use basic_types::Weight;
pub use engine::coordinator::TheoryCoordinator;
