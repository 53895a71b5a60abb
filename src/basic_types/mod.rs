//! Primitive types shared by every engine: atoms, literals, clause references, weights, and the
//! error/conflict vocabulary used at the theory-coordinator boundary (spec §3, §7).

mod atom;
mod clause_reference;
mod conflict;
mod errors;
mod literal;
mod weight;

pub use atom::Atom;
pub use clause_reference::ClauseReference;
pub use conflict::ConflictInfo;
pub use conflict::EngineId;
pub use conflict::Inconsistency;
pub use conflict::PropagationStatus;
pub use conflict::PropositionalConjunction;
pub use conflict::Reason;
pub use conflict::TheoryTag;
pub use errors::ConstraintOperationError;
pub use errors::ResourceKind;
pub use errors::SemanticError;
pub use errors::SolverError;
pub use literal::Literal;
pub use weight::Weight;

/// A decision level: 0 is the root (no decisions made).
pub type DecisionLevel = usize;
