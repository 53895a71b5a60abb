use std::path::PathBuf;

use thiserror::Error;

use super::Atom;

/// Returned by the coordinator's incremental `add_*` methods (spec §4.1) when the addition is
/// detected to be trivially root-unsatisfiable. Mirrors the teacher's
/// `ConstraintOperationError`: a unit-like signal, not a diagnostic (the diagnostic, if any, was
/// already logged at the point of detection).
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintOperationError {
    #[error("the addition makes the problem trivially unsatisfiable at the root level")]
    InfeasibleState,
}

/// Semantic errors detected while a problem is being built (spec §7 "Semantic errors").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("atom {0:?} is the head of more than one rule")]
    DuplicateRuleHead(Atom),
    #[error("set id {0} is used before it is declared")]
    UndefinedSet(u32),
    #[error("rule head {0:?} is negative, which is not allowed")]
    NegativeHead(Atom),
    #[error("product aggregate on set {set} has a non-positive weight on literal {literal:?}")]
    NonPositiveProductWeight { set: u32, literal: super::Literal },
    #[error("weight computation for set {set} overflowed in fixed-precision mode")]
    WeightOverflow { set: u32 },
    #[error("atom {0:?} was never declared")]
    UndeclaredAtom(Atom),
}

/// The kind of resource that was exhausted (spec §7 "Resource exhaustion").
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    #[error("memory budget exceeded")]
    Memory,
    #[error("time or size signal received")]
    TimeOrSize,
}

/// Top-level error surfaced to the driver/CLI (spec §7). Search-time propagation conflicts are
/// *not* represented here: they are recovered by ordinary CDCL backtracking and never escape the
/// coordinator (spec §7 "Propagation policy").
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("parse error at {file:?}:{line}:{column}: {message}")]
    Parse {
        file: Option<PathBuf>,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),
    #[error("resource exhausted: {0}")]
    ResourceExhausted(#[from] ResourceKind),
    #[error("internal inconsistency (this is a bug): {0}")]
    Internal(String),
    #[error("solve was cancelled; returning partial results")]
    Cancelled,
}
