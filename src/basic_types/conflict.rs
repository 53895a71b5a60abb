use std::fmt;

use super::ClauseReference;
use super::Literal;

/// An unordered set of literals that are jointly false and together entail a propagation or a
/// conflict (spec §4.1 "explanation ... a clause `E` such that `E ⇒ l`").
///
/// Kept separate from [`crate::engine::sat::Clause`]: a conjunction may describe an explanation
/// that is never materialized as a clause in the arena (e.g. it gets discarded by 1-UIP
/// minimization before ever being added).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropositionalConjunction {
    literals: Vec<Literal>,
}

impl PropositionalConjunction {
    pub fn new(literals: Vec<Literal>) -> Self {
        PropositionalConjunction { literals }
    }

    pub fn add(&mut self, literal: Literal) {
        self.literals.push(literal);
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn into_literals(self) -> Vec<Literal> {
        self.literals
    }
}

impl From<Vec<Literal>> for PropositionalConjunction {
    fn from(literals: Vec<Literal>) -> Self {
        PropositionalConjunction { literals }
    }
}

impl FromIterator<Literal> for PropositionalConjunction {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        PropositionalConjunction {
            literals: iter.into_iter().collect(),
        }
    }
}

/// Identifies which engine supplied a propagation or conflict reason, for the reason/explanation
/// protocol of spec §4.1 ("the coordinator lazily asks its engine for a clause").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EngineId {
    Clausal,
    Aggregate,
    Definition,
    Cp,
    Modal,
}

/// An opaque tag an engine attaches to a propagated literal so it can reconstruct the
/// explanation on demand later (spec §3 "Assignment / Trail": "a *theory tag* identifying which
/// engine produced it"). The `code` is interpreted only by the owning engine (e.g. the
/// aggregate engine packs an aggregate id and a stack index into it).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TheoryTag {
    pub engine: EngineId,
    pub code: u64,
}

impl TheoryTag {
    pub fn new(engine: EngineId, code: u64) -> Self {
        TheoryTag { engine, code }
    }
}

/// The reason a literal is on the trail: a decision, a clause that propagated it, or a theory
/// tag whose owning engine reconstructs the explanation lazily (spec §3, §4.1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    Decision,
    Clause(ClauseReference),
    Theory(TheoryTag),
}

/// What a propagator returns when it finds a conflict: either a clause already materialized in
/// the arena, or a conjunction of currently-false literals that entail `false` (spec §4.1: "a
/// conflict clause `C` must contain at least one literal from the current decision level").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConflictInfo {
    Clause(ClauseReference),
    Explanation(PropositionalConjunction),
}

impl From<PropositionalConjunction> for ConflictInfo {
    fn from(conjunction: PropositionalConjunction) -> Self {
        ConflictInfo::Explanation(conjunction)
    }
}

impl From<ClauseReference> for ConflictInfo {
    fn from(clause: ClauseReference) -> Self {
        ConflictInfo::Clause(clause)
    }
}

impl fmt::Display for ConflictInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictInfo::Clause(c) => write!(f, "conflict in {c:?}"),
            ConflictInfo::Explanation(e) => write!(f, "conflict via {} literals", e.literals().len()),
        }
    }
}

/// The result of a single propagation step performed by any of the three theory engines or the
/// clausal engine (spec §4.1, §4.2-§4.4).
pub type PropagationStatus = Result<(), ConflictInfo>;

/// Retained for parity with the teacher's naming: some call sites read more naturally phrased as
/// "this domain/engine became inconsistent" rather than "this propagation returned a conflict".
pub type Inconsistency = ConflictInfo;
