//! Rules and their classification in the dependency graph (spec §3 "Rule", "Scc tags").

use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::engine::aggregates::AggregateRef;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Connective {
    Conj,
    Disj,
}

/// A rule's body: either a plain conjunction/disjunction of literals, or a reference to an
/// aggregate that defines the head (an `AGGR` rule, spec §3).
#[derive(Debug, Clone)]
pub enum RuleBody {
    Normal(Connective, Vec<Literal>),
    Aggregate(AggregateRef),
}

/// `head ↔ body` (spec §3 "Rule"). Each defined atom is the head of exactly one rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub head: Atom,
    pub body: RuleBody,
}

impl Rule {
    /// Literals counted as positive-dependency edges from `head` (spec §3 "edges from head to
    /// positively occurring body atoms"). For an `AGGR` rule every set literal is treated as a
    /// positive occurrence (the aggregate's own monotonicity determines the real dependency, but
    /// the coarser over-approximation here only affects which atoms are *candidates* for a loop,
    /// never soundness).
    pub fn positive_body_literals(&self, aggregate_sets: impl Fn(AggregateRef) -> Vec<Literal>) -> Vec<Literal> {
        match &self.body {
            RuleBody::Normal(_, body) => body.iter().copied().filter(|l| l.is_positive()).collect(),
            RuleBody::Aggregate(aref) => aggregate_sets(*aref),
        }
    }
}

/// Classification of a defined atom's role in the two dependency graphs (spec §3 "Scc tags").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DefOcc {
    NonDefOcc,
    PosLoop,
    MixedLoop,
    BothLoop,
}
