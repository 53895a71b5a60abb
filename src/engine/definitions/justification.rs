//! Justification search (spec §3 "Justification", §4.4 "Initial justification"). The same search
//! is reused for the initial pass, cycle-source re-justification and the unfounded-set escape
//! check — only the meaning of `pending` (which atoms do *not* currently count as support)
//! differs between callers.

use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::engine::aggregates::AggregateEngine;
use crate::engine::definitions::rule::Connective;
use crate::engine::definitions::rule::Rule;
use crate::engine::definitions::rule::RuleBody;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;

fn literal_is_support(l: Literal, trail: &Trail, pending: &impl Fn(Atom) -> bool) -> bool {
    trail.value(l) != Value::False && !pending(l.atom())
}

/// Attempts to find a justification for `rule`'s head given the current trail and `pending`
/// (atoms that cannot yet serve as support). Returns the supporting literal set, or `None` if no
/// acceptable witness exists in the rule's body.
pub fn try_justify(
    rule: &Rule,
    trail: &Trail,
    aggregate_engine: &AggregateEngine,
    pending: impl Fn(Atom) -> bool,
) -> Option<Vec<Literal>> {
    match &rule.body {
        RuleBody::Normal(Connective::Conj, body) => {
            if body.iter().all(|&l| literal_is_support(l, trail, &pending)) {
                Some(body.clone())
            } else {
                None
            }
        }
        RuleBody::Normal(Connective::Disj, body) => body
            .iter()
            .find(|&&l| literal_is_support(l, trail, &pending))
            .map(|&l| vec![l]),
        RuleBody::Aggregate(aref) => {
            let result = aggregate_engine.can_justify_head(*aref, trail, |l| literal_is_support(l, trail, &pending));
            result.justified.then_some(result.support)
        }
    }
}
