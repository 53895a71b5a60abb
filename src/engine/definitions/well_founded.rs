//! Well-founded model check (spec §4.4 "reuse the same cycle-source / unfounded-set machinery
//! against a total assignment"). Used when a candidate model is fully assigned: if any currently
//! true defined atom turns out to be unfounded, the model is not well-founded and must be
//! rejected.

use std::collections::HashSet;

use crate::basic_types::Atom;
use crate::engine::aggregates::AggregateEngine;
use crate::engine::definitions::dependency_graph::SccInfo;
use crate::engine::definitions::rule::DefOcc;
use crate::engine::definitions::rule::Rule;
use crate::engine::definitions::unfounded_set;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;

/// Checks whether the total assignment on `trail` is well-founded with respect to `rules`.
/// Returns the unfounded set if the model is rejected (non-empty iff rejected).
pub fn check(
    scc: &SccInfo,
    rule_of: impl Fn(Atom) -> Option<usize>,
    rules: &[Rule],
    trail: &Trail,
    aggregate_engine: &AggregateEngine,
) -> HashSet<Atom> {
    let candidates: HashSet<Atom> = scc
        .classification
        .iter()
        .enumerate()
        .filter(|(_, occ)| !matches!(occ, DefOcc::NonDefOcc))
        .map(|(idx, _)| Atom::from_index(idx))
        .filter(|&atom| trail.value_of_atom(atom) != Value::False)
        .collect();

    let u = unfounded_set::compute(candidates, rule_of, rules, trail, aggregate_engine);
    u.into_iter().filter(|&atom| trail.value_of_atom(atom) == Value::True).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Literal;
    use crate::basic_types::Reason;
    use crate::engine::definitions::dependency_graph::classify;
    use crate::engine::definitions::rule::Connective;
    use crate::engine::definitions::rule::RuleBody;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn a_self_supporting_pair_with_no_external_witness_is_rejected() {
        // a <- b, b <- a, both assigned true with no outside support: unfounded.
        let rules = vec![
            Rule {
                head: Atom::from_dimacs(1),
                body: RuleBody::Normal(Connective::Disj, vec![lit(2)]),
            },
            Rule {
                head: Atom::from_dimacs(2),
                body: RuleBody::Normal(Connective::Disj, vec![lit(1)]),
            },
        ];
        let full_edges = vec![vec![1], vec![0]];
        let pos_edges = full_edges.clone();
        let defined = vec![true, true];
        let scc = classify(2, &defined, &full_edges, &pos_edges);

        let mut trail = Trail::default();
        trail.grow_to(2);
        trail.enqueue(lit(1), Reason::Decision);
        trail.enqueue(lit(2), Reason::Decision);

        let aggregates = AggregateEngine::default();
        let u = check(
            &scc,
            |a| if a == Atom::from_dimacs(1) { Some(0) } else { Some(1) },
            &rules,
            &trail,
            &aggregates,
        );
        assert_eq!(u.len(), 2);
    }

    #[test]
    fn a_grounded_chain_is_well_founded() {
        // a <- b, b is a fact (true with no rule).
        let rules = vec![Rule {
            head: Atom::from_dimacs(1),
            body: RuleBody::Normal(Connective::Disj, vec![lit(2)]),
        }];
        let full_edges = vec![vec![1], vec![]];
        let pos_edges = full_edges.clone();
        let defined = vec![true, false];
        let scc = classify(2, &defined, &full_edges, &pos_edges);

        let mut trail = Trail::default();
        trail.grow_to(2);
        trail.enqueue(lit(2), Reason::Decision);
        trail.enqueue(lit(1), Reason::Decision);

        let aggregates = AggregateEngine::default();
        let u = check(
            &scc,
            |a| if a == Atom::from_dimacs(1) { Some(0) } else { None },
            &rules,
            &trail,
            &aggregates,
        );
        assert!(u.is_empty());
    }
}
