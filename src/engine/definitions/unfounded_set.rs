//! Unfounded-set computation (spec §4.4 "compute an unfounded set U").
//!
//! Implemented as fixpoint removal: start from a candidate set and repeatedly drop any atom that
//! finds an escape (a non-false body witness outside the remaining set), until no more atoms can
//! be removed. This computes the same unfounded set as a breadth-first closure from the cycle
//! sources; the pruning depth-first variant spec §4.4 also allows is not implemented separately
//! since it differs only in traversal order, not in the result (see DESIGN.md).

use std::collections::HashSet;

use crate::basic_types::Atom;
use crate::engine::aggregates::AggregateEngine;
use crate::engine::definitions::justification::try_justify;
use crate::engine::definitions::rule::Rule;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;

/// Computes the unfounded set starting from `candidates` (typically every currently-true-or-undef
/// atom reachable from the cycle sources within their positive SCCs).
pub fn compute(
    candidates: HashSet<Atom>,
    rule_of: impl Fn(Atom) -> Option<usize>,
    rules: &[Rule],
    trail: &Trail,
    aggregate_engine: &AggregateEngine,
) -> HashSet<Atom> {
    let mut u = candidates;
    loop {
        let mut removed = Vec::new();
        for &atom in &u {
            if trail.value_of_atom(atom) == Value::False {
                removed.push(atom);
                continue;
            }
            let Some(rule_idx) = rule_of(atom) else {
                removed.push(atom);
                continue;
            };
            let escaped = try_justify(&rules[rule_idx], trail, aggregate_engine, |a| u.contains(&a)).is_some();
            if escaped {
                removed.push(atom);
            }
        }
        if removed.is_empty() {
            break;
        }
        for atom in removed {
            u.remove(&atom);
        }
    }
    u
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Literal;
    use crate::engine::definitions::rule::Connective;
    use crate::engine::definitions::rule::RuleBody;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn mutually_supporting_pair_with_no_external_witness_is_unfounded() {
        // a <- b. b <- a. Neither has any external support, so {a, b} is unfounded.
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
        let trail = Trail::default();
        let aggregates = AggregateEngine::default();

        let candidates: HashSet<Atom> = [Atom::from_dimacs(1), Atom::from_dimacs(2)].into_iter().collect();
        let u = compute(
            candidates,
            |a| if a == Atom::from_dimacs(1) { Some(0) } else { Some(1) },
            &rules,
            &trail,
            &aggregates,
        );
        assert_eq!(u.len(), 2);
    }

    #[test]
    fn external_support_escapes_the_set() {
        // a <- b. b <- c (c external, currently true) — b escapes, then a escapes too.
        let rules = vec![
            Rule {
                head: Atom::from_dimacs(1),
                body: RuleBody::Normal(Connective::Disj, vec![lit(2)]),
            },
            Rule {
                head: Atom::from_dimacs(2),
                body: RuleBody::Normal(Connective::Disj, vec![lit(3)]),
            },
        ];
        let mut trail = Trail::default();
        trail.grow_to(4);
        trail.enqueue(lit(3), crate::basic_types::Reason::Decision);
        let aggregates = AggregateEngine::default();

        let candidates: HashSet<Atom> = [Atom::from_dimacs(1), Atom::from_dimacs(2)].into_iter().collect();
        let u = compute(
            candidates,
            |a| if a == Atom::from_dimacs(1) { Some(0) } else { Some(1) },
            &rules,
            &trail,
            &aggregates,
        );
        assert!(u.is_empty());
    }
}
