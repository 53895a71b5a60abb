//! Loop formula construction (spec §4.4 "construct the external-support clause for U, optionally
//! through a Tseitin variable when `|External(U)|` exceeds a threshold").

use std::collections::HashSet;

use crate::basic_types::Atom;
use crate::basic_types::ClauseReference;
use crate::basic_types::Literal;
use crate::engine::definitions::rule::Rule;
use crate::engine::sat::ClauseAllocator;

/// The literals outside `u` that could still justify some atom in `u` (spec §3 "External(U)").
pub fn external_literals(
    u: &HashSet<Atom>,
    rules_of: impl Fn(Atom) -> Vec<usize>,
    rules: &[Rule],
    aggregate_sets: impl Fn(crate::engine::aggregates::AggregateRef) -> Vec<Literal>,
) -> Vec<Literal> {
    let mut external = Vec::new();
    let mut seen = HashSet::new();
    for &atom in u {
        for &rule_idx in &rules_of(atom) {
            let rule = &rules[rule_idx];
            for lit in rule.positive_body_literals(&aggregate_sets) {
                if !u.contains(&lit.atom()) && seen.insert(lit) {
                    external.push(lit);
                }
            }
        }
    }
    external
}

/// Above this many external literals, a fresh Tseitin atom is introduced to keep the loop
/// formula's own clause (and the per-atom clauses referencing it) small (spec §4.4).
pub const TSEITIN_THRESHOLD: usize = 32;

/// Materializes the clauses asserting "every atom in `u` requires some external support",
/// allocated directly in the arena (spec §4.4: loop formulas are ordinary clauses, not a separate
/// theory-tag explanation path). Returns the allocated clause references.
pub fn build_clauses(
    u: &HashSet<Atom>,
    external: &[Literal],
    threshold: usize,
    mut new_atom: impl FnMut() -> Atom,
    allocator: &mut ClauseAllocator,
) -> Vec<ClauseReference> {
    let mut clauses = Vec::new();

    let gate: Option<Literal> = if external.len() > threshold {
        let t = Literal::from_atom(new_atom(), true);
        let mut clause = vec![!t];
        clause.extend(external.iter().copied());
        clauses.push(allocator.make_clause(clause));
        for &e in external {
            clauses.push(allocator.make_clause(vec![!e, t]));
        }
        Some(t)
    } else {
        None
    };

    for &atom in u {
        let not_a = Literal::from_atom(atom, false);
        let mut literals = match gate {
            Some(t) => vec![t, not_a],
            None => {
                let mut lits = external.to_vec();
                lits.push(not_a);
                lits
            }
        };
        literals.dedup();
        clauses.push(allocator.make_clause(literals));
    }

    clauses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::definitions::rule::Connective;
    use crate::engine::definitions::rule::RuleBody;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn external_literals_excludes_atoms_inside_the_loop() {
        let rules = vec![Rule {
            head: Atom::from_dimacs(1),
            body: RuleBody::Normal(Connective::Disj, vec![lit(2), lit(3)]),
        }];
        let u: HashSet<Atom> = [Atom::from_dimacs(1), Atom::from_dimacs(2)].into_iter().collect();
        let ext = external_literals(&u, |_| vec![0], &rules, |_| vec![]);
        assert_eq!(ext, vec![lit(3)]);
    }

    #[test]
    fn small_loop_gets_direct_clause_per_atom_without_a_tseitin_gate() {
        let mut allocator = ClauseAllocator::default();
        let u: HashSet<Atom> = [Atom::from_dimacs(1)].into_iter().collect();
        let external = vec![lit(5)];
        let clauses = build_clauses(&u, &external, TSEITIN_THRESHOLD, || Atom::from_dimacs(99), &mut allocator);
        assert_eq!(clauses.len(), 1);
        let clause = allocator.get(clauses[0]);
        assert_eq!(clause.literals().len(), 2);
    }
}
