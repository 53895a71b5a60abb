//! 1-UIP conflict analysis (spec §4.2 "1-UIP learning"), calling back into whichever engine owns
//! a literal's reason when that reason is a [`TheoryTag`] rather than a clause (spec §4.1 "the
//! coordinator lazily asks its engine for a clause `E`").

use crate::basic_types::Atom;
use crate::basic_types::ClauseReference;
use crate::basic_types::ConflictInfo;
use crate::basic_types::DecisionLevel;
use crate::basic_types::Literal;
use crate::basic_types::PropositionalConjunction;
use crate::basic_types::Reason;
use crate::basic_types::TheoryTag;
use crate::engine::sat::ActivityHeap;
use crate::engine::sat::ClauseAllocator;
use crate::engine::trail::Trail;

fn conflict_literals(conflict: &ConflictInfo, allocator: &ClauseAllocator) -> Vec<Literal> {
    match *conflict {
        ConflictInfo::Clause(cref) => allocator.get(cref).literals().to_vec(),
        ConflictInfo::Explanation(ref conjunction) => conjunction.literals().to_vec(),
    }
}

/// The literals of `lit`'s reason, excluding `lit` itself, each currently false. Empty for a
/// decision literal (which conflict analysis never needs to resolve past, since the loop always
/// terminates at the 1-UIP before reaching a decision — except when the 1-UIP *is* the decision
/// literal of its level, which is also handled correctly since `counter` reaches zero there).
fn antecedent_literals(
    lit: Literal,
    trail: &Trail,
    allocator: &ClauseAllocator,
    explain_theory: &mut impl FnMut(Literal, TheoryTag) -> PropositionalConjunction,
) -> Vec<Literal> {
    match trail.reason_of(lit.atom()) {
        Reason::Decision => Vec::new(),
        Reason::Clause(cref) => allocator
            .get(cref)
            .literals()
            .iter()
            .copied()
            .filter(|&l| l != lit)
            .collect(),
        Reason::Theory(tag) => explain_theory(lit, tag).into_literals(),
    }
}

/// Runs 1-UIP resolution starting from `conflict`, returning the learned clause (with the
/// asserting literal — the negated 1-UIP — at index 0) and the level to backtrack to.
pub fn analyze(
    conflict: ConflictInfo,
    trail: &Trail,
    allocator: &ClauseAllocator,
    activity: &mut ActivityHeap,
    mut explain_theory: impl FnMut(Literal, TheoryTag) -> PropositionalConjunction,
) -> (Vec<Literal>, DecisionLevel) {
    let mut seen = vec![false; trail.num_atoms()];
    let mut learned: Vec<Literal> = vec![Literal::from_code(0)];
    let current_level = trail.decision_level();
    let mut counter = 0usize;
    let mut trail_cursor = trail.len();
    let mut pending = conflict_literals(&conflict, allocator);

    let uip = loop {
        for lit in pending.drain(..) {
            let atom: Atom = lit.atom();
            if seen[atom.index()] {
                continue;
            }
            let level = trail.level_of(atom);
            if level == 0 {
                continue;
            }
            seen[atom.index()] = true;
            activity.bump(atom);
            if level == current_level {
                counter += 1;
            } else {
                learned.push(lit);
            }
        }

        let next_lit = loop {
            trail_cursor -= 1;
            let candidate = trail.literal_at(trail_cursor);
            if seen[candidate.atom().index()] {
                break candidate;
            }
        };
        seen[next_lit.atom().index()] = false;
        counter -= 1;
        if counter == 0 {
            break next_lit;
        }
        pending = antecedent_literals(next_lit, trail, allocator, &mut explain_theory);
    };

    learned[0] = !uip;
    let backtrack_level = learned[1..]
        .iter()
        .map(|&l| trail.level_of(l.atom()))
        .max()
        .unwrap_or(0);
    (learned, backtrack_level)
}

/// Builds the invalidation clause used by model enumeration (spec §4.1): the negation of the
/// current decision/assumption literals.
pub fn invalidation_clause(decision_literals: &[Literal]) -> Vec<Literal> {
    decision_literals.iter().map(|&l| !l).collect()
}

/// A clause `E` used as an explanation is never tautological or duplicated when it comes from
/// `analyze` (each atom is `seen` at most once), but explanations returned directly by a theory
/// engine are checked here before being handed to the allocator (spec §8 "Every learned clause ...
/// is non-tautological").
pub fn is_well_formed_explanation(literals: &[Literal]) -> bool {
    let mut atoms = std::collections::HashSet::new();
    for &lit in literals {
        if !atoms.insert(lit.atom()) {
            return false;
        }
    }
    true
}

#[allow(dead_code)]
pub fn dummy_reference_for_tests() -> ClauseReference {
    ClauseReference::from_index(0)
}
