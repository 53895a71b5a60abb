//! Test-only scaffolding for building a coordinator and asserting trail state without going
//! through a parser, mirroring the teacher's own `engine/test_helper.rs`.

#![cfg(test)]

use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::engine::coordinator::TheoryCoordinator;
use crate::engine::optimization::SearchDriver;

/// A coordinator plus a handful of fresh atoms, for tests that just need some variables to wire
/// clauses/rules/aggregates over.
pub struct TestInstance {
    pub coordinator: TheoryCoordinator,
    pub atoms: Vec<Atom>,
}

pub fn build(num_atoms: usize) -> TestInstance {
    let mut coordinator = TheoryCoordinator::default();
    let atoms = (0..num_atoms).map(|_| coordinator.add_var()).collect();
    TestInstance { coordinator, atoms }
}

/// Adds every clause, then runs `finish_parsing` and asserts the root wasn't found unsat.
pub fn assert_consistent_after(coordinator: &mut TheoryCoordinator, clauses: Vec<Vec<Literal>>) {
    for clause in clauses {
        coordinator.add_clause(clause).expect("clause addition should not fail before finish_parsing");
    }
    let (_present, unsat) = coordinator.finish_parsing();
    assert!(!unsat, "expected the root-level constraints to remain satisfiable");
}

pub fn assert_true(coordinator: &TheoryCoordinator, literal: Literal) {
    assert!(coordinator.value(literal), "expected {literal:?} to be true");
}

pub fn assert_false(coordinator: &TheoryCoordinator, literal: Literal) {
    assert!(!coordinator.value(literal), "expected {literal:?} to be false");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_small_instance_and_checks_consistency() {
        let mut instance = build(2);
        let a = instance.atoms[0];
        let b = instance.atoms[1];
        assert_consistent_after(&mut instance.coordinator, vec![vec![a.positive(), b.positive()]]);
        instance.coordinator.add_forced_choices(vec![a.negative()]).unwrap();
        let (_present, unsat) = instance.coordinator.finish_parsing();
        assert!(!unsat);
        assert_eq!(instance.coordinator.solve_with_assumptions(Vec::new()), crate::engine::optimization::SolveOutcome::Sat);
        assert_true(&instance.coordinator, b.positive());
    }
}
