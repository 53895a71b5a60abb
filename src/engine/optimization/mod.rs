//! Model-enumeration and optimization driver (spec §4.6): subset-minimization,
//! ordered-list-minimization and aggregate-minimization, each driving `solve` iteratively over a
//! generic search backend.

use crate::basic_types::Literal;
use crate::basic_types::Weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    Sat,
    Unsat,
    Unknown,
}

/// What the optimization driver needs from the coordinator (kept generic so this module doesn't
/// depend on the coordinator's concrete type).
pub trait SearchDriver {
    fn solve(&mut self) -> SolveOutcome;
    fn add_clause(&mut self, literals: Vec<Literal>);
    fn value(&self, literal: Literal) -> bool;
    /// Every literal assigned in the current (last found) model.
    fn snapshot_model(&self) -> Vec<Literal>;
    /// Current certain weight of the sum aggregate whose head is `head` (spec §4.6 "tighten the
    /// bound to CC - 1").
    fn aggregate_cc(&self, head: Literal) -> Weight;
    fn tighten_aggregate_ub(&mut self, head: Literal, bound: Weight);
}

/// Subset minimization (spec §4.6): after each model, forbid the current true subset of `subset`
/// from recurring wholesale. Returns the last (most minimal) model found, or `None` if the
/// problem was already unsatisfiable.
pub fn minimize_subset(driver: &mut impl SearchDriver, subset: &[Literal]) -> Option<Vec<Literal>> {
    let mut best = None;
    loop {
        if driver.solve() != SolveOutcome::Sat {
            break;
        }
        best = Some(driver.snapshot_model());
        let true_literals: Vec<Literal> = subset.iter().copied().filter(|&l| driver.value(l)).collect();
        if true_literals.is_empty() {
            break;
        }
        driver.add_clause(true_literals.iter().map(|&l| !l).collect());
    }
    best
}

/// Ordered-list (lexicographic) minimization (spec §4.6): `order` is `l1 < l2 < ... < ln`; each
/// round finds the first true literal and forbids everything at or before it from recurring.
pub fn minimize_ordered_list(driver: &mut impl SearchDriver, order: &[Literal]) -> Option<Vec<Literal>> {
    let mut best = None;
    loop {
        if driver.solve() != SolveOutcome::Sat {
            break;
        }
        best = Some(driver.snapshot_model());
        let Some(first_true) = order.iter().position(|&l| driver.value(l)) else {
            break;
        };
        for &l in &order[..first_true] {
            driver.add_clause(vec![!l]);
        }
        driver.add_clause(vec![!order[first_true]]);
    }
    best
}

/// Aggregate minimization (spec §4.6): tighten a sum aggregate's upper bound to `CC - 1` after
/// every model until the solver proves UNSAT, at which point the previous model is optimal.
pub fn minimize_aggregate(driver: &mut impl SearchDriver, head: Literal) -> Option<Vec<Literal>> {
    let mut best = None;
    loop {
        if driver.solve() != SolveOutcome::Sat {
            break;
        }
        best = Some(driver.snapshot_model());
        let cc = driver.aggregate_cc(head);
        driver.tighten_aggregate_ub(head, cc + Weight::new(-1));
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    struct CountingDriver {
        // Each call flips one more literal of `true_each_round` to false, simulating successive
        // tighter models until none remain true.
        true_each_round: Vec<Literal>,
        round: usize,
        calls: usize,
    }

    impl SearchDriver for CountingDriver {
        fn solve(&mut self) -> SolveOutcome {
            self.calls += 1;
            if self.round > self.true_each_round.len() {
                SolveOutcome::Unsat
            } else {
                SolveOutcome::Sat
            }
        }

        fn add_clause(&mut self, _literals: Vec<Literal>) {
            self.round += 1;
        }

        fn value(&self, literal: Literal) -> bool {
            self.true_each_round[self.round..].contains(&literal)
        }

        fn snapshot_model(&self) -> Vec<Literal> {
            self.true_each_round[self.round..].to_vec()
        }

        fn aggregate_cc(&self, _head: Literal) -> Weight {
            Weight::ZERO
        }

        fn tighten_aggregate_ub(&mut self, _head: Literal, _bound: Weight) {}
    }

    #[test]
    fn subset_minimization_shrinks_until_the_subset_is_empty() {
        let mut driver = CountingDriver {
            true_each_round: vec![lit(1), lit(2), lit(3)],
            round: 0,
            calls: 0,
        };
        let subset = vec![lit(1), lit(2), lit(3)];
        let best = minimize_subset(&mut driver, &subset).unwrap();
        assert!(best.is_empty());
        assert_eq!(driver.round, 3);
    }

    #[test]
    fn ordered_list_forbids_everything_up_to_and_including_the_first_true_literal() {
        let mut driver = CountingDriver {
            true_each_round: vec![lit(1)],
            round: 0,
            calls: 0,
        };
        let order = vec![lit(1)];
        let best = minimize_ordered_list(&mut driver, &order).unwrap();
        assert!(best.is_empty());
    }
}
