//! The six end-to-end scenarios built directly against the coordinator API (no parser round-trip
//! needed, since each scenario is a literal set of rules/sets/aggregates/facts).

use xcdcl::basic_types::Weight;
use xcdcl::engine::aggregates::AggregateType;
use xcdcl::engine::aggregates::BoundSign;
use xcdcl::engine::aggregates::Semantics;
use xcdcl::engine::coordinator::TheoryCoordinator;
use xcdcl::engine::definitions::Connective;
use xcdcl::engine::optimization::SearchDriver;
use xcdcl::engine::optimization::SolveOutcome;
use xcdcl::output::write_optimum_found;
use xcdcl::output::write_optimum_step;

#[test]
fn a_positive_two_cycle_with_no_support_is_only_satisfiable_by_both_false() {
    let mut coordinator = TheoryCoordinator::default();
    let p = coordinator.add_var();
    let q = coordinator.add_var();
    coordinator.add_rule(Connective::Disj, p, vec![q.positive()]);
    coordinator.add_rule(Connective::Disj, q, vec![p.positive()]);

    let (_present, unsat) = coordinator.finish_parsing();
    assert!(!unsat);
    assert_eq!(coordinator.solve_with_assumptions(Vec::new()), SolveOutcome::Sat);
    assert!(coordinator.value(p.negative()));
    assert!(coordinator.value(q.negative()));
}

#[test]
fn a_sum_aggregate_head_is_derived_true_once_its_lower_bound_is_certainly_met() {
    let mut coordinator = TheoryCoordinator::default();
    let h = coordinator.add_var();
    let a = coordinator.add_var();
    let b = coordinator.add_var();
    let c = coordinator.add_var();
    coordinator
        .add_set(0, vec![(a.positive(), Weight::ONE), (b.positive(), Weight::ONE), (c.positive(), Weight::ONE)], AggregateType::Sum)
        .unwrap();
    coordinator
        .add_aggregate(h.positive(), 0, Weight::new(2), BoundSign::Lb, AggregateType::Sum, Semantics::Completion)
        .unwrap();
    coordinator.add_forced_choices(vec![a.positive(), b.positive()]).unwrap();

    let (_present, unsat) = coordinator.finish_parsing();
    assert!(!unsat);
    assert!(coordinator.value(h.positive()));
}

#[test]
fn a_max_aggregate_head_is_derived_false_once_its_lower_bound_is_unreachable() {
    let mut coordinator = TheoryCoordinator::default();
    let h = coordinator.add_var();
    let x = coordinator.add_var();
    let y = coordinator.add_var();
    let z = coordinator.add_var();
    coordinator
        .add_set(0, vec![(x.positive(), Weight::new(3)), (y.positive(), Weight::new(5)), (z.positive(), Weight::new(2))], AggregateType::Max)
        .unwrap();
    coordinator
        .add_aggregate(h.positive(), 0, Weight::new(4), BoundSign::Lb, AggregateType::Max, Semantics::Completion)
        .unwrap();
    coordinator.add_forced_choices(vec![x.negative(), y.negative()]).unwrap();

    let (_present, unsat) = coordinator.finish_parsing();
    assert!(!unsat);
    assert!(coordinator.value(h.negative()));
}

#[test]
fn two_rules_sharing_a_head_allow_support_from_either_disjunct() {
    let mut coordinator = TheoryCoordinator::default();
    let p = coordinator.add_var();
    let a = coordinator.add_var();
    let b = coordinator.add_var();
    // "p <- a. p <- b." is one rule with a disjunctive body over {a, b}: either disjunct alone
    // supports the head.
    coordinator.add_rule(Connective::Disj, p, vec![a.positive(), b.positive()]);
    coordinator.add_forced_choices(vec![a.positive(), b.negative(), p.positive()]).unwrap();

    let (_present, unsat) = coordinator.finish_parsing();
    assert!(!unsat);
    assert!(coordinator.value(p.positive()));
}

#[test]
fn a_head_true_with_neither_disjunct_supporting_it_is_unsatisfiable() {
    let mut coordinator = TheoryCoordinator::default();
    let p = coordinator.add_var();
    let a = coordinator.add_var();
    let b = coordinator.add_var();
    coordinator.add_rule(Connective::Disj, p, vec![a.positive(), b.positive()]);
    coordinator.add_forced_choices(vec![a.negative(), b.negative(), p.positive()]).unwrap();

    let (_present, unsat) = coordinator.finish_parsing();
    assert!(unsat);
}

#[test]
fn minimizing_a_weighted_sum_under_a_disjunctive_clause_converges_on_the_cheapest_literal() {
    let mut coordinator = TheoryCoordinator::default();
    let a = coordinator.add_var();
    let b = coordinator.add_var();
    let c = coordinator.add_var();
    let objective = coordinator.add_var();
    coordinator.add_clause(vec![a.positive(), b.positive(), c.positive()]).unwrap();
    coordinator
        .add_set(0, vec![(a.positive(), Weight::ONE), (b.positive(), Weight::new(2)), (c.positive(), Weight::new(3))], AggregateType::Sum)
        .unwrap();
    let objective_ref = coordinator
        .add_aggregate(objective.positive(), 0, Weight::POS_INF, BoundSign::Ub, AggregateType::Sum, Semantics::Completion)
        .unwrap();
    let _ = objective_ref;
    coordinator.add_clause(vec![objective.positive()]).unwrap();

    let (_present, unsat) = coordinator.finish_parsing();
    assert!(!unsat);

    let mut trace = Vec::new();
    let mut best = None;
    loop {
        if coordinator.solve() != SolveOutcome::Sat {
            break;
        }
        best = Some(coordinator.snapshot_model());
        let cc = coordinator.aggregate_cc(objective.positive());
        write_optimum_step(&mut trace, cc).unwrap();
        coordinator.tighten_aggregate_ub(objective.positive(), cc + Weight::new(-1));
    }
    write_optimum_found(&mut trace).unwrap();

    let best = best.expect("at least one model exists before the bound becomes infeasible");
    assert!(best.contains(&a.positive()));
    assert!(!best.contains(&b.positive()));
    assert!(!best.contains(&c.positive()));

    let trace = String::from_utf8(trace).unwrap();
    assert!(trace.contains("o 1\n"));
    assert!(trace.trim_end().ends_with("OPTIMUM FOUND"));
}

#[test]
fn a_loop_with_an_external_fact_supporting_one_member_is_satisfiable() {
    let mut coordinator = TheoryCoordinator::default();
    let p = coordinator.add_var();
    let q = coordinator.add_var();
    // A reserved always-true atom stands in for the separate fact "p." alongside the rule
    // "p <- q.": together they are one rule, "p <- q. p <- true.", i.e. a disjunctive body.
    let top = coordinator.add_var();
    coordinator.add_clause(vec![top.positive()]).unwrap();
    coordinator.add_rule(Connective::Disj, p, vec![q.positive(), top.positive()]);
    coordinator.add_rule(Connective::Disj, q, vec![p.positive()]);

    let (_present, unsat) = coordinator.finish_parsing();
    assert!(!unsat);
    assert_eq!(coordinator.solve_with_assumptions(Vec::new()), SolveOutcome::Sat);
    assert!(coordinator.value(p.positive()));
    assert!(coordinator.value(q.positive()));
}
