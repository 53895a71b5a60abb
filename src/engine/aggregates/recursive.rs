//! `can_justify_head` for aggregates used as `AGGR` rule bodies in the definition engine (spec
//! §4.3 "Recursive aggregates").

use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::Weight;
use crate::engine::aggregates::aggregate::Aggregate;
use crate::engine::aggregates::aggregate::AggregateType;
use crate::engine::aggregates::aggregate::BoundSign;
use crate::engine::aggregates::weighted_set::WLSet;
use crate::engine::trail::Trail;

/// Result of attempting to justify an aggregate's head from already-justified atoms elsewhere in
/// the positive dependency graph.
#[derive(Debug, Clone)]
pub struct CanJustify {
    pub justified: bool,
    /// Literals whose current justification supports the head, when `justified`.
    pub support: Vec<Literal>,
    /// Atoms still blocking justification, when not `justified`.
    pub blockers: Vec<Atom>,
}

/// `is_justified(l)` answers whether `l`'s atom currently has a cycle-free justification (spec
/// §3 "Justification").
pub fn can_justify_head(
    agg: &Aggregate,
    set: &WLSet,
    trail: &Trail,
    is_justified: impl Fn(Literal) -> bool,
) -> CanJustify {
    match agg.ty {
        AggregateType::Max => match agg.sign {
            // "collect weights > bound whose opposite literal is already justified; if all such
            // exist, justified" (spec §4.3).
            BoundSign::Lb => {
                let mut support = Vec::new();
                let mut blockers = Vec::new();
                for &(lit, w) in set.entries() {
                    if w > agg.bound {
                        if is_justified(!lit) {
                            support.push(!lit);
                        } else {
                            blockers.push(lit.atom());
                        }
                    }
                }
                CanJustify {
                    justified: blockers.is_empty(),
                    support,
                    blockers,
                }
            }
            // "one weight >= bound with its literal justified suffices" (spec §4.3).
            BoundSign::Ub => {
                for &(lit, w) in set.entries() {
                    if w >= agg.bound && is_justified(lit) {
                        return CanJustify {
                            justified: true,
                            support: vec![lit],
                            blockers: vec![],
                        };
                    }
                }
                let blockers = set
                    .entries()
                    .iter()
                    .filter(|&&(_, w)| w >= agg.bound)
                    .map(|&(l, _)| l.atom())
                    .collect();
                CanJustify {
                    justified: false,
                    support: vec![],
                    blockers,
                }
            }
        },
        AggregateType::Sum | AggregateType::Card | AggregateType::Prod => match agg.sign {
            // "greedy-accumulate opposite-justified false-side witnesses until bestpossible <=
            // bound" (spec §4.3 SUM/LB).
            BoundSign::Lb => {
                let (_, mut running) = Aggregate::compute_cc_cp(agg.ty, set, trail);
                let mut support = Vec::new();
                let mut blockers = Vec::new();
                for &(lit, w) in set.entries() {
                    if running < agg.bound {
                        break;
                    }
                    if is_justified(!lit) {
                        running = shrink(agg.ty, running, w);
                        support.push(!lit);
                    } else {
                        blockers.push(lit.atom());
                    }
                }
                CanJustify {
                    justified: running < agg.bound,
                    support,
                    blockers,
                }
            }
            // "greedy-accumulate justified true-side contributors until bestcertain >= bound"
            // (spec §4.3 SUM/UB; PROD/UB is "treated as SUM in log domain", i.e. the same
            // multiplicative accumulation).
            BoundSign::Ub => {
                let (mut running, _) = Aggregate::compute_cc_cp(agg.ty, set, trail);
                let mut support = Vec::new();
                let mut blockers = Vec::new();
                for &(lit, w) in set.entries() {
                    if running >= agg.bound {
                        break;
                    }
                    if is_justified(lit) {
                        running = grow(agg.ty, running, w);
                        support.push(lit);
                    } else {
                        blockers.push(lit.atom());
                    }
                }
                CanJustify {
                    justified: running >= agg.bound,
                    support,
                    blockers,
                }
            }
        },
        AggregateType::Min => unreachable!("MIN is normalized to MAX before use"),
    }
}

fn grow(ty: AggregateType, acc: Weight, w: Weight) -> Weight {
    match ty {
        AggregateType::Prod => acc.saturating_mul(w),
        _ => acc + w,
    }
}

fn shrink(ty: AggregateType, acc: Weight, w: Weight) -> Weight {
    match ty {
        AggregateType::Prod => acc.truncated_div_with_bump(w),
        _ => Weight::new(acc.value().saturating_sub(w.value())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregates::aggregate::Semantics;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn sum_ub_accumulates_justified_contributors() {
        let trail = Trail::default();
        let set = WLSet::new(
            0,
            vec![(lit(1), Weight::new(3)), (lit(2), Weight::new(4))],
            AggregateType::Sum,
        )
        .unwrap()
        .0;
        let agg = Aggregate {
            head: lit(3),
            set_id: 0,
            bound: Weight::new(5),
            sign: BoundSign::Ub,
            ty: AggregateType::Sum,
            semantics: Semantics::Definition,
            reported_type: AggregateType::Sum,
            watched_partially: false,
            detached: false,
        };

        let result = can_justify_head(&agg, &set, &trail, |l| l == lit(1) || l == lit(2));
        assert!(result.justified);
    }

    #[test]
    fn sum_ub_fails_without_enough_justified_weight() {
        let trail = Trail::default();
        let set = WLSet::new(0, vec![(lit(1), Weight::new(3))], AggregateType::Sum).unwrap().0;
        let agg = Aggregate {
            head: lit(3),
            set_id: 0,
            bound: Weight::new(5),
            sign: BoundSign::Ub,
            ty: AggregateType::Sum,
            semantics: Semantics::Definition,
            reported_type: AggregateType::Sum,
            watched_partially: false,
            detached: false,
        };

        let result = can_justify_head(&agg, &set, &trail, |l| l == lit(1));
        assert!(!result.justified);
    }
}
