//! Fully-watched propagation (spec §4.3 "Fully watched (FW)"), the default strategy for every
//! aggregate type. Maintains no incremental state of its own: (CC, CP) are recomputed by
//! [`Aggregate::compute_cc_cp`] and forced literals are derived from them directly, mirroring the
//! teacher's linear-sum propagator's recompute-every-call style (see DESIGN.md).

use crate::basic_types::Literal;
use crate::basic_types::Weight;
use crate::engine::aggregates::aggregate::Aggregate;
use crate::engine::aggregates::aggregate::AggregateType;
use crate::engine::aggregates::aggregate::BoundSign;
use crate::engine::aggregates::weighted_set::WLSet;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;

fn combine(ty: AggregateType, acc: Weight, w: Weight) -> Weight {
    match ty {
        AggregateType::Sum | AggregateType::Card => acc + w,
        AggregateType::Prod => acc.saturating_mul(w),
        AggregateType::Max => {
            if w > acc {
                w
            } else {
                acc
            }
        }
        AggregateType::Min => unreachable!("MIN is normalized to MAX before use"),
    }
}

/// The aggregate value with `w` removed from the accumulator that contains it (spec §4.3
/// `SPAgg::remove`); for MAX, recomputed from the full set since extremum removal isn't
/// invertible in general.
fn remove(ty: AggregateType, acc: Weight, w: Weight, set: &WLSet, trail: &Trail, skip: Literal) -> Weight {
    match ty {
        AggregateType::Sum | AggregateType::Card => {
            Weight::new(acc.value().saturating_sub(w.value()))
        }
        AggregateType::Prod => {
            if w == Weight::ONE {
                acc
            } else {
                acc.truncated_div_with_bump(w)
            }
        }
        AggregateType::Max => {
            let mut best = Weight::NEG_INF;
            for &(lit, lw) in set.entries() {
                if lit == skip {
                    continue;
                }
                if trail.value(lit) != Value::False && lw > best {
                    best = lw;
                }
            }
            best
        }
        AggregateType::Min => unreachable!("MIN is normalized to MAX before use"),
    }
}

/// Literals that must be forced true for the assignment to stay consistent with `agg`'s bound,
/// given the current (CC, CP) and head value (spec §4.3 "Propagation contract").
pub fn forced_literals(agg: &Aggregate, set: &WLSet, trail: &Trail) -> Vec<Literal> {
    let (cc, cp) = Aggregate::compute_cc_cp(agg.ty, set, trail);
    let mut forced = Vec::new();

    if trail.value(agg.head) == Value::Undef {
        if let Some(v) = agg.head_forced_value(cc, cp) {
            forced.push(if v { agg.head } else { !agg.head });
        }
    }

    // Body propagation, symmetric in head value and bound sign (spec §4.3 bullet list).
    let head_value = trail.value(agg.head);
    if head_value == Value::Undef {
        return forced;
    }
    // head true with UB, or head false with LB: CC must not reach the bound.
    let cc_must_stay_below = (head_value == Value::True) == (agg.sign == BoundSign::Ub);

    for &(lit, w) in set.entries() {
        if trail.value(lit) != Value::Undef {
            continue;
        }
        if cc_must_stay_below {
            if combine(agg.ty, cc, w) >= agg.bound {
                forced.push(!lit);
            }
        } else {
            let cp_without = remove(agg.ty, cp, w, set, trail, lit);
            if cp_without < agg.bound {
                forced.push(lit);
            }
        }
    }

    forced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregates::aggregate::Semantics;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    fn sum_agg(head: Literal, bound: i64, sign: BoundSign) -> Aggregate {
        Aggregate {
            head,
            set_id: 0,
            bound: Weight::new(bound),
            sign,
            ty: AggregateType::Sum,
            semantics: Semantics::Completion,
            reported_type: AggregateType::Sum,
            watched_partially: false,
            detached: false,
        }
    }

    #[test]
    fn ub_head_false_when_cc_reaches_bound() {
        let mut trail = Trail::default();
        trail.grow_to(4);
        trail.enqueue(lit(1), crate::basic_types::Reason::Decision);
        trail.enqueue(lit(2), crate::basic_types::Reason::Decision);

        let set = WLSet::new(
            0,
            vec![(lit(1), Weight::new(3)), (lit(2), Weight::new(4)), (lit(3), Weight::new(1))],
            AggregateType::Sum,
        )
        .unwrap()
        .0;
        let agg = sum_agg(lit(4), 5, BoundSign::Ub);

        let forced = forced_literals(&agg, &set, &trail);
        assert!(forced.contains(&!lit(4)));
    }

    #[test]
    fn ub_head_true_forces_remaining_literal_false() {
        let mut trail = Trail::default();
        trail.grow_to(4);
        trail.enqueue(lit(4), crate::basic_types::Reason::Decision);
        trail.enqueue(lit(1), crate::basic_types::Reason::Decision);

        let set = WLSet::new(
            0,
            vec![(lit(1), Weight::new(4)), (lit(2), Weight::new(3))],
            AggregateType::Sum,
        )
        .unwrap()
        .0;
        let agg = sum_agg(lit(4), 5, BoundSign::Ub);

        let forced = forced_literals(&agg, &set, &trail);
        assert!(forced.contains(&!lit(2)));
    }
}
