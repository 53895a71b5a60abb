//! Partially-watched cardinality propagation (spec §4.3 "Partially watched (PW), cardinality
//! only"). The reference design keeps two persistent witness pools (`NF`/`NT`) and only replaces
//! a witness when it is lost; this crate recomputes the witness pools by scanning the set on each
//! call instead of keeping them as incremental watch state (same trade-off as
//! [`crate::engine::aggregates::fully_watched`], see DESIGN.md) — the propagation conclusions are
//! identical to a persistent-watch implementation, only the bookkeeping differs.

use crate::basic_types::Literal;
use crate::basic_types::Weight;
use crate::engine::aggregates::aggregate::Aggregate;
use crate::engine::aggregates::aggregate::AggregateType;
use crate::engine::aggregates::aggregate::BoundSign;
use crate::engine::aggregates::weighted_set::WLSet;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;

/// A witness pool: `true_count` currently-true set literals and the remaining not-false literals
/// that could still become true, up to `bound` many of them recorded as the watched witnesses.
#[derive(Debug, Clone)]
struct Witnesses {
    true_count: i64,
    not_false: Vec<Literal>,
}

fn collect(set: &WLSet, trail: &Trail) -> Witnesses {
    let mut true_count = 0;
    let mut not_false = Vec::new();
    for &(lit, _) in set.entries() {
        match trail.value(lit) {
            Value::True => {
                true_count += 1;
                not_false.push(lit);
            }
            Value::Undef => not_false.push(lit),
            Value::False => {}
        }
    }
    Witnesses { true_count, not_false }
}

/// Forced literals for a cardinality aggregate via the partially-watched strategy (spec §4.3).
/// Panics if `agg.ty` is not [`AggregateType::Card`] — the coordinator only selects this strategy
/// for cardinality aggregates (spec §4.3 "cardinality only").
pub fn forced_literals(agg: &Aggregate, set: &WLSet, trail: &Trail) -> Vec<Literal> {
    assert_eq!(agg.ty, AggregateType::Card, "partially-watched is cardinality-only");

    let witnesses = collect(set, trail);
    let cc = Weight::new(witnesses.true_count);
    let cp = Weight::new(witnesses.not_false.len() as i64);

    let mut forced = Vec::new();
    if trail.value(agg.head) == Value::Undef {
        if let Some(v) = agg.head_forced_value(cc, cp) {
            forced.push(if v { agg.head } else { !agg.head });
        }
    }

    let head_value = trail.value(agg.head);
    if head_value == Value::Undef {
        return forced;
    }
    let cc_must_stay_below = (head_value == Value::True) == (agg.sign == BoundSign::Ub);

    // Exactly-one-left rule (spec §4.3): once the not-false witness pool shrinks to exactly
    // `bound - cc` undecided candidates, every one of them is forced.
    for &lit in &witnesses.not_false {
        if trail.value(lit) != Value::Undef {
            continue;
        }
        if cc_must_stay_below {
            if cc + Weight::ONE >= agg.bound {
                forced.push(!lit);
            }
        } else {
            let remaining_without_lit = cp.value() - 1;
            if Weight::new(remaining_without_lit) < agg.bound {
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

    #[test]
    fn matches_fully_watched_on_the_same_scenario() {
        let mut trail = Trail::default();
        trail.grow_to(4);
        trail.enqueue(lit(4), crate::basic_types::Reason::Decision);
        trail.enqueue(lit(1), crate::basic_types::Reason::Decision);

        let set = WLSet::new(
            0,
            vec![(lit(1), Weight::ONE), (lit(2), Weight::ONE)],
            AggregateType::Card,
        )
        .unwrap()
        .0;
        let agg = Aggregate {
            head: lit(4),
            set_id: 0,
            bound: Weight::new(2),
            sign: BoundSign::Ub,
            ty: AggregateType::Card,
            semantics: Semantics::Completion,
            reported_type: AggregateType::Card,
            watched_partially: true,
            detached: false,
        };

        let forced = forced_literals(&agg, &set, &trail);
        assert!(forced.contains(&!lit(2)));
    }
}
