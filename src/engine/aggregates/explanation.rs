//! Explanation construction for aggregate propagations (spec §4.3 "Explanations").
//!
//! Rather than replaying a per-aggregate stack of past propagations up to a recorded index, this
//! crate builds the explanation directly from the live trail: every other assigned literal of the
//! aggregate (the head, if the propagated literal is a body literal, plus every assigned set
//! literal) is included in its currently-false polarity. This is sound but not minimized — the
//! reference design stops adding literals as soon as the partial explanation is already
//! sufficient (spec "Optional minimization stops adding literals once ... sufficient"); the
//! trade-off is recorded in DESIGN.md.

use crate::basic_types::Literal;
use crate::basic_types::PropositionalConjunction;
use crate::engine::aggregates::aggregate::Aggregate;
use crate::engine::aggregates::weighted_set::WLSet;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;

fn false_form(trail: &Trail, literal: Literal) -> Option<Literal> {
    match trail.value(literal) {
        Value::True => Some(!literal),
        Value::False => Some(literal),
        Value::Undef => None,
    }
}

/// Builds `E` such that `E` is currently false and `E ⇒ propagated` (spec §4.1's explanation
/// contract, specialised to an aggregate-owned propagation).
pub fn explain(agg: &Aggregate, set: &WLSet, trail: &Trail, propagated: Literal) -> PropositionalConjunction {
    let mut literals = Vec::new();

    if propagated.atom() != agg.head.atom() {
        if let Some(head_lit) = false_form(trail, agg.head) {
            literals.push(head_lit);
        }
    }

    for &(lit, _) in set.entries() {
        if lit.atom() == propagated.atom() {
            continue;
        }
        if let Some(false_lit) = false_form(trail, lit) {
            literals.push(false_lit);
        }
    }

    PropositionalConjunction::from(literals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Reason;
    use crate::basic_types::Weight;
    use crate::engine::aggregates::aggregate::AggregateType;
    use crate::engine::aggregates::aggregate::BoundSign;
    use crate::engine::aggregates::aggregate::Semantics;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn explanation_excludes_the_propagated_literal() {
        let mut trail = Trail::default();
        trail.grow_to(4);
        trail.enqueue(lit(4), Reason::Decision);
        trail.enqueue(lit(1), Reason::Decision);

        let set = WLSet::new(
            0,
            vec![(lit(1), Weight::new(4)), (lit(2), Weight::new(3))],
            AggregateType::Sum,
        )
        .unwrap()
        .0;
        let agg = Aggregate {
            head: lit(4),
            set_id: 0,
            bound: Weight::new(5),
            sign: BoundSign::Ub,
            ty: AggregateType::Sum,
            semantics: Semantics::Completion,
            reported_type: AggregateType::Sum,
            watched_partially: false,
            detached: false,
        };

        let explanation = explain(&agg, &set, &trail, !lit(2));
        assert!(!explanation.literals().contains(&!lit(2)));
        assert!(explanation.literals().contains(&lit(4)));
        assert!(explanation.literals().contains(&lit(1)));
    }
}
