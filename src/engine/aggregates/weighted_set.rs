//! Weighted literal sets (spec §3 "Weighted literal set (WLSet)").

use crate::basic_types::Literal;
use crate::basic_types::Weight;
use crate::engine::aggregates::aggregate::AggregateType;

/// An identifier plus a vector of `(literal, weight)` pairs, sorted by weight (spec §3). Shared
/// by every [`crate::engine::aggregates::Aggregate`] that references it, except MIN aggregates,
/// which get a private negated copy (spec §4.3 "Min ... is transformed into max").
#[derive(Debug, Clone)]
pub struct WLSet {
    id: u32,
    entries: Vec<(Literal, Weight)>,
}

impl WLSet {
    /// Builds a set, applying the per-type reduction rules of spec §4.3 "Set reduction": merge
    /// duplicate atoms (summing for sum, taking the extremum for max/min, rejecting for product),
    /// then drop literals whose weight is the neutral element for `ty`. Returns, alongside the
    /// set, the bound adjustment the caller must add to any aggregate bound declared over it —
    /// nonzero only when a sum/card set mixed both polarities of one atom (spec §3 "merged per
    /// type: sum adds weights, with sign handling").
    ///
    /// Opposite polarities of the same atom, `a` at weight `s` and `!a` at weight `w`, always
    /// contribute exactly one of `s` or `w` to CC depending on `a`'s value: `w + (s - w)*[a]`.
    /// That collapses to a single entry `(a, s - w)` plus an unconditional `w` folded into the
    /// bound the same way [`crate::engine::aggregates::shift_negative_weights`] folds a negative
    /// weight into the bound.
    pub fn new(
        id: u32,
        raw: Vec<(Literal, Weight)>,
        ty: AggregateType,
    ) -> Result<(WLSet, Weight), crate::basic_types::SemanticError> {
        let mut merged: Vec<(Literal, Weight)> = Vec::with_capacity(raw.len());
        let mut bound_shift = Weight::ZERO;
        for (lit, w) in raw {
            if let Some(slot) = merged.iter_mut().find(|(l, _)| l.atom() == lit.atom()) {
                let same_polarity = slot.0 == lit;
                match ty {
                    AggregateType::Sum | AggregateType::Card => {
                        if same_polarity {
                            slot.1 = slot.1 + w;
                        } else {
                            slot.1 = slot.1 + w.saturating_neg();
                            bound_shift = bound_shift + w.saturating_neg();
                        }
                    }
                    AggregateType::Max => {
                        if same_polarity && w > slot.1 {
                            slot.1 = w;
                        }
                    }
                    AggregateType::Prod => {
                        return Err(crate::basic_types::SemanticError::NonPositiveProductWeight {
                            set: id,
                            literal: lit,
                        });
                    }
                    AggregateType::Min => unreachable!("MIN is normalized to MAX before this call"),
                }
            } else {
                merged.push((lit, w));
            }
        }

        let neutral = match ty {
            AggregateType::Sum | AggregateType::Card => Weight::ZERO,
            AggregateType::Prod => Weight::ONE,
            AggregateType::Max => Weight::NEG_INF,
            AggregateType::Min => unreachable!(),
        };
        merged.retain(|(_, w)| *w != neutral);
        merged.sort_by_key(|(_, w)| *w);

        if ty == AggregateType::Prod {
            for (_, w) in &merged {
                if w.value() <= 0 {
                    return Err(crate::basic_types::SemanticError::NonPositiveProductWeight {
                        set: id,
                        literal: merged[0].0,
                    });
                }
            }
        }

        Ok((WLSet { id, entries: merged }, bound_shift))
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn entries(&self) -> &[(Literal, Weight)] {
        &self.entries
    }

    /// Builds the private negated copy used by MIN aggregates (spec §4.3).
    pub fn negated(&self, new_id: u32) -> WLSet {
        WLSet {
            id: new_id,
            entries: self
                .entries
                .iter()
                .map(|&(l, w)| (l, w.saturating_neg()))
                .collect(),
        }
    }

    pub fn sum_of_weights(&self) -> Weight {
        self.entries
            .iter()
            .fold(Weight::ZERO, |acc, &(_, w)| acc + w)
    }

    pub fn product_of_weights(&self) -> Weight {
        self.entries
            .iter()
            .fold(Weight::ONE, |acc, &(_, w)| acc.saturating_mul(w))
    }

    pub fn max_weight(&self) -> Weight {
        self.entries.last().map(|&(_, w)| w).unwrap_or(Weight::NEG_INF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn sum_set_drops_zero_weights_and_sorts() {
        let (set, shift) = WLSet::new(
            0,
            vec![(lit(1), Weight::new(3)), (lit(2), Weight::ZERO), (lit(3), Weight::new(1))],
            AggregateType::Sum,
        )
        .unwrap();
        assert_eq!(set.entries().len(), 2);
        assert_eq!(set.entries()[0].1, Weight::new(1));
        assert_eq!(shift, Weight::ZERO);
    }

    #[test]
    fn product_rejects_nonpositive_weight() {
        let err = WLSet::new(0, vec![(lit(1), Weight::ZERO)], AggregateType::Prod).unwrap_err();
        assert!(matches!(
            err,
            crate::basic_types::SemanticError::NonPositiveProductWeight { .. }
        ));
    }

    #[test]
    fn opposite_polarities_of_one_atom_collapse_with_a_bound_shift() {
        // lit(1) at weight 5, !lit(1) at weight 2: CC = 2 + (5-2)*[lit(1)], so the set reduces to
        // a single entry (lit(1), 3) plus a shift of -2 to add to any bound declared over it.
        let (set, shift) = WLSet::new(0, vec![(lit(1), Weight::new(5)), (!lit(1), Weight::new(2))], AggregateType::Sum).unwrap();
        assert_eq!(set.entries(), &[(lit(1), Weight::new(3))]);
        assert_eq!(shift, Weight::new(-2));
    }

    #[test]
    fn opposite_polarities_order_does_not_matter() {
        let (set, shift) = WLSet::new(0, vec![(!lit(1), Weight::new(2)), (lit(1), Weight::new(5))], AggregateType::Sum).unwrap();
        assert_eq!(set.entries(), &[(!lit(1), Weight::new(-3))]);
        assert_eq!(shift, Weight::new(-5));
    }
}
