//! The aggregate engine (spec §4.3): pseudo-Boolean sum/product/cardinality/min/max aggregates
//! over weighted literal sets, propagated fully- or partially-watched.

mod aggregate;
mod explanation;
mod fully_watched;
mod partially_watched;
mod recursive;
mod weighted_set;

pub use aggregate::Aggregate;
pub use aggregate::AggregateType;
pub use aggregate::BoundSign;
pub use aggregate::Semantics;
pub use recursive::CanJustify;
pub use weighted_set::WLSet;

use crate::basic_types::Atom;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Literal;
use crate::basic_types::PropagationStatus;
use crate::basic_types::PropositionalConjunction;
use crate::basic_types::Reason;
use crate::basic_types::SemanticError;
use crate::basic_types::TheoryTag;
use crate::basic_types::Weight;
use crate::engine::trail::Trail;

pub type AggregateRef = usize;

/// Rewrites negative sum/card weights by flipping the literal, accumulating the bound shift (spec
/// §3 "Sum aggregates with some negative weights are rewritten ... by shifting").
fn shift_negative_weights(entries: Vec<(Literal, Weight)>) -> (Vec<(Literal, Weight)>, Weight) {
    let mut shifted = Vec::with_capacity(entries.len());
    let mut negative_total = Weight::ZERO;
    for (lit, w) in entries {
        if w.value() < 0 {
            negative_total = negative_total + w;
            shifted.push((!lit, w.saturating_neg()));
        } else {
            shifted.push((lit, w));
        }
    }
    (shifted, Weight::new(-negative_total.value()))
}

/// Owns every [`WLSet`] and [`Aggregate`], and the atom→aggregate watch index used to decide
/// which aggregates to re-check after an atom is assigned (spec §4.3 "attaches watches on every
/// set literal and on the head").
#[derive(Debug, Default)]
pub struct AggregateEngine {
    sets: Vec<WLSet>,
    aggregates: Vec<Aggregate>,
    watchers: Vec<Vec<AggregateRef>>,
}

impl AggregateEngine {
    pub fn grow_to(&mut self, num_atoms: usize) {
        if self.watchers.len() < num_atoms {
            self.watchers.resize_with(num_atoms, Vec::new);
        }
    }

    /// Registers a weighted literal set, applying set reduction and (for sum/card) the
    /// negative-weight shift. Returns the bound adjustment the caller must add to any aggregate
    /// bound declared over this set.
    pub fn add_set(
        &mut self,
        id: u32,
        raw: Vec<(Literal, Weight)>,
        ty: AggregateType,
    ) -> Result<Weight, SemanticError> {
        let (entries, negative_shift) = if matches!(ty, AggregateType::Sum | AggregateType::Card) {
            shift_negative_weights(raw)
        } else {
            (raw, Weight::ZERO)
        };
        let (set, merge_shift) = WLSet::new(id, entries, ty)?;
        let idx = id as usize;
        if self.sets.len() <= idx {
            self.sets.resize_with(idx + 1, || WLSet::new(u32::MAX, Vec::new(), AggregateType::Sum).unwrap().0);
        }
        self.sets[idx] = set;
        Ok(negative_shift + merge_shift)
    }

    fn next_set_id(&self) -> u32 {
        self.sets.len() as u32
    }

    /// Registers an aggregate, normalizing MIN into MAX over a private negated set (spec §4.3).
    pub fn add_aggregate(
        &mut self,
        head: Literal,
        set_id: u32,
        mut bound: Weight,
        sign: BoundSign,
        ty: AggregateType,
        semantics: Semantics,
    ) -> Result<AggregateRef, SemanticError> {
        if head.is_negative() {
            return Err(SemanticError::NegativeHead(head.atom()));
        }

        let (effective_set_id, effective_ty) = if ty == AggregateType::Min {
            let base = self
                .sets
                .get(set_id as usize)
                .ok_or(SemanticError::UndefinedSet(set_id))?;
            let new_id = self.next_set_id();
            let negated = base.negated(new_id);
            self.sets.push(negated);
            bound = bound.saturating_neg();
            (new_id, AggregateType::Max)
        } else {
            if set_id as usize >= self.sets.len() {
                return Err(SemanticError::UndefinedSet(set_id));
            }
            (set_id, ty)
        };
        let sign = if ty == AggregateType::Min {
            match sign {
                BoundSign::Ub => BoundSign::Lb,
                BoundSign::Lb => BoundSign::Ub,
            }
        } else {
            sign
        };

        let aggregate = Aggregate {
            head,
            set_id: effective_set_id,
            bound,
            sign,
            ty: effective_ty,
            semantics,
            reported_type: ty,
            watched_partially: false,
            detached: false,
        };
        let aggregate_ref = self.aggregates.len();
        let set_literals: Vec<Literal> = self.sets[effective_set_id as usize]
            .entries()
            .iter()
            .map(|&(l, _)| l)
            .collect();
        for lit in set_literals {
            self.watch(lit.atom(), aggregate_ref);
        }
        self.watch(head.atom(), aggregate_ref);
        self.aggregates.push(aggregate);
        Ok(aggregate_ref)
    }

    /// Opts an already-registered cardinality aggregate into the partially-watched strategy
    /// (spec §4.3, selected via `--watchedagg`).
    pub fn set_watched_partially(&mut self, aggregate_ref: AggregateRef) {
        self.aggregates[aggregate_ref].watched_partially = true;
    }

    fn watch(&mut self, atom: Atom, aggregate_ref: AggregateRef) {
        self.grow_to(atom.index() + 1);
        self.watchers[atom.index()].push(aggregate_ref);
    }

    pub fn aggregate(&self, aggregate_ref: AggregateRef) -> &Aggregate {
        &self.aggregates[aggregate_ref]
    }

    pub fn set_of(&self, aggregate_ref: AggregateRef) -> &WLSet {
        &self.sets[self.aggregates[aggregate_ref].set_id as usize]
    }

    /// Re-checks every aggregate watching `atom`, enqueuing newly forced literals on `trail`
    /// (spec §4.3 "On each set-literal assignment ... check each attached aggregate").
    pub fn notify(&self, atom: Atom, trail: &mut Trail) -> PropagationStatus {
        let Some(watchers) = self.watchers.get(atom.index()) else {
            return Ok(());
        };
        for &aggregate_ref in watchers {
            let agg = &self.aggregates[aggregate_ref];
            if agg.detached {
                continue;
            }
            let set = &self.sets[agg.set_id as usize];
            let forced = if agg.watched_partially {
                partially_watched::forced_literals(agg, set, trail)
            } else {
                fully_watched::forced_literals(agg, set, trail)
            };
            for literal in forced {
                let tag = TheoryTag::new(crate::basic_types::EngineId::Aggregate, aggregate_ref as u64);
                if !trail.enqueue(literal, Reason::Theory(tag)) {
                    let explanation = explanation::explain(agg, set, trail, literal);
                    return Err(crate::basic_types::ConflictInfo::Explanation(explanation));
                }
            }
        }
        Ok(())
    }

    /// Builds the explanation for a literal this engine propagated, identified by `tag.code` as
    /// the owning aggregate (spec §4.1 "the coordinator lazily asks its engine for a clause E").
    pub fn explain(&self, tag: TheoryTag, literal: Literal, trail: &Trail) -> PropositionalConjunction {
        let aggregate_ref = tag.code as AggregateRef;
        let agg = &self.aggregates[aggregate_ref];
        let set = &self.sets[agg.set_id as usize];
        explanation::explain(agg, set, trail, literal)
    }

    pub fn can_justify_head(
        &self,
        aggregate_ref: AggregateRef,
        trail: &Trail,
        is_justified: impl Fn(Literal) -> bool,
    ) -> CanJustify {
        let agg = &self.aggregates[aggregate_ref];
        let set = &self.sets[agg.set_id as usize];
        recursive::can_justify_head(agg, set, trail, is_justified)
    }

    /// Initialization pass (spec §4.3 "Initialization"): detaches any aggregate whose head is
    /// already forced by `(CC, CP)` against the empty assignment and is not itself a definition.
    pub fn initialize(&mut self, trail: &Trail) -> Result<(), ConstraintOperationError> {
        for agg in &mut self.aggregates {
            if agg.semantics == Semantics::Definition {
                continue;
            }
            let set_idx = agg.set_id as usize;
            let (cc, cp) = Aggregate::compute_cc_cp(agg.ty, &self.sets[set_idx], trail);
            if agg.head_forced_value(cc, cp).is_some() {
                agg.detached = true;
            }
        }
        Ok(())
    }

    pub fn num_aggregates(&self) -> usize {
        self.aggregates.len()
    }

    pub fn find_by_head(&self, head: Literal) -> Option<AggregateRef> {
        self.aggregates.iter().position(|agg| agg.head == head)
    }

    pub fn current_cc(&self, aggregate_ref: AggregateRef, trail: &Trail) -> Weight {
        let agg = &self.aggregates[aggregate_ref];
        Aggregate::compute_cc_cp(agg.ty, &self.sets[agg.set_id as usize], trail).0
    }

    /// Tightens an aggregate's bound in place (spec §4.6 "tighten the bound to CC - 1 and
    /// re-propagate"), re-attaching it (in case it had been detached at initialization under the
    /// old bound).
    pub fn tighten_bound(&mut self, aggregate_ref: AggregateRef, new_bound: Weight) {
        let agg = &mut self.aggregates[aggregate_ref];
        agg.bound = new_bound;
        agg.detached = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Reason;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn notify_forces_head_false_when_certain_exceeds_bound() {
        let mut engine = AggregateEngine::default();
        let mut trail = Trail::default();
        trail.grow_to(4);

        engine
            .add_set(
                0,
                vec![(lit(1), Weight::new(3)), (lit(2), Weight::new(4))],
                AggregateType::Sum,
            )
            .unwrap();
        engine
            .add_aggregate(lit(4), 0, Weight::new(5), BoundSign::Ub, AggregateType::Sum, Semantics::Completion)
            .unwrap();

        trail.enqueue(lit(1), Reason::Decision);
        trail.enqueue(lit(2), Reason::Decision);
        engine.notify(lit(2).atom(), &mut trail).unwrap();

        assert!(trail.is_false(lit(4)));
    }

    #[test]
    fn negative_weights_are_shifted() {
        let mut engine = AggregateEngine::default();
        let shift = engine
            .add_set(0, vec![(lit(1), Weight::new(-2)), (lit(2), Weight::new(3))], AggregateType::Sum)
            .unwrap();
        assert_eq!(shift, Weight::new(2));
    }
}
