//! The `Aggregate` tuple and its derived (CC, CP) state (spec §3 "Aggregate").

use crate::basic_types::Literal;
use crate::basic_types::Weight;
use crate::engine::aggregates::weighted_set::WLSet;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AggregateType {
    Sum,
    Prod,
    Card,
    Min,
    Max,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundSign {
    Ub,
    Lb,
}

/// Whether the aggregate's head is equivalent to the body (`Completion`) or is a rule head
/// participating in the definition engine's dependency graph (`Definition`, spec §4.3 "Recursive
/// aggregates").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Semantics {
    Completion,
    Definition,
}

/// `(head, set, bound, bound-sign, type, semantics)` plus the watching/propagation-strategy
/// choice (spec §3, §4.3). `set_id` may point at a private negated [`WLSet`] for a MIN aggregate
/// (constructed once at registration, spec §4.3 "transformed into max").
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub head: Literal,
    pub set_id: u32,
    pub bound: Weight,
    pub sign: BoundSign,
    pub ty: AggregateType,
    pub semantics: Semantics,
    /// The type as originally requested, before any MIN-to-MAX normalization, for display.
    pub reported_type: AggregateType,
    pub watched_partially: bool,
    pub detached: bool,
}

impl Aggregate {
    pub fn esv(ty: AggregateType) -> Weight {
        match ty {
            AggregateType::Sum | AggregateType::Card => Weight::ZERO,
            AggregateType::Prod => Weight::ONE,
            AggregateType::Max => Weight::NEG_INF,
            AggregateType::Min => Weight::POS_INF,
        }
    }

    pub fn best_possible(ty: AggregateType, set: &WLSet) -> Weight {
        match ty {
            AggregateType::Sum | AggregateType::Card => set.sum_of_weights(),
            AggregateType::Prod => set.product_of_weights(),
            AggregateType::Max => set.max_weight(),
            AggregateType::Min => unreachable!("MIN is normalized to MAX before use"),
        }
    }

    /// Recomputes `(CC, CP)` by scanning `set` against `trail` (spec §4.3 derived state). This
    /// crate recomputes on demand rather than maintaining an incremental per-frame snapshot stack
    /// — the same trade-off the linear-sum propagator in the teacher makes (it sums bounds afresh
    /// every call instead of keeping a running total); see DESIGN.md.
    pub fn compute_cc_cp(ty: AggregateType, set: &WLSet, trail: &Trail) -> (Weight, Weight) {
        match ty {
            AggregateType::Sum | AggregateType::Card => {
                let mut cc = Weight::ZERO;
                let mut cp = Weight::ZERO;
                for &(lit, w) in set.entries() {
                    match trail.value(lit) {
                        Value::True => {
                            cc = cc + w;
                            cp = cp + w;
                        }
                        Value::Undef => cp = cp + w,
                        Value::False => {}
                    }
                }
                (cc, cp)
            }
            AggregateType::Prod => {
                let mut cc = Weight::ONE;
                let mut cp = Weight::ONE;
                for &(lit, w) in set.entries() {
                    match trail.value(lit) {
                        Value::True => {
                            cc = cc.saturating_mul(w);
                            cp = cp.saturating_mul(w);
                        }
                        Value::Undef => cp = cp.saturating_mul(w),
                        Value::False => {}
                    }
                }
                (cc, cp)
            }
            AggregateType::Max => {
                let mut cc = Weight::NEG_INF;
                let mut cp = Weight::NEG_INF;
                for &(lit, w) in set.entries() {
                    match trail.value(lit) {
                        Value::True => {
                            if w > cc {
                                cc = w;
                            }
                            if w > cp {
                                cp = w;
                            }
                        }
                        Value::Undef => {
                            if w > cp {
                                cp = w;
                            }
                        }
                        Value::False => {}
                    }
                }
                (cc, cp)
            }
            AggregateType::Min => unreachable!("MIN is normalized to MAX before use"),
        }
    }

    /// Whether `(cc, cp)` already forces the head, per spec §4.3 "derive head from (CC, CP)".
    pub fn head_forced_value(&self, cc: Weight, cp: Weight) -> Option<bool> {
        match self.sign {
            BoundSign::Ub => {
                if cc >= self.bound {
                    Some(false)
                } else if cp < self.bound {
                    Some(true)
                } else {
                    None
                }
            }
            BoundSign::Lb => {
                if cp < self.bound {
                    Some(false)
                } else if cc >= self.bound {
                    Some(true)
                } else {
                    None
                }
            }
        }
    }
}
