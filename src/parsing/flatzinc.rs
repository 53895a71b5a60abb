//! A `FlatZincModel` builder (spec §4.7): constructs CP bridge reifications directly from calls
//! made by an embedder, rather than tokenizing a `.fzn` file — a full FlatZinc front end is out of
//! scope, but "constraint predicates mapped to the CP bridge" is exactly what this gives a caller
//! who already has a FlatZinc AST (or test) in hand.

use crate::basic_types::Literal;
use crate::engine::coordinator::TheoryCoordinator;
use crate::engine::cp_bridge::CpConstraint;
use crate::engine::cp_bridge::CpEngine;
use crate::engine::cp_bridge::CpVarId;

/// Thin builder over a coordinator's CP bridge. Every method here is a direct translation of one
/// FlatZinc predicate (`int_lin_le`, `int_eq`, `int_ne`, `int_le`) into one `CpConstraint`,
/// reified on a Boolean literal the caller already holds (typically one produced by a
/// [`crate::remap::Remapper`] from the surrounding FlatZinc `var bool` the predicate is annotated
/// with, or a literal that is simply always true for an unconditional constraint).
pub struct FlatZincModel<'a> {
    coordinator: &'a mut TheoryCoordinator,
}

impl<'a> FlatZincModel<'a> {
    pub fn new(coordinator: &'a mut TheoryCoordinator) -> Self {
        FlatZincModel { coordinator }
    }

    /// `var int: x :: lb..ub;`
    pub fn declare_int_var(&mut self, lower_bound: i32, upper_bound: i32) -> CpVarId {
        let bridge = self.coordinator.cp_bridge_mut().expect("enable_cp_bridge before building a FlatZinc model");
        bridge.add_int_var(lower_bound, upper_bound)
    }

    /// `int_lin_le([c1, ..], [x1, ..], bound) :: guard`
    pub fn linear_leq(&mut self, terms: Vec<(i32, CpVarId)>, bound: i32, guard: Literal) {
        let bridge = self.coordinator.cp_bridge_mut().expect("enable_cp_bridge before building a FlatZinc model");
        bridge.post_reified(CpConstraint::LinearLeq { terms, bound }, guard);
    }

    /// `int_eq(x, value) :: guard`
    pub fn equal_constant(&mut self, var: CpVarId, value: i32, guard: Literal) {
        let bridge = self.coordinator.cp_bridge_mut().expect("enable_cp_bridge before building a FlatZinc model");
        bridge.post_reified(CpConstraint::Equal { var, value }, guard);
    }

    /// `int_ne(x, value) :: guard`
    pub fn not_equal_constant(&mut self, var: CpVarId, value: i32, guard: Literal) {
        let bridge = self.coordinator.cp_bridge_mut().expect("enable_cp_bridge before building a FlatZinc model");
        bridge.post_reified(CpConstraint::NotEqual { var, value }, guard);
    }

    /// `int_le(x, y) :: guard`
    pub fn less_eq_var(&mut self, left: CpVarId, right: CpVarId, guard: Literal) {
        let bridge = self.coordinator.cp_bridge_mut().expect("enable_cp_bridge before building a FlatZinc model");
        bridge.post_reified(CpConstraint::LessEqVar { left, right }, guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn builds_a_reified_linear_constraint_over_two_fresh_variables() {
        let mut coordinator = TheoryCoordinator::default();
        coordinator.enable_cp_bridge();
        let _a = coordinator.add_var();
        let mut model = FlatZincModel::new(&mut coordinator);
        let x = model.declare_int_var(0, 5);
        let y = model.declare_int_var(0, 5);
        model.linear_leq(vec![(1, x), (1, y)], 4, lit(1));
    }

    #[test]
    fn declaring_a_var_without_enabling_the_bridge_panics() {
        let mut coordinator = TheoryCoordinator::default();
        let mut model = FlatZincModel::new(&mut coordinator);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            model.declare_int_var(0, 1);
        }));
        assert!(result.is_err());
    }
}
