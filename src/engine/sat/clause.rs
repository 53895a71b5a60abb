use std::fmt;

use crate::basic_types::Literal;
use crate::xcdcl_assert_simple;

/// A clause living in the [`super::ClauseAllocator`] arena (spec §3 "Clause"). The first two
/// literals are the watched positions; problem clauses are never deleted, learned clauses may be
/// by the reduction policy (spec §5 "Resource lifecycle").
#[derive(Debug)]
pub struct Clause {
    literals: Vec<Literal>,
    is_learned: bool,
    is_deleted: bool,
    is_protected: bool,
    lbd: u32,
    activity: f32,
}

impl Clause {
    pub fn new(literals: Vec<Literal>, is_learned: bool) -> Clause {
        xcdcl_assert_simple!(literals.len() >= 2);
        let lbd = literals.len() as u32;
        Clause {
            literals,
            is_learned,
            is_deleted: false,
            is_protected: false,
            lbd,
            activity: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn is_learned(&self) -> bool {
        self.is_learned
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn is_protected(&self) -> bool {
        self.is_protected
    }

    pub fn protect(&mut self) {
        self.is_protected = true;
    }

    pub fn lbd(&self) -> u32 {
        self.lbd
    }

    pub fn set_lbd(&mut self, lbd: u32) {
        self.lbd = lbd;
    }

    pub fn activity(&self) -> f32 {
        self.activity
    }

    pub fn bump_activity(&mut self, amount: f32) {
        self.activity += amount;
    }

    pub fn rescale_activity(&mut self, factor: f32) {
        self.activity *= factor;
    }

    /// Marks the clause as logically removed. Does not reclaim storage; the arena index stays
    /// stable so stale [`crate::basic_types::ClauseReference`]s held by theory engines can still
    /// be checked against [`super::ClauseAllocator::is_deleted`].
    pub fn mark_deleted(&mut self) {
        xcdcl_assert_simple!(!self.is_deleted);
        self.is_deleted = true;
    }

    pub fn swap_literals(&mut self, i: usize, j: usize) {
        self.literals.swap(i, j);
    }

    /// Replaces the literal order in place (used to move the two watched positions to the
    /// front). `new_order` must be a permutation of the current literals.
    pub fn reorder(&mut self, new_order: Vec<Literal>) {
        xcdcl_assert_simple!(new_order.len() == self.literals.len());
        self.literals = new_order;
    }
}

impl std::ops::Index<usize> for Clause {
    type Output = Literal;
    fn index(&self, index: usize) -> &Literal {
        &self.literals[index]
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self
            .literals
            .iter()
            .map(|l| l.to_dimacs().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(
            f,
            "({body}) [learned:{}, deleted:{}]",
            self.is_learned, self.is_deleted
        )
    }
}
