//! Arena holding every clause, keyed by a stable [`ClauseReference`] index (spec §9 redesign
//! flag). `make_clause` (spec §4.2) allocates without registering watches, for materializing
//! on-demand explanations.

use crate::basic_types::ClauseReference;
use crate::basic_types::Literal;
use crate::engine::sat::Clause;

#[derive(Debug, Default)]
pub struct ClauseAllocator {
    clauses: Vec<Clause>,
    /// Log of deletions since the start of search; theory engines that cache a
    /// [`ClauseReference`] for a lazily-built explanation poll this at each backtrack/end-of-queue
    /// rather than registering a callback (spec §5 "subscribe to a `clause_deleted` callback or
    /// copy on save" — polling a log is the callback-free variant of the same contract).
    deleted_log: Vec<ClauseReference>,
}

impl ClauseAllocator {
    pub fn allocate(&mut self, literals: Vec<Literal>, is_learned: bool) -> ClauseReference {
        let reference = ClauseReference::from_index(self.clauses.len());
        self.clauses.push(Clause::new(literals, is_learned));
        reference
    }

    /// Allocates a clause without registering it on watch lists (spec §4.2 `make_clause`).
    pub fn make_clause(&mut self, literals: Vec<Literal>) -> ClauseReference {
        self.allocate(literals, true)
    }

    pub fn get(&self, reference: ClauseReference) -> &Clause {
        &self.clauses[reference.index()]
    }

    pub fn get_mut(&mut self, reference: ClauseReference) -> &mut Clause {
        &mut self.clauses[reference.index()]
    }

    pub fn is_deleted(&self, reference: ClauseReference) -> bool {
        self.clauses[reference.index()].is_deleted()
    }

    pub fn delete(&mut self, reference: ClauseReference) {
        self.clauses[reference.index()].mark_deleted();
        self.deleted_log.push(reference);
    }

    /// References deleted since `from` (exclusive), for engines polling for stale explanation
    /// references.
    pub fn deleted_since(&self, from: usize) -> &[ClauseReference] {
        &self.deleted_log[from.min(self.deleted_log.len())..]
    }

    pub fn deletion_generation(&self) -> usize {
        self.deleted_log.len()
    }

    pub fn iter_learned(&self) -> impl Iterator<Item = (ClauseReference, &Clause)> {
        self.clauses
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_learned() && !c.is_deleted())
            .map(|(i, c)| (ClauseReference::from_index(i), c))
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn delete_is_logged() {
        let mut alloc = ClauseAllocator::default();
        let r1 = alloc.allocate(vec![lit(1), lit(2)], false);
        let gen0 = alloc.deletion_generation();
        alloc.delete(r1);
        assert!(alloc.is_deleted(r1));
        assert_eq!(alloc.deleted_since(gen0), &[r1]);
    }
}
