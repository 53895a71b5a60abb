//! Two-watched-literal unit propagation over the clause database (spec §4.2). Treated specially
//! by the coordinator (it always runs first, spec §4.1 "Ordering guarantee") but otherwise
//! follows the same propagate/backtrack shape as the theory engines.

use crate::basic_types::ClauseReference;
use crate::basic_types::ConflictInfo;
use crate::basic_types::Literal;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Reason;
use crate::engine::sat::ClauseAllocator;
use crate::engine::sat::WatchList;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;

enum Placement {
    StillHere,
    Moved,
}

fn priority(trail: &Trail, literal: Literal) -> u8 {
    match trail.value(literal) {
        Value::True => 0,
        Value::Undef => 1,
        Value::False => 2,
    }
}

/// Moves the two literals with the lowest `priority` (true < undef < false) to the front of the
/// clause, so the watched positions are always "as alive as possible" (spec §3: the watched
/// literal scheme keeps watches on literals likely to still be able to satisfy the clause).
fn settle(
    reference: ClauseReference,
    trail: &Trail,
    allocator: &mut ClauseAllocator,
) -> (Literal, Literal, PropagationStatus) {
    let mut literals = allocator.get(reference).literals().to_vec();
    literals.sort_by_key(|&l| priority(trail, l));
    allocator.get_mut(reference).reorder(literals);

    let clause = allocator.get(reference);
    let (w0, w1) = (clause[0], clause[1]);

    let status = match (trail.value(w0), trail.value(w1)) {
        (Value::True, _) => Ok(()),
        (Value::Undef, Value::Undef) => Ok(()),
        (Value::Undef, Value::False) => Ok(()), // caller enqueues w0 after registering watches
        (Value::False, _) => Err(ConflictInfo::Clause(reference)),
        (Value::Undef, Value::True) => {
            unreachable!("sort invariant: true-valued literals are never sorted after undef ones")
        }
    };
    (w0, w1, status)
}

#[derive(Debug, Default)]
pub struct ClausalPropagator {
    watches: WatchList,
    /// Index into the trail of the next literal to process.
    qhead: usize,
}

impl ClausalPropagator {
    pub fn grow_to(&mut self, num_atoms: usize) {
        self.watches.grow_to(num_atoms);
    }

    /// Resets the propagation cursor to replay from `position` (called by the coordinator after
    /// a backtrack, spec §4.2 `backtrack_to`).
    pub fn reset_queue_head(&mut self, position: usize) {
        self.qhead = self.qhead.min(position);
    }

    pub fn queue_head(&self) -> usize {
        self.qhead
    }

    /// Attaches a freshly-allocated clause (length >= 2) to the watch lists, immediately
    /// propagating or reporting a conflict if it is already unit/falsified under the current
    /// assignment (spec §4.2 `add_learned_clause`: "must unit-propagate if the clause is unit
    /// under the current assignment").
    pub fn attach_new_clause(
        &mut self,
        reference: ClauseReference,
        trail: &mut Trail,
        allocator: &mut ClauseAllocator,
    ) -> PropagationStatus {
        let (w0, w1, status) = settle(reference, trail, allocator);
        self.watches.push(w0, reference);
        self.watches.push(w1, reference);

        status?;
        if trail.value(w0) == Value::Undef && trail.value(w1) == Value::False {
            self.unit_propagate(w0, reference, trail)?;
        }
        Ok(())
    }

    fn unit_propagate(
        &self,
        literal: Literal,
        reference: ClauseReference,
        trail: &mut Trail,
    ) -> PropagationStatus {
        if trail.enqueue(literal, Reason::Clause(reference)) {
            Ok(())
        } else {
            Err(ConflictInfo::Clause(reference))
        }
    }

    fn reattach(
        &mut self,
        reference: ClauseReference,
        triggering_lit: Literal,
        trail: &mut Trail,
        allocator: &mut ClauseAllocator,
    ) -> Result<Placement, ConflictInfo> {
        {
            let clause = allocator.get(reference);
            if clause[0] != triggering_lit && clause[1] != triggering_lit {
                return Ok(Placement::StillHere);
            }
        }

        let (w0, w1, status) = settle(reference, trail, allocator);

        if w0 != triggering_lit {
            self.watches.push(w0, reference);
        }
        if w1 != triggering_lit {
            self.watches.push(w1, reference);
        }
        let still_here = w0 == triggering_lit || w1 == triggering_lit;

        status?;
        if trail.value(w0) == Value::Undef && trail.value(w1) == Value::False {
            self.unit_propagate(w0, reference, trail)?;
        }

        Ok(if still_here {
            Placement::StillHere
        } else {
            Placement::Moved
        })
    }

    /// Runs unit propagation to a fixpoint, or until a conflicting clause is found (spec §4.2).
    pub fn propagate(&mut self, trail: &mut Trail, allocator: &mut ClauseAllocator) -> PropagationStatus {
        while self.qhead < trail.len() {
            let p = trail.literal_at(self.qhead);
            self.qhead += 1;
            let falsified = !p;

            let old_list = self.watches.take(falsified);
            let mut kept = Vec::with_capacity(old_list.len());
            let mut conflict = None;

            let mut i = 0;
            while i < old_list.len() {
                let reference = old_list[i];
                i += 1;
                if allocator.is_deleted(reference) {
                    continue;
                }
                match self.reattach(reference, falsified, trail, allocator) {
                    Ok(Placement::StillHere) => kept.push(reference),
                    Ok(Placement::Moved) => {}
                    Err(conflict_info) => {
                        kept.push(reference);
                        kept.extend_from_slice(&old_list[i..]);
                        conflict = Some(conflict_info);
                        break;
                    }
                }
            }
            self.watches.restore(falsified, kept);

            if let Some(conflict) = conflict {
                // Freeze the queue: the coordinator must analyse/backtrack before propagation
                // resumes (spec §4.1 "a call returns either a conflict clause ref or Ok").
                self.qhead = trail.len();
                return Err(conflict);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    fn setup(num_atoms: usize) -> (ClausalPropagator, Trail, ClauseAllocator) {
        let mut prop = ClausalPropagator::default();
        prop.grow_to(num_atoms);
        let mut trail = Trail::default();
        trail.grow_to(num_atoms);
        (prop, trail, ClauseAllocator::default())
    }

    #[test]
    fn unit_propagation_chains() {
        let (mut prop, mut trail, mut alloc) = setup(3);
        // (x1 v x2), (-x1 v x3)
        let c1 = alloc.allocate(vec![lit(1), lit(2)], false);
        let c2 = alloc.allocate(vec![lit(-1), lit(3)], false);
        prop.attach_new_clause(c1, &mut trail, &mut alloc).unwrap();
        prop.attach_new_clause(c2, &mut trail, &mut alloc).unwrap();

        trail.enqueue(lit(-2), Reason::Decision);
        prop.propagate(&mut trail, &mut alloc).unwrap();
        assert!(trail.is_true(lit(1)));
        prop.propagate(&mut trail, &mut alloc).unwrap();
        assert!(trail.is_true(lit(3)));
    }

    #[test]
    fn conflict_is_detected() {
        let (mut prop, mut trail, mut alloc) = setup(2);
        let c1 = alloc.allocate(vec![lit(1), lit(2)], false);
        prop.attach_new_clause(c1, &mut trail, &mut alloc).unwrap();
        trail.enqueue(lit(-1), Reason::Decision);
        prop.propagate(&mut trail, &mut alloc).unwrap();
        assert!(trail.is_true(lit(2)));

        trail.enqueue(lit(-2), Reason::Decision);
        let result = prop.propagate(&mut trail, &mut alloc);
        assert!(result.is_err());
    }
}
