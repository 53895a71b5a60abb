//! The modal stacker (spec §4 component #8, optional): a tree of coordinators sharing a set of
//! "rigid" atoms with their parent. Only rigid-atom propagation and explanation lifting are
//! modeled here; the child slot is generic so it can hold a full nested coordinator without this
//! module depending on the coordinator's own type.

use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::PropositionalConjunction;

/// What a modal child must support: accept rigid-atom assignments pushed down from the parent,
/// and explain a conflict purely in terms of the rigid atoms it was given (spec §4 "parent-child
/// rigid-atom propagation and explanation lifting").
pub trait ChildSolver {
    /// Atoms this child shares with its parent; assigning one of these in the parent must be
    /// mirrored here before the child is asked to do anything else.
    fn rigid_atoms(&self) -> &[Atom];
    /// Pushes a rigid assignment down. Returns `false` if it immediately conflicts with the
    /// child's own state.
    fn import_rigid(&mut self, literal: Literal) -> bool;
    /// Runs the child to a fixpoint; `Some(_)` is a conflict explained only in rigid atoms.
    fn propagate(&mut self) -> Option<PropositionalConjunction>;
    /// Undoes every rigid import past `mark` (a length previously returned by
    /// [`ChildSolver::checkpoint`]).
    fn backtrack_to(&mut self, mark: usize);
    fn checkpoint(&self) -> usize;
}

struct ModalNode<C> {
    child: C,
    imported: Vec<Literal>,
}

/// A parent coordinator's view of its modal children (spec §4.1 "the theory coordinator"
/// generalizes to a tree when the modal stacker is in use).
pub struct ModalCoordinator<C> {
    nodes: Vec<ModalNode<C>>,
}

impl<C> Default for ModalCoordinator<C> {
    fn default() -> Self {
        ModalCoordinator { nodes: Vec::new() }
    }
}

impl<C: ChildSolver> ModalCoordinator<C> {
    pub fn add_child(&mut self, child: C) -> usize {
        let id = self.nodes.len();
        self.nodes.push(ModalNode { child, imported: Vec::new() });
        id
    }

    /// Mirrors `literal` into every child that shares its atom, then runs each touched child to a
    /// fixpoint. Returns the first conflict found, lifted into a parent-level conjunction (spec
    /// §4 "explanation lifting": the rigid literals are identical between parent and child, so the
    /// lift is the identity on literals, only the ownership changes).
    pub fn notify_rigid(&mut self, literal: Literal) -> Option<PropositionalConjunction> {
        for node in &mut self.nodes {
            if !node.child.rigid_atoms().contains(&literal.atom()) {
                continue;
            }
            if !node.child.import_rigid(literal) {
                return Some(PropositionalConjunction::from(vec![!literal]));
            }
            node.imported.push(literal);
            if let Some(conflict) = node.child.propagate() {
                return Some(conflict);
            }
        }
        None
    }

    pub fn checkpoint(&self) -> Vec<(usize, usize)> {
        self.nodes.iter().map(|n| n.child.checkpoint()).enumerate().collect()
    }

    pub fn backtrack_to(&mut self, marks: &[(usize, usize)]) {
        for &(idx, mark) in marks {
            self.nodes[idx].child.backtrack_to(mark);
        }
    }

    pub fn num_children(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeChild {
        rigid: Vec<Atom>,
        forced_conflict_on: Option<Atom>,
        history: Vec<Literal>,
    }

    impl ChildSolver for FakeChild {
        fn rigid_atoms(&self) -> &[Atom] {
            &self.rigid
        }

        fn import_rigid(&mut self, literal: Literal) -> bool {
            if self.forced_conflict_on == Some(literal.atom()) {
                return false;
            }
            self.history.push(literal);
            true
        }

        fn propagate(&mut self) -> Option<PropositionalConjunction> {
            None
        }

        fn backtrack_to(&mut self, mark: usize) {
            self.history.truncate(mark);
        }

        fn checkpoint(&self) -> usize {
            self.history.len()
        }
    }

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn rigid_literal_is_mirrored_into_matching_children_only() {
        let mut parent = ModalCoordinator::default();
        parent.add_child(FakeChild {
            rigid: vec![Atom::from_dimacs(1)],
            forced_conflict_on: None,
            history: Vec::new(),
        });
        parent.add_child(FakeChild {
            rigid: vec![Atom::from_dimacs(2)],
            forced_conflict_on: None,
            history: Vec::new(),
        });

        let conflict = parent.notify_rigid(lit(1));
        assert!(conflict.is_none());
        assert_eq!(parent.nodes[0].child.history, vec![lit(1)]);
        assert!(parent.nodes[1].child.history.is_empty());
    }

    #[test]
    fn an_import_conflict_is_lifted_as_the_negated_literal() {
        let mut parent = ModalCoordinator::default();
        parent.add_child(FakeChild {
            rigid: vec![Atom::from_dimacs(1)],
            forced_conflict_on: Some(Atom::from_dimacs(1)),
            history: Vec::new(),
        });

        let conflict = parent.notify_rigid(lit(1)).unwrap();
        assert_eq!(conflict.literals(), &[lit(-1)]);
    }
}
