//! Maps arbitrary positive user-facing atom identifiers (as they appear in ECNF/OPB/LParse input,
//! which need not be contiguous or start at 1) to contiguous internal [`Atom`]s and back (spec §3
//! "optional remapper").

use std::collections::HashMap;

use crate::basic_types::Atom;
use crate::engine::coordinator::TheoryCoordinator;

/// `--remap` in the original CLI surface toggles whether this is actually used (disabled, the
/// parser requires input atoms to already be contiguous from 1); the coordinator and engines never
/// know either way, since they only ever see internal [`Atom`]s.
#[derive(Debug, Default)]
pub struct Remapper {
    user_to_internal: HashMap<u64, Atom>,
    internal_to_user: Vec<u64>,
}

impl Remapper {
    /// Returns the internal atom for `user_id`, allocating a fresh one (through
    /// `coordinator.add_var()`, so the two never disagree about which indices are taken) on first
    /// sight.
    pub fn intern(&mut self, coordinator: &mut TheoryCoordinator, user_id: u64) -> Atom {
        if let Some(&atom) = self.user_to_internal.get(&user_id) {
            return atom;
        }
        let atom = coordinator.add_var();
        self.internal_to_user.push(user_id);
        self.user_to_internal.insert(user_id, atom);
        atom
    }

    pub fn user_id_of(&self, atom: Atom) -> Option<u64> {
        self.internal_to_user.get(atom.index()).copied()
    }

    pub fn internal_of(&self, user_id: u64) -> Option<Atom> {
        self.user_to_internal.get(&user_id).copied()
    }

    pub fn num_atoms(&self) -> usize {
        self.internal_to_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_interning_returns_the_same_atom() {
        let mut coordinator = TheoryCoordinator::default();
        let mut remapper = Remapper::default();
        let a = remapper.intern(&mut coordinator, 42);
        let b = remapper.intern(&mut coordinator, 7);
        let a_again = remapper.intern(&mut coordinator, 42);
        assert_eq!(a, a_again);
        assert_ne!(a, b);
        assert_eq!(remapper.user_id_of(a), Some(42));
        assert_eq!(remapper.user_id_of(b), Some(7));
    }

    #[test]
    fn non_contiguous_user_ids_still_get_contiguous_internal_atoms() {
        let mut coordinator = TheoryCoordinator::default();
        let mut remapper = Remapper::default();
        let a = remapper.intern(&mut coordinator, 1000);
        let b = remapper.intern(&mut coordinator, 5);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(remapper.num_atoms(), 2);
    }
}
