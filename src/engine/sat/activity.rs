//! VSIDS-like activity bookkeeping for atom selection and learned-clause activity for deletion
//! (spec §4.2 "VSIDS-like activity").

use crate::basic_types::Atom;

const RESCALE_THRESHOLD: f64 = 1e100;

#[derive(Debug)]
pub struct ActivityHeap {
    activity: Vec<f64>,
    increment: f64,
    decay: f64,
}

impl ActivityHeap {
    pub fn new(decay: f64) -> Self {
        ActivityHeap {
            activity: Vec::new(),
            increment: 1.0,
            decay,
        }
    }

    pub fn grow_to(&mut self, num_atoms: usize) {
        if self.activity.len() < num_atoms {
            self.activity.resize(num_atoms, 0.0);
        }
    }

    pub fn activity_of(&self, atom: Atom) -> f64 {
        self.activity[atom.index()]
    }

    /// Bumps an atom's activity (spec §4.2 "Heuristic inputs from engines: ... the aggregate
    /// engine may request `varBumpActivity` on set literals").
    pub fn bump(&mut self, atom: Atom) {
        self.activity[atom.index()] += self.increment;
        if self.activity[atom.index()] > RESCALE_THRESHOLD {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        for value in &mut self.activity {
            *value *= 1e-100;
        }
        self.increment *= 1e-100;
    }

    pub fn decay_increment(&mut self) {
        self.increment /= self.decay;
        if self.increment > RESCALE_THRESHOLD {
            self.rescale();
        }
    }

    /// Picks the undecided atom with highest activity, if any.
    pub fn pick(&self, is_undecided: impl Fn(Atom) -> bool) -> Option<Atom> {
        self.activity
            .iter()
            .enumerate()
            .filter(|(i, _)| is_undecided(Atom::from_index(*i)))
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| Atom::from_index(i))
    }
}

impl Default for ActivityHeap {
    fn default() -> Self {
        ActivityHeap::new(0.95)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_and_pick_highest() {
        let mut heap = ActivityHeap::default();
        heap.grow_to(3);
        heap.bump(Atom::from_index(1));
        heap.bump(Atom::from_index(1));
        heap.bump(Atom::from_index(2));
        assert_eq!(heap.pick(|_| true), Some(Atom::from_index(1)));
    }
}
