//! The assignment/trail (spec §3 "Assignment / Trail"): a totally ordered sequence of literals
//! set true since the start of search, partitioned by decision levels, with per-variable value,
//! level and reason.

use log::trace;

use crate::basic_types::Atom;
use crate::basic_types::DecisionLevel;
use crate::basic_types::Literal;
use crate::basic_types::Reason;
use crate::xcdcl_assert_moderate;

/// The three-valued truth value of an atom.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Value {
    True,
    False,
    Undef,
}

#[derive(Clone, Debug)]
struct VariableState {
    value: Value,
    level: DecisionLevel,
    reason: Reason,
    /// Index into `Trail::order`, valid only while `value != Undef`.
    trail_position: usize,
}

impl Default for VariableState {
    fn default() -> Self {
        VariableState {
            value: Value::Undef,
            level: 0,
            reason: Reason::Decision,
            trail_position: 0,
        }
    }
}

/// Owns the single source of truth for which literals are currently assigned. Single-writer
/// (the SAT engine, per spec §5); theory engines only read it through
/// [`crate::engine::coordinator::TheoryCoordinator`].
#[derive(Debug, Default)]
pub struct Trail {
    state: Vec<VariableState>,
    order: Vec<Literal>,
    /// `level_starts[d]` is the index in `order` of the first literal assigned at decision level
    /// `d + 1` (root-level literals, level 0, are `order[..level_starts[0]]` when present).
    level_starts: Vec<usize>,
}

impl Trail {
    pub fn grow_to(&mut self, num_atoms: usize) {
        if self.state.len() < num_atoms {
            self.state.resize(num_atoms, VariableState::default());
        }
    }

    pub fn num_atoms(&self) -> usize {
        self.state.len()
    }

    pub fn decision_level(&self) -> DecisionLevel {
        self.level_starts.len()
    }

    pub fn new_decision_level(&mut self) {
        self.level_starts.push(self.order.len());
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn value_of_atom(&self, atom: Atom) -> Value {
        self.state[atom.index()].value
    }

    pub fn value(&self, literal: Literal) -> Value {
        match self.value_of_atom(literal.atom()) {
            Value::Undef => Value::Undef,
            Value::True if literal.is_positive() => Value::True,
            Value::True => Value::False,
            Value::False if literal.is_positive() => Value::False,
            Value::False => Value::True,
        }
    }

    pub fn is_true(&self, literal: Literal) -> bool {
        self.value(literal) == Value::True
    }

    pub fn is_false(&self, literal: Literal) -> bool {
        self.value(literal) == Value::False
    }

    pub fn is_assigned(&self, literal: Literal) -> bool {
        self.value(literal) != Value::Undef
    }

    pub fn level_of(&self, atom: Atom) -> DecisionLevel {
        self.state[atom.index()].level
    }

    pub fn reason_of(&self, atom: Atom) -> Reason {
        self.state[atom.index()].reason
    }

    pub fn trail_position_of(&self, atom: Atom) -> usize {
        self.state[atom.index()].trail_position
    }

    /// Orders two assigned atoms by trail position: `a` was assigned no later than `b` iff
    /// `a.trail_position <= b.trail_position`. Used by explanation construction (spec §4.1: every
    /// literal of `E` "was assigned no later than `l`").
    pub fn assigned_no_later_than(&self, a: Atom, b: Atom) -> bool {
        self.trail_position_of(a) <= self.trail_position_of(b)
    }

    /// Enqueues `literal` as true. Returns `false` if it contradicts an existing assignment.
    pub fn enqueue(&mut self, literal: Literal, reason: Reason) -> bool {
        match self.value(literal) {
            Value::True => return true,
            Value::False => return false,
            Value::Undef => {}
        }

        let position = self.order.len();
        self.state[literal.atom().index()] = VariableState {
            value: if literal.is_positive() {
                Value::True
            } else {
                Value::False
            },
            level: self.decision_level(),
            reason,
            trail_position: position,
        };
        self.order.push(literal);
        trace!("enqueue {literal:?} at level {} ({reason:?})", self.decision_level());
        true
    }

    /// Literals assigned at or after `from` (inclusive), in trail order — the slice that is
    /// about to be undone by a backtrack.
    pub fn literals_from(&self, from: usize) -> &[Literal] {
        &self.order[from..]
    }

    pub fn literal_at(&self, position: usize) -> Literal {
        self.order[position]
    }

    pub fn last_assigned(&self) -> Option<Literal> {
        self.order.last().copied()
    }

    /// Undoes every assignment made at a decision level `> level`, calling `on_unassign` for each
    /// literal in reverse trail order (spec §4.2 "`backtrack_to(level)` replays assignment
    /// removals in reverse trail order, calling `on_unassign(l)` on every engine").
    pub fn backtrack_to(&mut self, level: DecisionLevel, mut on_unassign: impl FnMut(Literal)) {
        xcdcl_assert_moderate!(level <= self.decision_level());
        if level == self.decision_level() {
            return;
        }

        let cut = self.level_starts[level];
        while self.order.len() > cut {
            let literal = self.order.pop().expect("trail non-empty above cut");
            self.state[literal.atom().index()] = VariableState::default();
            on_unassign(literal);
        }
        self.level_starts.truncate(level);
    }

    /// All currently-true decision literals (one per decision level, at the start of that
    /// level's slice), used to build a model-invalidation clause (spec §4.1).
    pub fn decision_literals(&self) -> Vec<Literal> {
        self.level_starts
            .iter()
            .filter_map(|&start| self.order.get(start).copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn enqueue_and_backtrack() {
        let mut trail = Trail::default();
        trail.grow_to(4);

        assert!(trail.enqueue(lit(1), Reason::Decision));
        trail.new_decision_level();
        assert!(trail.enqueue(lit(2), Reason::Decision));
        assert!(trail.enqueue(lit(-3), Reason::Decision));

        assert_eq!(trail.decision_level(), 1);
        assert!(trail.is_true(lit(2)));
        assert!(trail.is_true(lit(3).atom().negative()));

        let mut unassigned = vec![];
        trail.backtrack_to(0, |l| unassigned.push(l));
        assert_eq!(unassigned, vec![lit(-3), lit(2)]);
        assert_eq!(trail.decision_level(), 0);
        assert!(!trail.is_assigned(lit(2)));
        assert!(trail.is_true(lit(1)));
    }

    #[test]
    fn conflicting_enqueue_reports_false() {
        let mut trail = Trail::default();
        trail.grow_to(2);
        assert!(trail.enqueue(lit(1), Reason::Decision));
        assert!(!trail.enqueue(lit(-1), Reason::Decision));
    }
}
