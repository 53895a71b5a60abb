//! The theory coordinator (spec §4.1): owns the SAT engine's state plus the aggregate and
//! definition engines (and, optionally, the CP bridge), and drives the fixed engine polling order
//! described there — SAT unit-propagation first, then aggregate, then definition, then CP.

use log::debug;

use crate::basic_types::Atom;
use crate::basic_types::ClauseReference;
use crate::basic_types::ConflictInfo;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::DecisionLevel;
use crate::basic_types::EngineId;
use crate::basic_types::Literal;
use crate::basic_types::PropagationStatus;
use crate::basic_types::PropositionalConjunction;
use crate::basic_types::Reason;
use crate::basic_types::SemanticError;
use crate::basic_types::Weight;
use crate::engine::aggregates::Aggregate;
use crate::engine::aggregates::AggregateEngine;
use crate::engine::aggregates::AggregateRef;
use crate::engine::aggregates::AggregateType;
use crate::engine::aggregates::BoundSign;
use crate::engine::aggregates::Semantics;
use crate::engine::cp_bridge::BoundsIntEngine;
use crate::engine::cp_bridge::CpEngine;
use crate::engine::cp_bridge::CpPropagationResult;
use crate::engine::cp_bridge::CpSnapshot;
use crate::engine::definitions::Connective;
use crate::engine::definitions::DefinitionEngine;
use crate::engine::definitions::Rule;
use crate::engine::definitions::RuleBody;
use crate::engine::optimization::SearchDriver;
use crate::engine::optimization::SolveOutcome;
use crate::engine::runtime::Runtime;
use crate::engine::sat::analyze;
use crate::engine::sat::invalidation_clause;
use crate::engine::sat::ActivityHeap;
use crate::engine::sat::ClauseAllocator;
use crate::engine::sat::ClausalPropagator;
use crate::engine::sat::LubyRestarts;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;
use crate::options::DefSemantics;

/// Everything the coordinator needs to explain or reconstruct an aggregate set's literals, passed
/// around as a plain closure to keep the definition engine decoupled from the aggregate engine's
/// concrete type.
fn aggregate_set_literals(aggregates: &AggregateEngine, aggregate_ref: AggregateRef) -> Vec<Literal> {
    aggregates.set_of(aggregate_ref).entries().iter().map(|&(l, _)| l).collect()
}

/// Ties the clausal engine together with the aggregate, definition and (optional) CP bridge
/// engines (spec §4.1). `solve_with_assumptions` runs one full CDCL search; callers that want
/// model enumeration or optimization drive it repeatedly (see [`crate::engine::optimization`]).
#[derive(Debug)]
pub struct TheoryCoordinator {
    runtime: Runtime,
    trail: Trail,
    allocator: ClauseAllocator,
    clausal: ClausalPropagator,
    activity: ActivityHeap,
    restarts: LubyRestarts,
    aggregates: AggregateEngine,
    definitions: DefinitionEngine,
    cp: Option<BoundsIntEngine>,
    cp_snapshots: Vec<CpSnapshot>,
    theory_cursor: usize,
    num_atoms: usize,
    root_unsat: bool,
    def_semantics: DefSemantics,
}

impl Default for TheoryCoordinator {
    fn default() -> Self {
        TheoryCoordinator {
            runtime: Runtime::new(),
            trail: Trail::default(),
            allocator: ClauseAllocator::default(),
            clausal: ClausalPropagator::default(),
            activity: ActivityHeap::default(),
            restarts: LubyRestarts::default(),
            aggregates: AggregateEngine::default(),
            definitions: DefinitionEngine::default(),
            cp: None,
            cp_snapshots: Vec::new(),
            theory_cursor: 0,
            num_atoms: 0,
            root_unsat: false,
            def_semantics: DefSemantics::WellFounded,
        }
    }
}

impl TheoryCoordinator {
    pub fn new(runtime: Runtime) -> Self {
        TheoryCoordinator { runtime, ..TheoryCoordinator::default() }
    }

    /// Opts into the bounded finite-domain bridge (spec §4.5); without this call, CP-related
    /// `add_*` requests are simply unavailable.
    pub fn enable_cp_bridge(&mut self) {
        self.cp = Some(BoundsIntEngine::default());
    }

    pub fn cp_bridge_mut(&mut self) -> Option<&mut BoundsIntEngine> {
        self.cp.as_mut()
    }

    /// Selects which of the two semantics (spec §4.4) a fully assigned candidate model must
    /// satisfy before `solve_with_assumptions` accepts it. Defaults to `WellFounded`, matching
    /// [`crate::options::SolverOptions::defsem`]'s default.
    pub fn set_def_semantics(&mut self, semantics: DefSemantics) {
        self.def_semantics = semantics;
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn add_var(&mut self) -> Atom {
        let atom = Atom::from_index(self.num_atoms);
        self.num_atoms += 1;
        self.grow_to(self.num_atoms);
        atom
    }

    fn grow_to(&mut self, num_atoms: usize) {
        self.trail.grow_to(num_atoms);
        self.activity.grow_to(num_atoms);
        self.clausal.grow_to(num_atoms);
        self.aggregates.grow_to(num_atoms);
        self.definitions.grow_to(num_atoms);
    }

    pub fn add_clause(&mut self, literals: Vec<Literal>) -> Result<(), ConstraintOperationError> {
        if self.root_unsat {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        if literals.is_empty() {
            self.root_unsat = true;
            return Err(ConstraintOperationError::InfeasibleState);
        }
        let status = if literals.len() == 1 {
            if self.trail.enqueue(literals[0], Reason::Decision) {
                Ok(())
            } else {
                Err(ConflictInfo::Explanation(PropositionalConjunction::from(literals)))
            }
        } else {
            let reference = self.allocator.allocate(literals, false);
            self.clausal.attach_new_clause(reference, &mut self.trail, &mut self.allocator)
        };
        if status.is_err() {
            self.root_unsat = true;
            return Err(ConstraintOperationError::InfeasibleState);
        }
        Ok(())
    }

    pub fn add_rule(&mut self, connective: Connective, head: Atom, body: Vec<Literal>) -> usize {
        self.definitions.add_rule(Rule { head, body: RuleBody::Normal(connective, body) })
    }

    pub fn add_aggregate_rule(&mut self, head: Atom, aggregate_ref: AggregateRef) -> usize {
        self.definitions.add_rule(Rule { head, body: RuleBody::Aggregate(aggregate_ref) })
    }

    pub fn add_set(
        &mut self,
        id: u32,
        literals: Vec<(Literal, Weight)>,
        ty: AggregateType,
    ) -> Result<Weight, SemanticError> {
        self.aggregates.add_set(id, literals, ty)
    }

    pub fn add_aggregate(
        &mut self,
        head: Literal,
        set_id: u32,
        bound: Weight,
        sign: BoundSign,
        ty: AggregateType,
        semantics: Semantics,
    ) -> Result<AggregateRef, SemanticError> {
        self.aggregates.add_aggregate(head, set_id, bound, sign, ty, semantics)
    }

    pub fn add_forced_choices(&mut self, literals: Vec<Literal>) -> Result<(), ConstraintOperationError> {
        for literal in literals {
            if !self.trail.enqueue(literal, Reason::Decision) {
                self.root_unsat = true;
                return Err(ConstraintOperationError::InfeasibleState);
            }
        }
        Ok(())
    }

    /// spec §4.1 `finish_parsing`: triggers aggregate and definition initialization, then runs
    /// root-level propagation once. Returns `(present, unsat)`.
    pub fn finish_parsing(&mut self) -> (bool, bool) {
        if self.root_unsat {
            return (true, true);
        }
        if self.aggregates.initialize(&self.trail).is_err() {
            self.root_unsat = true;
            return (true, true);
        }
        let completion = {
            let aggregates = &self.aggregates;
            self.definitions.initialize(|aref| aggregate_set_literals(aggregates, aref));
            self.definitions.completion_clauses(|aref| aggregate_set_literals(aggregates, aref))
        };
        for clause in completion {
            if self.add_clause(clause).is_err() {
                return (true, true);
            }
        }
        if self.propagate_to_fixpoint().is_err() {
            self.root_unsat = true;
        }
        (true, self.root_unsat)
    }

    /// spec §4.1 `simplify`: root-level unit propagation plus engine-specific simplification until
    /// fixpoint or unsat. With no separate simplification pass implemented beyond the fixed-point
    /// propagation itself, this simply re-runs it.
    pub fn simplify(&mut self) -> bool {
        if self.root_unsat {
            return false;
        }
        if self.propagate_to_fixpoint().is_err() {
            self.root_unsat = true;
        }
        !self.root_unsat
    }

    fn push_decision_level(&mut self) {
        self.trail.new_decision_level();
        if let Some(cp) = &self.cp {
            self.cp_snapshots.push(cp.snapshot());
        }
    }

    fn backtrack_to(&mut self, level: DecisionLevel) {
        self.trail.backtrack_to(level, |_| {});
        self.clausal.reset_queue_head(self.trail.len());
        self.theory_cursor = self.theory_cursor.min(self.trail.len());
        if let Some(cp) = &mut self.cp {
            while self.cp_snapshots.len() > level {
                if let Some(snapshot) = self.cp_snapshots.pop() {
                    cp.restore(snapshot);
                }
            }
        }
    }

    /// Runs every engine to a joint fixpoint in the order SAT -> aggregate -> definition -> CP
    /// (spec §4.1 "Ordering guarantee"), looping back to the start whenever a later engine's
    /// propagation reopens unit propagation.
    fn propagate_to_fixpoint(&mut self) -> PropagationStatus {
        loop {
            self.clausal.propagate(&mut self.trail, &mut self.allocator)?;

            let mut progressed = false;
            while self.theory_cursor < self.trail.len() {
                let literal = self.trail.literal_at(self.theory_cursor);
                self.theory_cursor += 1;
                self.aggregates.notify(literal.atom(), &mut self.trail)?;
                progressed = true;
            }

            if self.attach_loop_violations()? {
                progressed = true;
            }

            if let Some(cp) = &mut self.cp {
                match cp.propagate() {
                    CpPropagationResult::Conflict => return Err(ConflictInfo::Explanation(cp.explain())),
                    CpPropagationResult::Changed => progressed = true,
                    CpPropagationResult::NoChange => {}
                }
            }

            if !progressed && self.clausal.queue_head() == self.trail.len() {
                return Ok(());
            }
        }
    }

    /// Computes the definition engine's current loop-formula clauses (spec §4.4 "added detail")
    /// over its unfounded-set candidates and attaches every one, growing `num_atoms` for any
    /// Tseitin atoms the loop formula needed. Returns whether any clause was attached; an `Err`
    /// means attaching one already conflicted with the trail.
    fn attach_loop_violations(&mut self) -> Result<bool, ConflictInfo> {
        let mut next_atom_counter = self.num_atoms;
        let clauses = {
            let aggregates = &self.aggregates;
            self.definitions.find_loop_violation(
                &self.trail,
                aggregates,
                |aref| aggregate_set_literals(aggregates, aref),
                || {
                    let atom = Atom::from_index(next_atom_counter);
                    next_atom_counter += 1;
                    atom
                },
                &mut self.allocator,
            )
        };
        if next_atom_counter != self.num_atoms {
            self.num_atoms = next_atom_counter;
            self.grow_to(self.num_atoms);
        }
        let any_attached = !clauses.is_empty();
        for reference in clauses {
            self.clausal.attach_new_clause(reference, &mut self.trail, &mut self.allocator)?;
        }
        Ok(any_attached)
    }

    fn explain(&self, literal: Literal, tag: crate::basic_types::TheoryTag) -> PropositionalConjunction {
        match tag.engine {
            EngineId::Aggregate => self.aggregates.explain(tag, literal, &self.trail),
            other => unreachable!("engine {other:?} never attaches a theory tag to a trail literal in this build"),
        }
    }

    /// Runs one CDCL search, optionally under `assumptions` pushed as decisions at the start
    /// (spec §4.1 `solve`).
    pub fn solve_with_assumptions(&mut self, assumptions: Vec<Literal>) -> SolveOutcome {
        if self.root_unsat {
            return SolveOutcome::Unsat;
        }
        for literal in assumptions {
            self.push_decision_level();
            if !self.trail.enqueue(literal, Reason::Decision) {
                self.backtrack_to(0);
                return SolveOutcome::Unsat;
            }
        }

        loop {
            if self.runtime.should_abort() {
                return SolveOutcome::Unknown;
            }
            match self.propagate_to_fixpoint() {
                Err(conflict) => {
                    if let Some(outcome) = self.handle_conflict(conflict) {
                        return outcome;
                    }
                }
                Ok(()) => {
                    let trail = &self.trail;
                    let undecided = self.activity.pick(|atom| trail.value_of_atom(atom) == Value::Undef);
                    match undecided {
                        None => match self.check_well_founded() {
                            Ok(()) => return SolveOutcome::Sat,
                            Err(conflict) => {
                                if let Some(outcome) = self.handle_conflict(conflict) {
                                    return outcome;
                                }
                            }
                        },
                        Some(atom) => {
                            self.push_decision_level();
                            let decided = !self.trail.enqueue(atom.positive(), Reason::Decision);
                            debug_assert!(!decided, "a fresh decision on an undecided atom cannot conflict");
                        }
                    }
                }
            }
        }
    }

    /// Runs the standard conflict-analysis/backtrack/learn/restart dance (spec §4.1 `solve`'s
    /// conflict branch). Returns `Some(outcome)` when the search must stop right away, `None` when
    /// the caller should loop back into `propagate_to_fixpoint`.
    fn handle_conflict(&mut self, conflict: ConflictInfo) -> Option<SolveOutcome> {
        if self.trail.decision_level() == 0 {
            return Some(SolveOutcome::Unsat);
        }
        let (learned, backtrack_level) = {
            let aggregates = &self.aggregates;
            let trail = &self.trail;
            analyze(conflict, &self.trail, &self.allocator, &mut self.activity, |lit, tag| {
                match tag.engine {
                    EngineId::Aggregate => aggregates.explain(tag, lit, trail),
                    other => unreachable!("engine {other:?} never attaches a theory tag in this build"),
                }
            })
        };
        self.backtrack_to(backtrack_level);
        if self.learn_clause(learned).is_err() {
            return Some(SolveOutcome::Unsat);
        }
        if self.restarts.notify_conflict() {
            self.backtrack_to(0);
        }
        None
    }

    /// Final gate for a fully assigned candidate model (spec §4.4 "well-founded check"), active
    /// only under `DefSemantics::WellFounded` — under `DefSemantics::Stable` the completion
    /// clauses plus the incremental loop-formula check already attached during
    /// `propagate_to_fixpoint` are the whole of stable-model semantics, so the extra pass is
    /// skipped. Builds and attaches loop-formula clauses for any remaining violation exactly the
    /// way `propagate_to_fixpoint` does for one caught mid-search; an `Err` here is therefore a
    /// genuine conflict for `handle_conflict` to analyze and backtrack from.
    fn check_well_founded(&mut self) -> PropagationStatus {
        if self.def_semantics != DefSemantics::WellFounded {
            return Ok(());
        }
        if self.definitions.well_founded_violation(&self.trail, &self.aggregates).is_empty() {
            return Ok(());
        }
        self.attach_loop_violations()?;
        Ok(())
    }

    fn learn_clause(&mut self, literals: Vec<Literal>) -> PropagationStatus {
        if literals.len() == 1 {
            if self.trail.enqueue(literals[0], Reason::Decision) {
                Ok(())
            } else {
                Err(ConflictInfo::Explanation(PropositionalConjunction::from(literals)))
            }
        } else {
            let reference = self.allocator.allocate(literals, true);
            self.clausal.attach_new_clause(reference, &mut self.trail, &mut self.allocator)
        }
    }

    /// Every atom's current literal, true or false (spec §4.1 "Model enumeration"); only
    /// meaningful right after `solve_with_assumptions` returns `Sat`.
    pub fn model_literals(&self) -> Vec<Literal> {
        (0..self.num_atoms)
            .map(Atom::from_index)
            .map(|atom| {
                if self.trail.value_of_atom(atom) == Value::True {
                    atom.positive()
                } else {
                    atom.negative()
                }
            })
            .collect()
    }

    /// Adds the invalidation clause for the current model and backtracks to level 0 (spec §4.1
    /// "Model enumeration"), ready for the next `solve_with_assumptions` call to search for a
    /// different model.
    pub fn invalidate_current_model(&mut self) -> Result<(), ConstraintOperationError> {
        let clause = invalidation_clause(&self.trail.decision_literals());
        self.backtrack_to(0);
        self.add_clause(clause)
    }

    fn find_aggregate_by_head(&self, head: Literal) -> Option<AggregateRef> {
        self.aggregates.find_by_head(head)
    }
}

impl SearchDriver for TheoryCoordinator {
    fn solve(&mut self) -> SolveOutcome {
        self.solve_with_assumptions(Vec::new())
    }

    fn add_clause(&mut self, literals: Vec<Literal>) {
        // The literals being forbidden here are, by construction, currently true on a
        // fully-assigned trail from the model just found; backtrack to the root first (the same
        // way `invalidate_current_model` does) so the new clause is added against an assignment
        // it can actually unit-propagate over, rather than against literals already frozen true.
        self.backtrack_to(0);
        if self.add_clause(literals).is_err() {
            debug!("invalidation/driver clause made the problem trivially unsat at the root");
        }
    }

    fn value(&self, literal: Literal) -> bool {
        self.trail.is_true(literal)
    }

    fn snapshot_model(&self) -> Vec<Literal> {
        self.model_literals()
    }

    fn aggregate_cc(&self, head: Literal) -> Weight {
        match self.find_aggregate_by_head(head) {
            Some(aggregate_ref) => self.aggregates.current_cc(aggregate_ref, &self.trail),
            None => Weight::ZERO,
        }
    }

    fn tighten_aggregate_ub(&mut self, head: Literal, bound: Weight) {
        // Same reasoning as `add_clause` above: backtrack to the root before tightening, so
        // `propagate_to_fixpoint`'s theory cursor actually re-walks the (now shorter) trail and
        // re-notifies the aggregate under its new bound, instead of finding `theory_cursor`
        // already caught up to a trail that never changes.
        self.backtrack_to(0);
        if let Some(aggregate_ref) = self.find_aggregate_by_head(head) {
            self.aggregates.tighten_bound(aggregate_ref, bound);
        }
        if self.propagate_to_fixpoint().is_err() {
            self.root_unsat = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn unit_propagation_through_finish_parsing() {
        let mut coordinator = TheoryCoordinator::default();
        let _a = coordinator.add_var();
        let _b = coordinator.add_var();
        coordinator.add_clause(vec![lit(1), lit(2)]).unwrap();
        coordinator.add_clause(vec![lit(-1)]).unwrap();
        let (present, unsat) = coordinator.finish_parsing();
        assert!(present);
        assert!(!unsat);
        assert!(coordinator.trail.is_true(lit(2)));
    }

    #[test]
    fn a_direct_contradiction_is_unsat_at_the_root() {
        let mut coordinator = TheoryCoordinator::default();
        let _a = coordinator.add_var();
        coordinator.add_clause(vec![lit(1)]).unwrap();
        coordinator.add_clause(vec![lit(-1)]).unwrap();
        let (_present, unsat) = coordinator.finish_parsing();
        assert!(unsat);
    }

    #[test]
    fn solve_finds_a_model_for_a_simple_clause_set() {
        let mut coordinator = TheoryCoordinator::default();
        let _a = coordinator.add_var();
        let _b = coordinator.add_var();
        let _c = coordinator.add_var();
        coordinator.add_clause(vec![lit(1), lit(2), lit(3)]).unwrap();
        coordinator.add_clause(vec![lit(-1), lit(-2)]).unwrap();
        let (_present, unsat) = coordinator.finish_parsing();
        assert!(!unsat);
        assert_eq!(coordinator.solve_with_assumptions(Vec::new()), SolveOutcome::Sat);
        let model = coordinator.model_literals();
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn an_unsatisfiable_triangle_is_detected_during_search() {
        let mut coordinator = TheoryCoordinator::default();
        let _a = coordinator.add_var();
        let _b = coordinator.add_var();
        coordinator.add_clause(vec![lit(1), lit(2)]).unwrap();
        coordinator.add_clause(vec![lit(1), lit(-2)]).unwrap();
        coordinator.add_clause(vec![lit(-1), lit(2)]).unwrap();
        coordinator.add_clause(vec![lit(-1), lit(-2)]).unwrap();
        let (_present, unsat) = coordinator.finish_parsing();
        assert!(!unsat);
        assert_eq!(coordinator.solve_with_assumptions(Vec::new()), SolveOutcome::Unsat);
    }

    #[test]
    fn well_founded_semantics_rejects_an_unsupported_positive_loop() {
        let mut coordinator = TheoryCoordinator::default();
        let a = coordinator.add_var();
        let b = coordinator.add_var();
        coordinator.add_rule(Connective::Disj, a, vec![b.positive()]);
        coordinator.add_rule(Connective::Disj, b, vec![a.positive()]);
        let (_present, unsat) = coordinator.finish_parsing();
        assert!(!unsat);
        assert_eq!(coordinator.solve_with_assumptions(Vec::new()), SolveOutcome::Sat);
        let model = coordinator.model_literals();
        assert!(model.contains(&a.negative()));
        assert!(model.contains(&b.negative()));
    }

    #[test]
    fn stable_semantics_also_rejects_the_same_unsupported_loop() {
        let mut coordinator = TheoryCoordinator::default();
        coordinator.set_def_semantics(DefSemantics::Stable);
        let a = coordinator.add_var();
        let b = coordinator.add_var();
        coordinator.add_rule(Connective::Disj, a, vec![b.positive()]);
        coordinator.add_rule(Connective::Disj, b, vec![a.positive()]);
        let (_present, unsat) = coordinator.finish_parsing();
        assert!(!unsat);
        assert_eq!(coordinator.solve_with_assumptions(Vec::new()), SolveOutcome::Sat);
        let model = coordinator.model_literals();
        assert!(model.contains(&a.negative()));
        assert!(model.contains(&b.negative()));
    }
}
