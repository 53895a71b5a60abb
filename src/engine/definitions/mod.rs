//! The inductive-definition engine (spec §4.4): stable/well-founded semantics over conjunctive,
//! disjunctive and aggregate-bodied rules, propagated via completion clauses plus on-demand
//! unfounded-set detection and loop-formula learning.

mod dependency_graph;
mod justification;
mod loop_formula;
mod rule;
mod unfounded_set;
mod well_founded;

pub use dependency_graph::SccInfo;
pub use loop_formula::TSEITIN_THRESHOLD;
pub use rule::Connective;
pub use rule::DefOcc;
pub use rule::Rule;
pub use rule::RuleBody;

use std::collections::HashSet;

use crate::basic_types::Atom;
use crate::basic_types::ClauseReference;
use crate::basic_types::Literal;
use crate::engine::aggregates::AggregateEngine;
use crate::engine::aggregates::AggregateRef;
use crate::engine::sat::ClauseAllocator;
use crate::engine::trail::Trail;
use crate::engine::trail::Value;

/// Owns every [`Rule`] plus the two dependency graphs and their SCC classification (spec §4.4).
/// The clausal completion of each rule is materialized as ordinary clauses by the coordinator
/// (via [`DefinitionEngine::completion_clauses`]); this engine itself only ever reasons about
/// loops, which is the part that can't be captured by a fixed clause set up front.
#[derive(Debug, Default)]
pub struct DefinitionEngine {
    rules: Vec<Rule>,
    head_index: Vec<Option<usize>>,
    scc: SccInfo,
}

impl DefinitionEngine {
    pub fn grow_to(&mut self, num_atoms: usize) {
        if self.head_index.len() < num_atoms {
            self.head_index.resize(num_atoms, None);
        }
    }

    /// Registers a rule; each defined atom must be the head of exactly one rule (spec §3 "Rule").
    pub fn add_rule(&mut self, rule: Rule) -> usize {
        self.grow_to(rule.head.index() + 1);
        let idx = self.rules.len();
        self.head_index[rule.head.index()] = Some(idx);
        self.rules.push(rule);
        idx
    }

    pub fn rule_of(&self, atom: Atom) -> Option<usize> {
        self.head_index.get(atom.index()).copied().flatten()
    }

    pub fn rule(&self, idx: usize) -> &Rule {
        &self.rules[idx]
    }

    /// Builds the completion clauses for every non-aggregate rule (spec §4.4 "completion"):
    /// AGGR-bodied rules are excluded since the aggregate engine's symmetric CC/CP propagation
    /// already implements their completion directly.
    pub fn completion_clauses(&self, aggregate_sets: impl Fn(AggregateRef) -> Vec<Literal>) -> Vec<Vec<Literal>> {
        let mut clauses = Vec::new();
        for rule in &self.rules {
            let head = rule.head.positive();
            match &rule.body {
                RuleBody::Normal(Connective::Conj, body) => {
                    for &b in body {
                        clauses.push(vec![!head, b]);
                    }
                    let mut backward = vec![head];
                    backward.extend(body.iter().map(|&b| !b));
                    clauses.push(backward);
                }
                RuleBody::Normal(Connective::Disj, body) => {
                    for &b in body {
                        clauses.push(vec![!b, head]);
                    }
                    let mut forward = vec![!head];
                    forward.extend(body.iter().copied());
                    clauses.push(forward);
                }
                RuleBody::Aggregate(_) => {
                    let _ = &aggregate_sets;
                }
            }
        }
        clauses
    }

    fn build_dependency_graphs(&self, aggregate_sets: impl Fn(AggregateRef) -> Vec<Literal>) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
        let n = self.head_index.len();
        let mut full = vec![Vec::new(); n];
        let mut pos = vec![Vec::new(); n];
        for rule in &self.rules {
            let h = rule.head.index();
            let body_atoms: Vec<(Atom, bool)> = match &rule.body {
                RuleBody::Normal(_, body) => body.iter().map(|&l| (l.atom(), l.is_positive())).collect(),
                RuleBody::Aggregate(aref) => aggregate_sets(*aref).into_iter().map(|l| (l.atom(), true)).collect(),
            };
            for (atom, positive) in body_atoms {
                full[h].push(atom.index());
                if positive {
                    pos[h].push(atom.index());
                }
            }
        }
        (full, pos)
    }

    /// Runs Tarjan twice and classifies every defined atom (spec §4.4 steps 3-4). Call once all
    /// rules have been added.
    pub fn initialize(&mut self, aggregate_sets: impl Fn(AggregateRef) -> Vec<Literal>) {
        let n = self.head_index.len();
        let defined: Vec<bool> = self.head_index.iter().map(|h| h.is_some()).collect();
        let (full_edges, pos_edges) = self.build_dependency_graphs(aggregate_sets);
        self.scc = dependency_graph::classify(n, &defined, &full_edges, &pos_edges);
    }

    pub fn classification(&self, atom: Atom) -> DefOcc {
        self.scc.classification.get(atom.index()).copied().unwrap_or(DefOcc::NonDefOcc)
    }

    /// Every currently-true defined atom classified as being in some loop: candidates for the
    /// unfounded-set check (spec §4.4 "cycle sources").
    fn cycle_source_candidates(&self, trail: &Trail) -> HashSet<Atom> {
        self.scc
            .classification
            .iter()
            .enumerate()
            .filter(|(_, occ)| !matches!(occ, DefOcc::NonDefOcc))
            .map(|(idx, _)| Atom::from_index(idx))
            .filter(|&atom| trail.value_of_atom(atom) != Value::False)
            .collect()
    }

    /// The incremental per-propagation check (spec §4.4): computes the unfounded set over every
    /// currently-candidate loop atom and, if any true atom turns out unfounded, materializes and
    /// returns the loop-formula clauses that rule it out. An empty result means no loop violation
    /// was found at this point.
    pub fn find_loop_violation(
        &self,
        trail: &Trail,
        aggregate_engine: &AggregateEngine,
        aggregate_sets: impl Fn(AggregateRef) -> Vec<Literal>,
        new_atom: impl FnMut() -> Atom,
        allocator: &mut ClauseAllocator,
    ) -> Vec<ClauseReference> {
        let candidates = self.cycle_source_candidates(trail);
        if candidates.is_empty() {
            return Vec::new();
        }
        let u = unfounded_set::compute(
            candidates,
            |a| self.rule_of(a),
            &self.rules,
            trail,
            aggregate_engine,
        );
        let violating = u.iter().any(|&a| trail.value_of_atom(a) == Value::True);
        if !violating {
            return Vec::new();
        }
        let external = loop_formula::external_literals(
            &u,
            |a| self.rule_of(a).into_iter().collect(),
            &self.rules,
            aggregate_sets,
        );
        loop_formula::build_clauses(&u, &external, TSEITIN_THRESHOLD, new_atom, allocator)
    }

    /// Checks a total assignment for well-foundedness (spec §4.4 "well-founded check"). Returns
    /// the set of true-but-unfounded atoms; empty means the model is accepted.
    pub fn well_founded_violation(&self, trail: &Trail, aggregate_engine: &AggregateEngine) -> HashSet<Atom> {
        well_founded::check(&self.scc, |a| self.rule_of(a), &self.rules, trail, aggregate_engine)
    }

    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Reason;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn completion_clauses_for_a_conjunctive_rule() {
        let mut engine = DefinitionEngine::default();
        engine.add_rule(Rule {
            head: Atom::from_dimacs(3),
            body: RuleBody::Normal(Connective::Conj, vec![lit(1), lit(2)]),
        });
        let clauses = engine.completion_clauses(|_| vec![]);
        assert_eq!(clauses.len(), 3);
        assert!(clauses.contains(&vec![!lit(3), lit(1)]));
        assert!(clauses.contains(&vec![!lit(3), lit(2)]));
        assert!(clauses.contains(&vec![lit(3), !lit(1), !lit(2)]));
    }

    #[test]
    fn detects_and_rules_out_an_unfounded_self_loop() {
        let mut engine = DefinitionEngine::default();
        engine.add_rule(Rule {
            head: Atom::from_dimacs(1),
            body: RuleBody::Normal(Connective::Disj, vec![lit(2)]),
        });
        engine.add_rule(Rule {
            head: Atom::from_dimacs(2),
            body: RuleBody::Normal(Connective::Disj, vec![lit(1)]),
        });
        engine.initialize(|_| vec![]);

        let mut trail = Trail::default();
        trail.grow_to(2);
        trail.enqueue(lit(1), Reason::Decision);
        trail.enqueue(lit(2), Reason::Decision);

        let aggregates = AggregateEngine::default();
        let mut allocator = ClauseAllocator::default();
        let mut next_atom = 3isize;
        let clauses = engine.find_loop_violation(
            &trail,
            &aggregates,
            |_| vec![],
            || {
                let a = Atom::from_dimacs(next_atom);
                next_atom += 1;
                a
            },
            &mut allocator,
        );
        assert!(!clauses.is_empty());
    }
}
