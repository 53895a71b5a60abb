//! Tarjan SCC, run twice: once over the full dependency graph (positive and negative edges), once
//! over the positive-only subgraph (spec §4.4 "Build full and positive dependency graphs; run
//! Tarjan SCC twice").

use crate::basic_types::Atom;
use crate::engine::definitions::rule::DefOcc;

/// Runs Tarjan's algorithm over `edges` (adjacency by atom index), returning a component id per
/// node. Every node gets a component, including size-1 components with no self-loop.
fn tarjan(num_atoms: usize, edges: &[Vec<usize>]) -> Vec<i32> {
    struct State {
        index: Vec<i32>,
        lowlink: Vec<i32>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        comp: Vec<i32>,
        next_index: i32,
        next_comp: i32,
    }

    fn strongconnect(v: usize, edges: &[Vec<usize>], s: &mut State) {
        s.index[v] = s.next_index;
        s.lowlink[v] = s.next_index;
        s.next_index += 1;
        s.stack.push(v);
        s.on_stack[v] = true;

        for &w in &edges[v] {
            if s.index[w] == -1 {
                strongconnect(w, edges, s);
                s.lowlink[v] = s.lowlink[v].min(s.lowlink[w]);
            } else if s.on_stack[w] {
                s.lowlink[v] = s.lowlink[v].min(s.index[w]);
            }
        }

        if s.lowlink[v] == s.index[v] {
            loop {
                let w = s.stack.pop().expect("component non-empty");
                s.on_stack[w] = false;
                s.comp[w] = s.next_comp;
                if w == v {
                    break;
                }
            }
            s.next_comp += 1;
        }
    }

    let mut state = State {
        index: vec![-1; num_atoms],
        lowlink: vec![0; num_atoms],
        on_stack: vec![false; num_atoms],
        stack: Vec::new(),
        comp: vec![-1; num_atoms],
        next_index: 0,
        next_comp: 0,
    };
    for v in 0..num_atoms {
        if state.index[v] == -1 {
            strongconnect(v, edges, &mut state);
        }
    }
    state.comp
}

fn component_sizes(components: &[i32]) -> Vec<usize> {
    let max = components.iter().copied().max().unwrap_or(-1);
    let mut sizes = vec![0usize; (max + 1).max(0) as usize];
    for &c in components {
        if c >= 0 {
            sizes[c as usize] += 1;
        }
    }
    sizes
}

/// Per-atom classification derived from running Tarjan twice (spec §3 "Scc tags", §4.4 step 3-4).
#[derive(Debug, Default)]
pub struct SccInfo {
    pub full_scc: Vec<i32>,
    pub pos_scc: Vec<i32>,
    pub classification: Vec<DefOcc>,
}

/// `defined` marks which atoms are rule heads; `full_edges`/`pos_edges` are head→body adjacency
/// for the full and positive-only dependency graphs respectively.
pub fn classify(num_atoms: usize, defined: &[bool], full_edges: &[Vec<usize>], pos_edges: &[Vec<usize>]) -> SccInfo {
    let full_scc = tarjan(num_atoms, full_edges);
    let pos_scc = tarjan(num_atoms, pos_edges);
    let full_sizes = component_sizes(&full_scc);
    let pos_sizes = component_sizes(&pos_scc);

    let mut classification = vec![DefOcc::NonDefOcc; num_atoms];
    for atom in 0..num_atoms {
        if !defined[atom] {
            continue;
        }
        let in_pos_loop = pos_sizes[pos_scc[atom] as usize] > 1;
        let in_full_loop = full_sizes[full_scc[atom] as usize] > 1;
        classification[atom] = match (in_pos_loop, in_full_loop) {
            (true, true) if full_sizes[full_scc[atom] as usize] > pos_sizes[pos_scc[atom] as usize] => {
                DefOcc::BothLoop
            }
            (true, _) => DefOcc::PosLoop,
            (false, true) => DefOcc::MixedLoop,
            (false, false) => DefOcc::NonDefOcc,
        };
    }

    SccInfo { full_scc, pos_scc, classification }
}

#[allow(dead_code)]
pub fn atom_in_same_pos_scc(info: &SccInfo, a: Atom, b: Atom) -> bool {
    let (x, y) = (info.pos_scc[a.index()], info.pos_scc[b.index()]);
    x == y && x >= 0
}
