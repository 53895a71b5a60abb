//! The LParse/smodels internal format (spec §6): a rules section (terminated by a bare `0`), an
//! atom-name section (terminated by `0`), `B+`/`B-` compute-statement sections (each terminated by
//! `0`) and a trailing model-count integer. Only the rule types that map onto this solver's
//! definitions/aggregate engines are supported: basic (1), constraint (2), choice (3) and weight
//! (5); types 4 and 6 (disjunctive heads, minimize) are rejected with a parse error rather than
//! silently misinterpreted.

use crate::basic_types::SolverError;
use crate::basic_types::Weight;
use crate::engine::aggregates::AggregateType;
use crate::engine::aggregates::BoundSign;
use crate::engine::aggregates::Semantics;
use crate::engine::coordinator::TheoryCoordinator;
use crate::engine::definitions::Connective;
use crate::parsing::parse_error;
use crate::remap::Remapper;

fn parse_ints(line: &str, line_no: usize) -> Result<Vec<i64>, SolverError> {
    line.split_whitespace()
        .map(|tok| tok.parse::<i64>().map_err(|_| parse_error(line_no, 0, format!("expected an integer, got {tok:?}"))))
        .collect()
}

fn read_rule_line(
    line: &str,
    line_no: usize,
    coordinator: &mut TheoryCoordinator,
    remapper: &mut Remapper,
    next_set_id: &mut u32,
) -> Result<(), SolverError> {
    let tokens = parse_ints(line, line_no)?;
    let rule_type = *tokens.first().ok_or_else(|| parse_error(line_no, 0, "empty rule line"))?;

    match rule_type {
        1 => {
            let [_, head, n, neg, rest @ ..] = tokens.as_slice() else {
                return Err(parse_error(line_no, 0, "malformed basic rule"));
            };
            let lits = read_body(coordinator, remapper, rest, *n as usize, *neg as usize, line_no)?;
            let head_atom = remapper.intern(coordinator, head.unsigned_abs() as u64);
            coordinator.add_rule(Connective::Conj, head_atom, lits);
        }
        2 => {
            let [_, head, n, neg, bound, rest @ ..] = tokens.as_slice() else {
                return Err(parse_error(line_no, 0, "malformed constraint rule"));
            };
            let entries =
                read_weighted_body(coordinator, remapper, rest, *n as usize, *neg as usize, None, line_no)?;
            let set_id = *next_set_id;
            *next_set_id += 1;
            coordinator.add_set(set_id, entries, AggregateType::Card).map_err(SolverError::Semantic)?;
            let head_atom = remapper.intern(coordinator, head.unsigned_abs() as u64);
            let aggregate_ref = coordinator
                .add_aggregate(
                    head_atom.positive(),
                    set_id,
                    Weight::new(*bound),
                    BoundSign::Lb,
                    AggregateType::Card,
                    Semantics::Definition,
                )
                .map_err(SolverError::Semantic)?;
            coordinator.add_aggregate_rule(head_atom, aggregate_ref);
        }
        3 => {
            let [_, n_heads, rest @ ..] = tokens.as_slice() else {
                return Err(parse_error(line_no, 0, "malformed choice rule"));
            };
            let n_heads = *n_heads as usize;
            if rest.len() < n_heads + 2 {
                return Err(parse_error(line_no, 0, "choice rule truncated"));
            }
            let heads = &rest[..n_heads];
            let n = rest[n_heads] as usize;
            let neg = rest[n_heads + 1] as usize;
            let body_tokens = &rest[n_heads + 2..];
            let lits = read_body(coordinator, remapper, body_tokens, n, neg, line_no)?;
            // Choice rules let each head be freely true or false whenever the body holds, so
            // unlike a basic rule the only constraint is `head -> body`, never the converse.
            for &head_num in heads {
                let head_atom = remapper.intern(coordinator, head_num.unsigned_abs() as u64);
                for &body_lit in &lits {
                    coordinator
                        .add_clause(vec![head_atom.negative(), body_lit])
                        .map_err(|_| parse_error(line_no, 0, "choice rule is unsatisfiable at the root"))?;
                }
            }
        }
        5 => {
            let [_, head, bound, n, neg, rest @ ..] = tokens.as_slice() else {
                return Err(parse_error(line_no, 0, "malformed weight rule"));
            };
            let n = *n as usize;
            let neg = *neg as usize;
            if rest.len() != 2 * n {
                return Err(parse_error(line_no, 0, "weight rule literal/weight count mismatch"));
            }
            let (lits, weights) = rest.split_at(n);
            let entries =
                read_weighted_body(coordinator, remapper, lits, n, neg, Some(weights), line_no)?;
            let set_id = *next_set_id;
            *next_set_id += 1;
            coordinator.add_set(set_id, entries, AggregateType::Sum).map_err(SolverError::Semantic)?;
            let head_atom = remapper.intern(coordinator, head.unsigned_abs() as u64);
            let aggregate_ref = coordinator
                .add_aggregate(
                    head_atom.positive(),
                    set_id,
                    Weight::new(*bound),
                    BoundSign::Lb,
                    AggregateType::Sum,
                    Semantics::Definition,
                )
                .map_err(SolverError::Semantic)?;
            coordinator.add_aggregate_rule(head_atom, aggregate_ref);
        }
        4 | 6 => {
            return Err(parse_error(line_no, 0, "disjunctive and minimize rule lines are not supported"));
        }
        other => return Err(parse_error(line_no, 0, format!("unknown rule type {other}"))),
    }
    Ok(())
}

fn read_body(
    coordinator: &mut TheoryCoordinator,
    remapper: &mut Remapper,
    tokens: &[i64],
    n: usize,
    neg: usize,
    line_no: usize,
) -> Result<Vec<crate::basic_types::Literal>, SolverError> {
    if tokens.len() != n || neg > n {
        return Err(parse_error(line_no, 0, "rule body literal count mismatch"));
    }
    let mut lits = Vec::with_capacity(n);
    for (i, &atom_num) in tokens.iter().enumerate() {
        let atom = remapper.intern(coordinator, atom_num.unsigned_abs() as u64);
        lits.push(if i < neg { atom.negative() } else { atom.positive() });
    }
    Ok(lits)
}

fn read_weighted_body(
    coordinator: &mut TheoryCoordinator,
    remapper: &mut Remapper,
    lits_tokens: &[i64],
    n: usize,
    neg: usize,
    weights: Option<&[i64]>,
    line_no: usize,
) -> Result<Vec<(crate::basic_types::Literal, Weight)>, SolverError> {
    if lits_tokens.len() != n || neg > n {
        return Err(parse_error(line_no, 0, "rule body literal count mismatch"));
    }
    let mut entries = Vec::with_capacity(n);
    for (i, &atom_num) in lits_tokens.iter().enumerate() {
        let atom = remapper.intern(coordinator, atom_num.unsigned_abs() as u64);
        let literal = if i < neg { atom.negative() } else { atom.positive() };
        let weight = weights.map(|w| Weight::new(w[i])).unwrap_or(Weight::ONE);
        entries.push((literal, weight));
    }
    Ok(entries)
}

/// Reads a full smodels-style document: rules, atom names, `B+`/`B-` and the trailing model count.
pub fn read_lparse(
    text: &str,
    coordinator: &mut TheoryCoordinator,
    remapper: &mut Remapper,
) -> Result<(), SolverError> {
    let mut lines = text.lines().enumerate();
    let mut next_set_id = 0u32;

    loop {
        let Some((idx, raw)) = lines.next() else {
            return Err(parse_error(0, 0, "unterminated rules section"));
        };
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line == "0" {
            break;
        }
        read_rule_line(line, line_no, coordinator, remapper, &mut next_set_id)?;
    }

    loop {
        let Some((idx, raw)) = lines.next() else { break };
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line == "0" {
            break;
        }
        let mut words = line.split_whitespace();
        let Some(num_tok) = words.next() else { continue };
        let atom_num: u64 = num_tok.parse().map_err(|_| parse_error(line_no, 0, "bad atom number"))?;
        let _ = remapper.intern(coordinator, atom_num);
    }

    read_compute_section(&mut lines, coordinator, remapper, "B+", true)?;
    read_compute_section(&mut lines, coordinator, remapper, "B-", false)?;

    // A trailing model-count line (and smodels' optional extra sections) carries no information
    // this solver needs; anything left is ignored.
    Ok(())
}

fn read_compute_section(
    lines: &mut std::iter::Enumerate<std::str::Lines<'_>>,
    coordinator: &mut TheoryCoordinator,
    remapper: &mut Remapper,
    expected_header: &str,
    force_true: bool,
) -> Result<(), SolverError> {
    let Some((idx, raw)) = lines.next() else { return Ok(()) };
    let line_no = idx + 1;
    let header = raw.trim();
    if header != expected_header {
        return Err(parse_error(line_no, 0, format!("expected {expected_header:?}, got {header:?}")));
    }
    loop {
        let Some((idx, raw)) = lines.next() else {
            return Err(parse_error(line_no, 0, format!("unterminated {expected_header} section")));
        };
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line == "0" {
            return Ok(());
        }
        let atom_num: u64 = line.parse().map_err(|_| parse_error(line_no, 0, "bad atom number"))?;
        let atom = remapper.intern(coordinator, atom_num);
        let literal = if force_true { atom.positive() } else { atom.negative() };
        coordinator
            .add_clause(vec![literal])
            .map_err(|_| parse_error(line_no, 0, format!("{expected_header} fact is unsatisfiable at the root")))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_basic_fact_and_rule() {
        let mut coordinator = TheoryCoordinator::default();
        let mut remapper = Remapper::default();
        // "1 1 0 0" is a fact (head 1, empty body); "1 2 1 0 1" is "2 :- 1."
        let text = "1 1 0 0\n1 2 1 0 1\n0\n1 a\n2 b\n0\nB+\n0\nB-\n0\n1\n";
        read_lparse(text, &mut coordinator, &mut remapper).unwrap();
        let (_present, unsat) = coordinator.finish_parsing();
        assert!(!unsat);
    }

    #[test]
    fn reads_a_constraint_rule_as_a_cardinality_aggregate() {
        let mut coordinator = TheoryCoordinator::default();
        let mut remapper = Remapper::default();
        // "2 3 2 0 1 1 2" : 3 :- 1 <= #count{1, 2}.
        let text = "2 3 2 0 1 1 2\n0\n0\nB+\n0\nB-\n0\n1\n";
        read_lparse(text, &mut coordinator, &mut remapper).unwrap();
        let (_present, unsat) = coordinator.finish_parsing();
        assert!(!unsat);
    }

    #[test]
    fn rejects_disjunctive_rule_lines() {
        let mut coordinator = TheoryCoordinator::default();
        let mut remapper = Remapper::default();
        let text = "4 1 1 0 0\n0\n0\nB+\n0\nB-\n0\n1\n";
        assert!(read_lparse(text, &mut coordinator, &mut remapper).is_err());
    }
}
