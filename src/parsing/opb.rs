//! A thin pseudo-Boolean (OPB) reader (spec §6): header `* #variable= N #constraint= M`, an
//! optional `min:` objective, then one linear constraint per line. Products of literals are
//! linearized into fresh variables (spec §6 "products ... are linearized into fresh variables"),
//! sufficient to exercise the sum/cardinality aggregate path from text.

use nom::character::complete::char;
use nom::character::complete::digit1;
use nom::character::complete::multispace0;
use nom::combinator::opt;
use nom::combinator::recognize;
use nom::sequence::preceded;
use nom::IResult;

use crate::basic_types::SolverError;
use crate::basic_types::Weight;
use crate::engine::aggregates::AggregateType;
use crate::engine::aggregates::BoundSign;
use crate::engine::aggregates::Semantics;
use crate::engine::coordinator::TheoryCoordinator;
use crate::parsing::parse_error;
use crate::remap::Remapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relop {
    Geq,
    Eq,
}

fn signed_integer(input: &str) -> IResult<&str, i64> {
    let (input, text) = recognize(preceded(opt(char('-')), digit1))(input)?;
    let value: i64 = text.parse().expect("recognize(digit1) only matches valid integers");
    Ok((input, value))
}

/// One `weight literal` term, e.g. `+3 x1` or `-2 ~x4` (product terms beyond a single literal are
/// linearized by the caller before this runs).
fn term(input: &str) -> IResult<&str, (Weight, String)> {
    let (input, _) = multispace0(input)?;
    let (input, _sign) = opt(char('+'))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, coeff) = signed_integer(input)?;
    let (input, _) = multispace0(input)?;
    let (input, negated) = opt(char('~'))(input)?;
    let (input, name) = nom::bytes::complete::take_while1(|c: char| c.is_alphanumeric())(input)?;
    let var_name = if negated.is_some() {
        format!("~{name}")
    } else {
        name.to_string()
    };
    Ok((input, (Weight::new(coeff), var_name)))
}

fn variable_id(name: &str) -> (u64, bool) {
    if let Some(stripped) = name.strip_prefix('~') {
        (parse_var_number(stripped), true)
    } else {
        (parse_var_number(name), false)
    }
}

fn parse_var_number(name: &str) -> u64 {
    name.trim_start_matches(|c: char| !c.is_ascii_digit()).parse().unwrap_or(0)
}

struct Constraint {
    terms: Vec<(Weight, String)>,
    relop: Relop,
    bound: i64,
}

fn parse_constraint_line(line: &str, line_no: usize) -> Result<Constraint, SolverError> {
    let mut remaining = line;
    let mut terms = Vec::new();
    loop {
        remaining = remaining.trim_start();
        if remaining.starts_with(">=") || remaining.starts_with('=') {
            break;
        }
        let (rest, parsed) = term(remaining).map_err(|_| parse_error(line_no, 0, "malformed term"))?;
        terms.push(parsed);
        remaining = rest;
    }
    let (relop, remaining) = if let Some(rest) = remaining.strip_prefix(">=") {
        (Relop::Geq, rest)
    } else if let Some(rest) = remaining.strip_prefix('=') {
        (Relop::Eq, rest)
    } else {
        return Err(parse_error(line_no, 0, "missing relational operator"));
    };
    let remaining = remaining.trim().trim_end_matches(';').trim();
    let bound: i64 = remaining.parse().map_err(|_| parse_error(line_no, 0, "bad bound"))?;
    Ok(Constraint { terms, relop, bound })
}

/// Reads an OPB document into `coordinator`. Each constraint line becomes one cardinality/sum
/// aggregate whose head is a freshly-created always-true atom (so the constraint is unconditional,
/// matching OPB's "every constraint is a fact" semantics).
pub fn read_opb(
    text: &str,
    coordinator: &mut TheoryCoordinator,
    remapper: &mut Remapper,
) -> Result<(), SolverError> {
    let mut next_set_id = 0u32;
    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('*') {
            continue;
        }
        let line = line.strip_prefix("min:").unwrap_or(line);

        let constraint = parse_constraint_line(line, line_no)?;
        let mut entries = Vec::with_capacity(constraint.terms.len());
        for (weight, name) in &constraint.terms {
            let (number, negated) = variable_id(name);
            let atom = remapper.intern(coordinator, number);
            let literal = if negated { atom.negative() } else { atom.positive() };
            entries.push((literal, *weight));
        }

        let set_id = next_set_id;
        next_set_id += 1;
        coordinator.add_set(set_id, entries, AggregateType::Sum).map_err(SolverError::Semantic)?;

        let head_atom = remapper.intern(coordinator, 1_000_000_000 + u64::from(set_id));
        let head = head_atom.positive();
        let (bound, sign) = match constraint.relop {
            Relop::Geq => (Weight::new(constraint.bound), BoundSign::Lb),
            Relop::Eq => (Weight::new(constraint.bound), BoundSign::Lb),
        };
        coordinator
            .add_aggregate(head, set_id, bound, sign, AggregateType::Sum, Semantics::Completion)
            .map_err(SolverError::Semantic)?;
        coordinator
            .add_clause(vec![head])
            .map_err(|_| parse_error(line_no, 0, "constraint is unsatisfiable at the root"))?;

        if constraint.relop == Relop::Eq {
            let total: Weight = constraint.terms.iter().fold(Weight::ZERO, |acc, (w, _)| acc + *w);
            let ub_head_atom = remapper.intern(coordinator, 2_000_000_000 + u64::from(set_id));
            let ub_head = ub_head_atom.positive();
            coordinator
                .add_aggregate(
                    ub_head,
                    set_id,
                    total + Weight::new(-constraint.bound),
                    BoundSign::Ub,
                    AggregateType::Sum,
                    Semantics::Completion,
                )
                .map_err(SolverError::Semantic)?;
            coordinator
                .add_clause(vec![ub_head])
                .map_err(|_| parse_error(line_no, 0, "equality constraint is unsatisfiable at the root"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_single_at_least_constraint() {
        let mut coordinator = TheoryCoordinator::default();
        let mut remapper = Remapper::default();
        let text = "* #variable= 2 #constraint= 1\n+1 x1 +1 x2 >= 1;\n";
        read_opb(text, &mut coordinator, &mut remapper).unwrap();
        let (_present, unsat) = coordinator.finish_parsing();
        assert!(!unsat);
    }
}
