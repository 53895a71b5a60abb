//! Result-line and model rendering (spec §6 "Output"): `SAT`/`UNSAT`/`UNKNOWN`, model lines, the
//! `o <value>` / `OPTIMUM FOUND` optimization trace, and the driver's exit code.

use std::io;
use std::io::Write;

use crate::basic_types::Literal;
use crate::basic_types::Weight;
use crate::remap::Remapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Sat = 10,
    Unsat = 20,
    Unknown = 0,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Writes `v <lit> <lit> ... 0` the way DIMACS-family model-output consumers expect, remapping
/// each internal literal back to its user-facing id when `remapper` is `Some`.
pub fn write_model(writer: &mut impl Write, model: &[Literal], remapper: Option<&Remapper>) -> io::Result<()> {
    write!(writer, "v")?;
    for &literal in model {
        let number = match remapper {
            Some(r) => {
                let user_id = r.user_id_of(literal.atom()).unwrap_or_else(|| literal.atom().to_dimacs() as u64);
                if literal.is_negative() {
                    -(user_id as i64)
                } else {
                    user_id as i64
                }
            }
            None => literal.to_dimacs() as i64,
        };
        write!(writer, " {number}")?;
    }
    writeln!(writer, " 0")
}

pub fn write_result_line(writer: &mut impl Write, exit_code: ExitCode) -> io::Result<()> {
    let token = match exit_code {
        ExitCode::Sat => "SAT",
        ExitCode::Unsat => "UNSAT",
        ExitCode::Unknown => "UNKNOWN",
    };
    writeln!(writer, "{token}")
}

/// One line per improving optimization step (spec §4.6 "print current optimum"), followed by
/// `OPTIMUM FOUND` once the driver proves no further improvement exists.
pub fn write_optimum_step(writer: &mut impl Write, value: Weight) -> io::Result<()> {
    writeln!(writer, "o {value}")
}

pub fn write_optimum_found(writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "OPTIMUM FOUND")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Literal {
        Literal::from_dimacs(n)
    }

    #[test]
    fn model_line_is_dimacs_shaped() {
        let mut buffer = Vec::new();
        write_model(&mut buffer, &[lit(1), lit(-2)], None).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "v 1 -2 0\n");
    }

    #[test]
    fn model_line_uses_remapped_user_ids() {
        let mut coordinator = crate::engine::coordinator::TheoryCoordinator::default();
        let mut remapper = Remapper::default();
        let a = remapper.intern(&mut coordinator, 42);
        let mut buffer = Vec::new();
        write_model(&mut buffer, &[a.positive()], Some(&remapper)).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "v 42 0\n");
    }

    #[test]
    fn result_line_matches_exit_code() {
        let mut buffer = Vec::new();
        write_result_line(&mut buffer, ExitCode::Unsat).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "UNSAT\n");
        assert_eq!(ExitCode::Unsat.code(), 20);
    }
}
