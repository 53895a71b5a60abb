//! Input-format front ends (spec §6 "Input formats"). Each parser builds a problem directly
//! against [`crate::engine::coordinator::TheoryCoordinator`] through a [`crate::remap::Remapper`];
//! none of them retains its own copy of the problem once parsing finishes.

pub mod ecnf;
pub mod flatzinc;
pub mod lparse;
pub mod opb;

use crate::basic_types::SolverError;

/// Shared by every format: turn a 1-based line/column pair plus a message into a [`SolverError`].
pub(crate) fn parse_error(line: usize, column: usize, message: impl Into<String>) -> SolverError {
    SolverError::Parse {
        file: None,
        line,
        column,
        message: message.into(),
    }
}
