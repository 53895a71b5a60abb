use std::fmt;

/// A stable index into the [`crate::engine::sat::ClauseAllocator`] arena (spec §9 redesign flag:
/// "replace shared-ownership smart pointers over clauses ... with an arena ... keyed by a stable
/// `ClauseRef` index"). Engines store this, never a pointer or a borrow.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ClauseReference {
    index: u32,
}

impl ClauseReference {
    pub(crate) fn from_index(index: usize) -> ClauseReference {
        ClauseReference {
            index: index as u32,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for ClauseReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clause#{}", self.index)
    }
}
