//! The clausal SAT engine: two-watched-literal propagation, VSIDS activity, Luby restarts and
//! 1-UIP conflict analysis over an arena of [`Clause`]s (spec §4.2 "Clausal engine").

mod activity;
mod clausal_propagator;
mod clause;
mod clause_allocator;
mod conflict_analysis;
mod restarts;
mod watches;

pub use activity::ActivityHeap;
pub use clausal_propagator::ClausalPropagator;
pub use clause::Clause;
pub use clause_allocator::ClauseAllocator;
pub use conflict_analysis::analyze;
pub use conflict_analysis::invalidation_clause;
pub use conflict_analysis::is_well_formed_explanation;
pub use restarts::LubyRestarts;
pub use watches::WatchList;
