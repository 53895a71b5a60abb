//! Explicit runtime context passed to the coordinator, replacing the global mutable state
//! (signal handlers, option singletons) the source idiom relies on (spec §9 redesign flag).

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::info;

/// Cancellation and resource-limit plumbing shared between a [`crate::engine::coordinator::TheoryCoordinator`]
/// and, optionally, a signal handler installed by a binary. Library callers that never call
/// [`install_signal_handler`] get an inert `Runtime` with no global side effects (spec §5: "There
/// are no parallel workers ... ordering is determined purely by trail order").
#[derive(Clone, Debug, Default)]
pub struct Runtime {
    abort: Arc<AtomicBool>,
}

impl Runtime {
    pub fn new() -> Self {
        Runtime::default()
    }

    /// Checked between decisions and at each restart boundary (spec §4.1 "Suspension points").
    pub fn should_abort(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }
}

/// Installs a `SIGINT`/`SIGTERM` handler that sets `runtime`'s abort flag. Only the CLI binary
/// calls this; library use never installs a process-wide signal handler implicitly.
pub fn install_signal_handler(runtime: &Runtime) -> Result<(), signal_hook::Error> {
    let flag = runtime.abort_flag();
    // SAFETY: `signal_hook::flag::register` only ever stores `true` into the flag from within
    // the signal handler; no other async-signal-unsafe work happens there.
    signal_hook::flag::register(signal_hook::consts::SIGINT, flag.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, flag)?;
    info!("installed SIGINT/SIGTERM abort handler");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_is_observed_through_clones() {
        let runtime = Runtime::new();
        let clone = runtime.clone();
        assert!(!runtime.should_abort());
        clone.request_abort();
        assert!(runtime.should_abort());
    }
}
