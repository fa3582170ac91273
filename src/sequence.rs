//! Debug-only thread affinity check.
//!
//! The muxer is constructed on one thread and may be handed to another
//! before use, so the checker starts detached and binds to whichever thread
//! calls it first. Every later call must come from that thread. Release
//! builds compile the check away.

#[cfg(debug_assertions)]
use std::cell::OnceCell;
#[cfg(debug_assertions)]
use std::thread::{self, ThreadId};

#[derive(Debug, Default)]
pub(crate) struct SequenceChecker {
    #[cfg(debug_assertions)]
    bound: OnceCell<ThreadId>,
}

impl SequenceChecker {
    /// A checker not yet bound to any thread.
    pub(crate) fn detached() -> Self {
        Self::default()
    }

    /// Assert the caller runs on the bound thread, binding on first use.
    #[track_caller]
    pub(crate) fn check(&self) {
        #[cfg(debug_assertions)]
        {
            let current = thread::current().id();
            let bound = *self.bound.get_or_init(|| current);
            assert_eq!(
                bound, current,
                "muxer called from a different thread than its first call"
            );
        }
    }
}
