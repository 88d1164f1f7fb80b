use livepoll_protocol::Stats;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use crate::ledger::Ledger;
use crate::registry::Registry;

/// Everything the poll knows. Only ever touched under the coordinator's lock.
#[derive(Debug, Default)]
pub struct PollState {
    pub registry: Registry,
    pub ledger: Ledger,
}

/// Shared handle to the poll. Each mutation and the messages it triggers run
/// under one lock, so no recipient sees a half-applied change.
#[derive(Clone, Default)]
pub struct Coordinator {
    inner: Arc<Mutex<PollState>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut PollState) -> R) -> R {
        let mut state = self.inner.lock();
        f(&mut state)
    }

    pub fn stats(&self) -> Stats {
        self.with_state(|state| {
            let counts = state.ledger.snapshot_tally();
            Stats {
                online_count: state.registry.joined_count(),
                total_votes: counts.total(),
                counts,
            }
        })
    }

    pub fn connection_count(&self) -> usize {
        self.with_state(|state| state.registry.len())
    }

    /// Forgets all names and votes while keeping connections open, then
    /// pushes the emptied state to everyone.
    pub fn reset(&self) {
        self.with_state(|state| {
            state.registry.clear_identities();
            state.ledger.clear_all();
            info!(connections = state.registry.len(), "poll state reset");
            state.broadcast_presence();
            state.broadcast_tally();
            let ids: Vec<_> = state.registry.outboxes().map(|(id, _)| id).collect();
            for id in ids {
                state.unicast_current_vote(id);
            }
        });
    }
}
