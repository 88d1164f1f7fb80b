use tracing::info;

use crate::registry::{ConnId, Outbox};
use crate::state::Coordinator;

impl Coordinator {
    /// Registers a freshly accepted connection and sends it the current
    /// presence, tally and its (empty) vote, in that order.
    pub fn open(&self, tx: Outbox) -> ConnId {
        let id = ConnId::generate();
        self.with_state(|state| {
            state.registry.register(id, tx);
            state.unicast_presence(id);
            state.unicast_tally(id);
            state.unicast_current_vote(id);
            info!(conn = %id, connections = state.registry.len(), "connection opened");
        });
        id
    }

    /// Tears down a connection and tells everyone else what changed. Safe to
    /// call more than once.
    pub fn close(&self, id: ConnId) {
        self.with_state(|state| {
            let had_vote = state.ledger.current_vote(id);
            let had_name = state.registry.identity(id).map(str::to_owned);

            state.ledger.clear(id);
            let was_registered = state.registry.contains(id);
            state.registry.unregister(id);

            if had_vote.is_some() {
                state.broadcast_tally();
            }
            if let Some(name) = had_name {
                info!(conn = %id, %name, "user disconnected");
                state.broadcast_presence();
            }
            if was_registered {
                info!(conn = %id, connections = state.registry.len(), "connection closed");
            }
        });
    }
}
