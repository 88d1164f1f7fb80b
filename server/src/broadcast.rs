use livepoll_protocol::ServerToClient;
use tracing::debug;

use crate::registry::{ConnId, Outbox};
use crate::state::PollState;

/* ---------------- snapshots & delivery ---------------- */

fn deliver(id: ConnId, tx: &Outbox, msg: ServerToClient) -> bool {
    if tx.send(msg).is_err() {
        debug!(conn = %id, "skipping closed connection");
        return false;
    }
    true
}

impl PollState {
    pub fn presence_message(&self) -> ServerToClient {
        ServerToClient::Presence {
            online: self.registry.list_identities(),
        }
    }

    pub fn counts_message(&self) -> ServerToClient {
        ServerToClient::Counts {
            counts: self.ledger.snapshot_tally(),
        }
    }

    pub fn user_vote_message(&self, id: ConnId) -> ServerToClient {
        ServerToClient::UserVote {
            option_id: self.ledger.current_vote(id),
        }
    }

    pub fn unicast(&self, id: ConnId, msg: ServerToClient) {
        if let Some(tx) = self.registry.outbox(id) {
            deliver(id, tx, msg);
        }
    }

    pub fn unicast_presence(&self, id: ConnId) {
        self.unicast(id, self.presence_message());
    }

    pub fn unicast_tally(&self, id: ConnId) {
        self.unicast(id, self.counts_message());
    }

    pub fn unicast_current_vote(&self, id: ConnId) {
        self.unicast(id, self.user_vote_message(id));
    }

    /// Sends to every registered connection, joined or not. Returns how many
    /// queues accepted the message.
    pub fn broadcast(&self, msg: ServerToClient) -> usize {
        let mut delivered = 0;
        for (id, tx) in self.registry.outboxes() {
            if deliver(id, tx, msg.clone()) {
                delivered += 1;
            }
        }
        debug!(?msg, delivered, "broadcast");
        delivered
    }

    pub fn broadcast_presence(&self) -> usize {
        self.broadcast(self.presence_message())
    }

    pub fn broadcast_tally(&self) -> usize {
        self.broadcast(self.counts_message())
    }
}
