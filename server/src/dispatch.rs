use livepoll_protocol::{decode_client_message, ClientToServer, ServerToClient};
use tracing::{debug, info, warn};

use crate::error::PollError;
use crate::registry::ConnId;
use crate::state::{Coordinator, PollState};

impl Coordinator {
    /// Entry point for one inbound text frame.
    pub fn handle_text(&self, id: ConnId, text: &str) {
        match decode_client_message(text) {
            Ok(cmd) => self.handle_message(id, cmd),
            Err(err) => self.reject(id, err.into()),
        }
    }

    pub fn handle_message(&self, id: ConnId, cmd: ClientToServer) {
        debug!(conn = %id, ?cmd, "inbound message");

        self.with_state(|state| {
            if !state.registry.contains(id) {
                debug!(conn = %id, "dropping message from closed connection");
                return;
            }

            match cmd {
                ClientToServer::Join { name } => match state.registry.set_identity(id, &name) {
                    Ok(name) => {
                        info!(conn = %id, %name, "user joined");
                        state.broadcast_presence();
                    }
                    Err(err) => send_err_to(state, id, err),
                },
                ClientToServer::Vote { option_id } => {
                    let now = state.ledger.cast_vote(id, option_id);
                    debug!(
                        conn = %id,
                        option = %option_id,
                        withdrawn = now.is_none(),
                        counts = ?state.ledger.snapshot_tally(),
                        "vote cast"
                    );
                    state.broadcast_tally();
                    state.unicast_current_vote(id);
                }
                ClientToServer::RemoveVote => {
                    let removed = state.ledger.remove_vote(id);
                    debug!(conn = %id, ?removed, "vote removed");
                    state.broadcast_tally();
                    state.unicast_current_vote(id);
                }
            }
        });
    }

    /// Reports a client-input failure to that connection only.
    pub fn reject(&self, id: ConnId, err: PollError) {
        self.with_state(|state| send_err_to(state, id, err));
    }
}

fn send_err_to(state: &PollState, id: ConnId, err: PollError) {
    warn!(conn = %id, error = ?err, "rejected client message");
    state.unicast(id, ServerToClient::error(err.to_string()));
}
