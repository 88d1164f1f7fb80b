use livepoll_protocol::ServerToClient;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::PollError;

/// Outbound queue of one connection, drained by its writer task. Delivery is
/// best-effort: sends never block, and backpressure on a stalled client is
/// left to the transport.
pub type Outbox = mpsc::UnboundedSender<ServerToClient>;

/// Opaque handle issued when a connection is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(Uuid);

impl ConnId {
    pub fn generate() -> Self {
        ConnId(Uuid::new_v4())
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

#[derive(Debug)]
struct Identity {
    name: String,
    joined_seq: u64,
}

#[derive(Debug)]
struct ConnRecord {
    tx: Outbox,
    identity: Option<Identity>,
}

/// Live connections and the display names they joined with.
#[derive(Debug, Default)]
pub struct Registry {
    records: HashMap<ConnId, ConnRecord>,
    next_seq: u64,
}

impl Registry {
    pub fn register(&mut self, id: ConnId, tx: Outbox) {
        self.records.insert(id, ConnRecord { tx, identity: None });
    }

    /// Binds a trimmed, non-empty name to a registered connection and returns
    /// it. A second call overwrites the name but keeps the join position.
    pub fn set_identity(&mut self, id: ConnId, name: &str) -> Result<String, PollError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PollError::InvalidName);
        }
        let record = self.records.get_mut(&id).ok_or(PollError::InvalidName)?;
        match record.identity.as_mut() {
            Some(identity) => identity.name = name.to_string(),
            None => {
                self.next_seq += 1;
                record.identity = Some(Identity {
                    name: name.to_string(),
                    joined_seq: self.next_seq,
                });
            }
        }
        Ok(name.to_string())
    }

    /// Drops the connection. Returns its name if it had joined.
    pub fn unregister(&mut self, id: ConnId) -> Option<String> {
        self.records
            .remove(&id)
            .and_then(|record| record.identity)
            .map(|identity| identity.name)
    }

    pub fn contains(&self, id: ConnId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn identity(&self, id: ConnId) -> Option<&str> {
        self.records
            .get(&id)
            .and_then(|record| record.identity.as_ref())
            .map(|identity| identity.name.as_str())
    }

    /// The presence set: joined names, newest join first.
    pub fn list_identities(&self) -> Vec<String> {
        let mut joined: Vec<&Identity> = self
            .records
            .values()
            .filter_map(|record| record.identity.as_ref())
            .collect();
        joined.sort_by(|a, b| b.joined_seq.cmp(&a.joined_seq));
        joined.into_iter().map(|identity| identity.name.clone()).collect()
    }

    pub fn joined_count(&self) -> usize {
        self.records
            .values()
            .filter(|record| record.identity.is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn outbox(&self, id: ConnId) -> Option<&Outbox> {
        self.records.get(&id).map(|record| &record.tx)
    }

    pub fn outboxes(&self) -> impl Iterator<Item = (ConnId, &Outbox)> {
        self.records.iter().map(|(id, record)| (*id, &record.tx))
    }

    /// Forgets every name; connections stay registered.
    pub fn clear_identities(&mut self) {
        for record in self.records.values_mut() {
            record.identity = None;
        }
    }
}
