use livepoll_protocol::{Counts, OptionId};
use std::collections::HashMap;

use crate::registry::ConnId;

/// Current vote per connection plus the running tally derived from it.
/// Every method updates both together.
#[derive(Debug, Default)]
pub struct Ledger {
    votes: HashMap<ConnId, OptionId>,
    tally: Counts,
}

impl Ledger {
    /// Votes for `option`, switching away from a different previous vote.
    /// Choosing the current vote again withdraws it. Returns the vote now held.
    pub fn cast_vote(&mut self, id: ConnId, option: OptionId) -> Option<OptionId> {
        match self.votes.get(&id).copied() {
            Some(current) if current == option => {
                self.votes.remove(&id);
                *self.tally.get_mut(option) -= 1;
                None
            }
            previous => {
                if let Some(previous) = previous {
                    *self.tally.get_mut(previous) -= 1;
                }
                self.votes.insert(id, option);
                *self.tally.get_mut(option) += 1;
                Some(option)
            }
        }
    }

    /// Withdraws the connection's vote, if any, and returns it.
    pub fn remove_vote(&mut self, id: ConnId) -> Option<OptionId> {
        let removed = self.votes.remove(&id)?;
        *self.tally.get_mut(removed) -= 1;
        Some(removed)
    }

    /// Disconnect cleanup; same effect as `remove_vote`.
    pub fn clear(&mut self, id: ConnId) -> Option<OptionId> {
        self.remove_vote(id)
    }

    pub fn current_vote(&self, id: ConnId) -> Option<OptionId> {
        self.votes.get(&id).copied()
    }

    pub fn snapshot_tally(&self) -> Counts {
        self.tally
    }

    pub fn clear_all(&mut self) {
        self.votes.clear();
        self.tally = Counts::default();
    }

    /// Tally rebuilt from scratch out of the per-connection votes.
    #[cfg(test)]
    pub fn recount(&self) -> Counts {
        let mut counts = Counts::default();
        for option in self.votes.values() {
            *counts.get_mut(*option) += 1;
        }
        counts
    }
}
