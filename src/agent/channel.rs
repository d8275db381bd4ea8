//! Channels — direct agent-to-agent signaling, bypassing the
//! blackboard.
//!
//! A channel is a point-to-point handle onto the peer's mailbox.
//! Delivery is in-process over an unbounded queue: ordered, and exactly
//! once for as long as the peer (or its runner) holds the receiving
//! half. Establishing a channel transfers no data.

use super::core::{Agent, AgentId};
use crate::blackboard::{Mailbox, Signal};
use crate::errors::{NoemaError, Result};

/// A one-way handle for signaling a specific peer agent.
///
/// For a duplex conversation each side connects to the other.
#[derive(Debug, Clone)]
pub struct Channel {
    from: AgentId,
    to: AgentId,
    to_name: String,
    tx: Mailbox,
}

impl Channel {
    /// Wire a channel from one agent to another.
    pub(crate) fn between(from: &Agent, to: &Agent) -> Self {
        Self {
            from: from.id(),
            to: to.id(),
            to_name: to.name().to_string(),
            tx: to.mailbox_sender(),
        }
    }

    /// The connecting agent.
    pub fn from(&self) -> AgentId {
        self.from
    }

    /// The peer agent.
    pub fn to(&self) -> AgentId {
        self.to
    }

    /// Send a signal to the peer. Non-blocking; fails only once the
    /// peer's mailbox has been torn down.
    pub fn signal(&self, signal: Signal) -> Result<()> {
        self.tx.send(signal).map_err(|_| {
            NoemaError::validation(format!("channel to agent {} is closed", self.to_name))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
