//! Agent — an independently scheduled actor with identity, lifecycle,
//! and messaging.
//!
//! The agent itself carries no threading: it is a lifecycle state
//! machine plus a mailbox. A scheduling substrate (see
//! [`crate::agent::runner`] for the bundled tokio binding) drives the
//! agent's [`Activity`] while it is running and delivers drained
//! signals. References to collaborators (blackboards, channels) are
//! threaded through explicitly; there is no ambient lookup.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::blackboard::{mailbox, Blackboard, Mailbox, Signal, SignalReceiver};
use crate::errors::{NoemaError, Result};

/// Identity of an agent.
pub type AgentId = Uuid;

/// Agent lifecycle states.
///
/// `created -> running <-> paused -> stopped`, with `created -> stopped`
/// permitted for a cancelled start. Stopped is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentStatus {
    Created,
    Running,
    Paused,
    Stopped,
}

impl AgentStatus {
    /// True while the agent participates in its society: running or
    /// paused.
    pub fn is_alive(self) -> bool {
        matches!(self, AgentStatus::Running | AgentStatus::Paused)
    }

    /// True for the terminal state.
    pub fn is_terminal(self) -> bool {
        self == AgentStatus::Stopped
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AgentStatus::Created => "created",
            AgentStatus::Running => "running",
            AgentStatus::Paused => "paused",
            AgentStatus::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// The unit of work an agent performs, supplied from outside the core.
///
/// `on_activity` is invoked repeatedly while the agent is running;
/// `on_signal` for every signal drained from the mailbox. Both borrow
/// the agent so implementations can inspect status or stop it.
#[async_trait]
pub trait Activity: Send + Sync {
    /// One step of the agent's essential activity.
    async fn on_activity(&self, agent: &Agent) -> Result<()>;

    /// React to a signal. The default ignores it.
    async fn on_signal(&self, agent: &Agent, signal: Signal) -> Result<()> {
        let _ = (agent, signal);
        Ok(())
    }
}

/// An actor with identity, lifecycle state, and a mailbox.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    name: String,
    status: Mutex<AgentStatus>,
    wake: Notify,
    mailbox_tx: Mailbox,
    mailbox_rx: Mutex<Option<SignalReceiver>>,
    boards: Mutex<Vec<Weak<Blackboard>>>,
}

impl Agent {
    /// Create an agent in the `Created` state.
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, rx) = mailbox();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: Mutex::new(AgentStatus::Created),
            wake: Notify::new(),
            mailbox_tx: tx,
            mailbox_rx: Mutex::new(Some(rx)),
            boards: Mutex::new(Vec::new()),
        }
    }

    /// The agent's identity.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The agent's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current lifecycle state.
    pub fn status(&self) -> AgentStatus {
        *self.status.lock()
    }

    /// True iff the agent is running or paused.
    pub fn is_alive(&self) -> bool {
        self.status().is_alive()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start the agent: `created -> running` or `paused -> running`.
    pub fn start(&self) -> Result<()> {
        let mut status = self.status.lock();
        match *status {
            AgentStatus::Created | AgentStatus::Paused => {
                *status = AgentStatus::Running;
                drop(status);
                self.wake.notify_one();
                debug!("agent {}: running", self.name);
                Ok(())
            }
            from => Err(NoemaError::invalid_transition(
                from.to_string(),
                AgentStatus::Running.to_string(),
            )),
        }
    }

    /// Pause the agent: `running -> paused` only.
    pub fn pause(&self) -> Result<()> {
        let mut status = self.status.lock();
        match *status {
            AgentStatus::Running => {
                *status = AgentStatus::Paused;
                drop(status);
                debug!("agent {}: paused", self.name);
                Ok(())
            }
            from => Err(NoemaError::invalid_transition(
                from.to_string(),
                AgentStatus::Paused.to_string(),
            )),
        }
    }

    /// Stop the agent. Terminal and irreversible; legal from any
    /// non-terminal state, including `created`. Retires the agent from
    /// every blackboard it attached to, so no further signals reach it.
    pub fn stop(&self) -> Result<()> {
        {
            let mut status = self.status.lock();
            if status.is_terminal() {
                return Err(NoemaError::invalid_transition(
                    status.to_string(),
                    AgentStatus::Stopped.to_string(),
                ));
            }
            *status = AgentStatus::Stopped;
        }
        self.wake.notify_one();
        let boards = std::mem::take(&mut *self.boards.lock());
        for board in boards {
            if let Some(board) = board.upgrade() {
                board.retire_agent(&self.id);
            }
        }
        debug!("agent {}: stopped", self.name);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Messaging and wiring
    // -----------------------------------------------------------------------

    /// Deliver a signal to the agent's mailbox. Fire-and-forget:
    /// queuing succeeds in any non-stopped state regardless of whether
    /// the agent is currently draining.
    pub fn signal(&self, signal: Signal) -> Result<()> {
        let status = self.status();
        if status.is_terminal() {
            return Err(NoemaError::invalid_transition(
                status.to_string(),
                "signal".to_string(),
            ));
        }
        // the receiving half lives as long as the agent or its runner
        let _ = self.mailbox_tx.send(signal);
        self.wake.notify_one();
        Ok(())
    }

    /// The sending half of this agent's mailbox, for substrates that
    /// wire their own delivery.
    pub fn mailbox_sender(&self) -> Mailbox {
        self.mailbox_tx.clone()
    }

    /// Take the receiving half of the mailbox. Yields `Some` exactly
    /// once; the runner takes it when spawned.
    pub fn take_mailbox(&self) -> Option<SignalReceiver> {
        self.mailbox_rx.lock().take()
    }

    /// Register this agent's mailbox on a blackboard and remember the
    /// board for cleanup at stop time.
    pub fn attach(&self, board: &Arc<Blackboard>) {
        board.register_agent(self.id, self.mailbox_tx.clone());
        self.boards.lock().push(Arc::downgrade(board));
    }

    /// Establish a point-to-point channel to another agent. Pure
    /// wiring: no data is transferred.
    pub fn connect(&self, peer: &Agent) -> super::channel::Channel {
        super::channel::Channel::between(self, peer)
    }

    /// A future resolving at the next lifecycle or mailbox wakeup.
    pub(crate) fn notified(&self) -> tokio::sync::futures::Notified<'_> {
        self.wake.notified()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::{SignalKind, SignalSource};
    use crate::concepts::ClassRegistry;

    fn sig() -> Signal {
        Signal::new(SignalKind::Notification, SignalSource::Blackboard("b".into()))
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let agent = Agent::new("worker");
        assert_eq!(agent.status(), AgentStatus::Created);
        assert!(!agent.is_alive());

        agent.start().unwrap();
        assert_eq!(agent.status(), AgentStatus::Running);
        assert!(agent.is_alive());

        agent.pause().unwrap();
        assert_eq!(agent.status(), AgentStatus::Paused);
        assert!(agent.is_alive());

        agent.start().unwrap();
        assert_eq!(agent.status(), AgentStatus::Running);

        agent.stop().unwrap();
        assert_eq!(agent.status(), AgentStatus::Stopped);
        assert!(!agent.is_alive());
    }

    #[test]
    fn test_created_to_stopped_directly() {
        let agent = Agent::new("cancelled");
        agent.stop().unwrap();
        assert_eq!(agent.status(), AgentStatus::Stopped);
    }

    #[test]
    fn test_invalid_transitions_leave_state_unchanged() {
        let agent = Agent::new("worker");

        // pause before ever running
        let err = agent.pause().unwrap_err();
        assert!(matches!(err, NoemaError::InvalidStateTransition { .. }));
        assert_eq!(agent.status(), AgentStatus::Created);

        agent.start().unwrap();
        // double start
        let err = agent.start().unwrap_err();
        assert!(matches!(err, NoemaError::InvalidStateTransition { .. }));
        assert_eq!(agent.status(), AgentStatus::Running);

        agent.stop().unwrap();
        // everything fails once stopped
        assert!(agent.start().is_err());
        assert!(agent.pause().is_err());
        assert!(agent.stop().is_err());
        assert_eq!(agent.status(), AgentStatus::Stopped);
    }

    #[test]
    fn test_signal_queues_in_any_live_state() {
        let agent = Agent::new("worker");
        agent.signal(sig()).unwrap();
        agent.start().unwrap();
        agent.signal(sig()).unwrap();
        agent.pause().unwrap();
        agent.signal(sig()).unwrap();

        let mut rx = agent.take_mailbox().unwrap();
        let mut n = 0;
        while rx.try_recv().is_ok() {
            n += 1;
        }
        assert_eq!(n, 3);
    }

    #[test]
    fn test_signal_after_stop_fails() {
        let agent = Agent::new("worker");
        agent.stop().unwrap();
        let err = agent.signal(sig()).unwrap_err();
        assert!(matches!(err, NoemaError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_take_mailbox_is_one_shot() {
        let agent = Agent::new("worker");
        assert!(agent.take_mailbox().is_some());
        assert!(agent.take_mailbox().is_none());
    }

    #[test]
    fn test_stop_retires_from_attached_boards() {
        let board = Arc::new(Blackboard::new("board", Arc::new(ClassRegistry::new())));
        let publisher = Agent::new("publisher");
        let agent = Agent::new("subscriber");
        publisher.attach(&board);
        agent.attach(&board);

        let concept = board
            .publish_concept(crate::concepts::Concept::new("Door"), publisher.id())
            .unwrap();
        board.subscribe_to_concept(concept.id(), agent.id()).unwrap();
        assert_eq!(board.subscribers(concept.id()).unwrap(), vec![agent.id()]);

        agent.stop().unwrap();

        assert!(board.subscribers(concept.id()).unwrap().is_empty());
        assert!(!board.agent_is_registered(&agent.id()));
    }
}
