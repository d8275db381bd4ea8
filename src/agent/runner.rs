//! Tokio binding of the agent scheduling contract.
//!
//! The substrate contract is small: invoke the activity repeatedly
//! while the agent is running, deliver drained signals, never block the
//! signaler. This module fulfills it with one spawned task per agent.
//! Any other substrate (threads, processes) can drive an
//! [`Agent`]/[`Activity`] pair the same way; nothing below is required
//! by the rest of the crate.

use std::sync::Arc;

use log::{debug, warn};
use tokio::task::JoinHandle;

use super::core::{Activity, Agent, AgentStatus};
use crate::errors::{NoemaError, Result};

/// Spawn a task driving the agent.
///
/// While running, signals are drained to [`Activity::on_signal`] and
/// [`Activity::on_activity`] is invoked in a loop; while created or
/// paused the task parks (signals stay queued); on stop the task exits.
/// Errors returned by the activity are logged and do not stop the
/// agent; recovery is the activity's own concern.
///
/// Fails if the agent's mailbox was already taken by another driver.
pub fn spawn(agent: Arc<Agent>, activity: Arc<dyn Activity>) -> Result<JoinHandle<()>> {
    let mut rx = agent.take_mailbox().ok_or_else(|| {
        NoemaError::validation(format!(
            "agent {} is already driven: mailbox taken",
            agent.name()
        ))
    })?;

    Ok(tokio::spawn(async move {
        loop {
            match agent.status() {
                AgentStatus::Running => {
                    while let Ok(signal) = rx.try_recv() {
                        if let Err(err) = activity.on_signal(&agent, signal).await {
                            warn!("agent {}: signal handling failed: {err}", agent.name());
                        }
                    }
                    if let Err(err) = activity.on_activity(&agent).await {
                        warn!("agent {}: activity failed: {err}", agent.name());
                    }
                    tokio::task::yield_now().await;
                }
                AgentStatus::Created | AgentStatus::Paused => {
                    let wake = agent.notified();
                    if matches!(agent.status(), AgentStatus::Created | AgentStatus::Paused) {
                        wake.await;
                    }
                }
                AgentStatus::Stopped => break,
            }
        }
        debug!("agent {}: runner exited", agent.name());
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::blackboard::{Signal, SignalKind, SignalSource};

    #[derive(Default)]
    struct Counting {
        steps: AtomicUsize,
        signals: AtomicUsize,
    }

    #[async_trait]
    impl Activity for Counting {
        async fn on_activity(&self, _agent: &Agent) -> crate::errors::Result<()> {
            self.steps.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(())
        }

        async fn on_signal(&self, _agent: &Agent, _signal: Signal) -> crate::errors::Result<()> {
            self.signals.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sig() -> Signal {
        Signal::new(SignalKind::Notification, SignalSource::Blackboard("b".into()))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_runner_drives_activity_while_running() {
        let agent = Arc::new(Agent::new("worker"));
        let activity = Arc::new(Counting::default());
        let handle = spawn(Arc::clone(&agent), activity.clone()).unwrap();

        // created: parked, no steps yet
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(activity.steps.load(Ordering::SeqCst), 0);

        agent.start().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(activity.steps.load(Ordering::SeqCst) > 0);

        agent.stop().unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_pause_halts_and_resume_continues() {
        let agent = Arc::new(Agent::new("worker"));
        let activity = Arc::new(Counting::default());
        let handle = spawn(Arc::clone(&agent), activity.clone()).unwrap();

        agent.start().unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        agent.pause().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let paused_at = activity.steps.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(30)).await;
        // at most one in-flight step may have landed after pause
        assert!(activity.steps.load(Ordering::SeqCst) <= paused_at + 1);

        agent.start().unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(activity.steps.load(Ordering::SeqCst) > paused_at);

        agent.stop().unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_signals_reach_activity() {
        let agent = Arc::new(Agent::new("worker"));
        let activity = Arc::new(Counting::default());
        let handle = spawn(Arc::clone(&agent), activity.clone()).unwrap();

        agent.start().unwrap();
        agent.signal(sig()).unwrap();
        agent.signal(sig()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(activity.signals.load(Ordering::SeqCst), 2);

        agent.stop().unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_signals_queue_while_paused() {
        let agent = Arc::new(Agent::new("worker"));
        let activity = Arc::new(Counting::default());
        let handle = spawn(Arc::clone(&agent), activity.clone()).unwrap();

        // queued while created, drained once running
        agent.signal(sig()).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(activity.signals.load(Ordering::SeqCst), 0);

        agent.start().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(activity.signals.load(Ordering::SeqCst), 1);

        agent.stop().unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_spawn_twice_fails() {
        let agent = Arc::new(Agent::new("worker"));
        let activity = Arc::new(Counting::default());
        let handle = spawn(Arc::clone(&agent), activity.clone()).unwrap();
        assert!(spawn(Arc::clone(&agent), activity).is_err());
        agent.stop().unwrap();
        handle.await.unwrap();
    }
}
