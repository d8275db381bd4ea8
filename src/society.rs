//! Society — a population of agents collaborating over one blackboard.
//!
//! The society owns the blackboard's lifetime: both are ephemeral, and
//! dropping the society stops every member agent, which in turn clears
//! their blackboard registrations.

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::agent::{Agent, AgentId};
use crate::blackboard::Blackboard;
use crate::concepts::ClassRegistry;

/// A bounded population of agents sharing a blackboard.
#[derive(Debug)]
pub struct Society {
    name: String,
    blackboard: Arc<Blackboard>,
    agents: Mutex<Vec<Arc<Agent>>>,
}

impl Society {
    /// Create a society with a fresh blackboard validating against the
    /// given registry.
    pub fn new(name: impl Into<String>, registry: Arc<ClassRegistry>) -> Self {
        let name = name.into();
        let blackboard = Arc::new(Blackboard::new(name.clone(), registry));
        Self {
            name,
            blackboard,
            agents: Mutex::new(Vec::new()),
        }
    }

    /// The society's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared blackboard.
    pub fn blackboard(&self) -> &Arc<Blackboard> {
        &self.blackboard
    }

    /// Adopt an agent: register its mailbox on the society's blackboard
    /// and track it for lifecycle cascade.
    pub fn adopt(&self, agent: Arc<Agent>) {
        agent.attach(&self.blackboard);
        debug!("society {}: adopted agent {}", self.name, agent.name());
        self.agents.lock().push(agent);
    }

    /// Member agents, newest last.
    pub fn agents(&self) -> Vec<Arc<Agent>> {
        self.agents.lock().clone()
    }

    /// Look up a member by identity.
    pub fn agent(&self, id: AgentId) -> Option<Arc<Agent>> {
        self.agents.lock().iter().find(|a| a.id() == id).cloned()
    }

    /// Number of member agents.
    pub fn number_of_agents(&self) -> usize {
        self.agents.lock().len()
    }

    /// Stop every member that is not already stopped. Each stop retires
    /// the agent from the blackboard.
    pub fn stop_all(&self) {
        for agent in self.agents.lock().iter() {
            if !agent.status().is_terminal() {
                let _ = agent.stop();
            }
        }
    }
}

impl Drop for Society {
    fn drop(&mut self) {
        self.stop_all();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentStatus;
    use crate::concepts::Concept;

    fn society() -> Society {
        Society::new("hive", Arc::new(ClassRegistry::new()))
    }

    #[test]
    fn test_adopt_registers_on_blackboard() {
        let s = society();
        let agent = Arc::new(Agent::new("worker"));
        s.adopt(Arc::clone(&agent));

        assert_eq!(s.number_of_agents(), 1);
        assert!(s.blackboard().agent_is_registered(&agent.id()));
        assert!(s.agent(agent.id()).is_some());
    }

    #[test]
    fn test_stop_all_cascades() {
        let s = society();
        let a = Arc::new(Agent::new("a"));
        let b = Arc::new(Agent::new("b"));
        s.adopt(Arc::clone(&a));
        s.adopt(Arc::clone(&b));
        a.start().unwrap();

        let concept = s
            .blackboard()
            .publish_concept(Concept::new("Door"), a.id())
            .unwrap();
        s.blackboard()
            .subscribe_to_concept(concept.id(), b.id())
            .unwrap();

        s.stop_all();

        assert_eq!(a.status(), AgentStatus::Stopped);
        assert_eq!(b.status(), AgentStatus::Stopped);
        assert!(s.blackboard().subscribers(concept.id()).unwrap().is_empty());
        // stop_all is idempotent
        s.stop_all();
    }

    #[test]
    fn test_drop_stops_members() {
        let a = Arc::new(Agent::new("a"));
        {
            let s = society();
            s.adopt(Arc::clone(&a));
            a.start().unwrap();
        }
        assert_eq!(a.status(), AgentStatus::Stopped);
    }
}
