//! Agents: lifecycle, activities, channels, and the bundled tokio
//! runner.

pub mod channel;
pub mod core;
pub mod runner;

pub use channel::Channel;
pub use core::{Activity, Agent, AgentId, AgentStatus};
