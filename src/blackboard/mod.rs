//! Blackboard — publish/subscribe collaboration over concepts.
//!
//! Agents publish concepts, subscribe to individual concepts or to
//! concept classes, and exchange notification signals through the
//! board. Class subscriptions are latent: they attach to instances at
//! the moment the instance is published.

pub mod board;
pub mod signal;

pub use board::Blackboard;
pub use signal::{mailbox, Mailbox, Signal, SignalKind, SignalReceiver, SignalSource};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
