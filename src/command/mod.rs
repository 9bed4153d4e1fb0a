//! Command pipeline
//!
//! Chat text and chaos timers both end up as `EventEnvelope`s:
//! - `parser`: chat batch -> at most one event
//! - `queue`: per-kind FIFOs drained on a timer with stagger
//! - `chaos`: randomised category timers for chat-free play
//! - `chat`: message type, donation routing, offline chatter

pub mod chaos;
pub mod chat;
pub mod parser;
pub mod queue;

pub use chaos::{ChaosBounds, ChaosCategory, ChaosScheduler};
pub use chat::{ChatMessage, ChatSource, donation_events, offline_message};
pub use parser::CommandParser;
pub use queue::{Enqueued, EventQueue, STAGGER_MS};
