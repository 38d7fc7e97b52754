//! Core abstractions for invest-assist agents
//!
//! This crate defines the capability every analyzer implements: take a prompt
//! plus an execution [`Context`] and answer either with a complete text or with
//! an incremental [`TextStream`].

pub mod agent;
pub mod context;
pub mod error;
pub mod stream;
pub mod turn;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
pub use stream::{TextStream, collect_text, once};
pub use turn::{ConversationTurn, TurnRole};
