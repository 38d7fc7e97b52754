//! Conversational finance + web assistant
//!
//! A [`ChatSession`] owns one transcript and the last ticker the user
//! mentioned. [`ChatAssistant`] forwards each prepared turn to a team of a
//! web-search agent and a finance agent and streams the reply back.
//! [`SessionStore`] keeps sessions alive between web requests and drops
//! them once idle.

mod assistant;
mod session;
mod store;

pub use assistant::{ChatAssistant, finance_agent_profile, lead_profile, web_search_agent_profile};
pub use session::{ChatSession, ChatState, PreparedTurn, ResponseBuffer};
pub use store::{DEFAULT_IDLE_TIMEOUT, SessionStore};
