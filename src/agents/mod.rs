//! Dialogue agents backed by the chat-completion service
//!
//! - **chat**: domain specialists that answer the customer
//! - **intent**: two-step intent check used to detect goodbyes
//! - **commander**: category classifier that also fronts the speech interface

pub mod chat;
pub mod commander;
pub mod intent;

pub use chat::ChatAgent;
pub use commander::{extract_bracket_content, Category, Classification, CommanderAgent};
pub use intent::{answer_is_affirmative, IntentAgent, IntentVerdict};
