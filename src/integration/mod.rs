//! Integration layer
//!
//! - **config**: application configuration read from the environment
//! - **dispatch**: the dialogue loop tying speech, classification and agents together

pub mod config;
pub mod dispatch;

pub use config::{AppConfig, SpeechMode};
pub use dispatch::{AgentRoster, DialogueState, DispatchLoop, SessionSummary, StepOutcome};
