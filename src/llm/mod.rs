//! Chat-completion integration
//!
//! - **config**: service connection settings and per-agent model settings
//! - **context**: conversation turns and the shared session transcript
//! - **client**: the `ChatCompletion` seam and the hosted Azure OpenAI client
//! - **prompts**: fixed prompts and prompt templates

pub mod client;
pub mod config;
pub mod context;
pub mod prompts;

pub use client::{AzureChatClient, ChatCompletion, ChatRequest};
pub use config::{AgentConfig, ChatServiceConfig};
pub use context::{ConversationMessage, MessageRole, Transcript};
