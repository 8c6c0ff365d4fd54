use crate::llm::client::{ChatCompletion, ChatRequest};
use crate::llm::config::AgentConfig;
use crate::llm::context::{ConversationMessage, Transcript};
use crate::llm::prompts::respond_within;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Domain specialist that answers on top of the shared transcript
pub struct ChatAgent {
    name: String,
    system_prompt: String,
    config: AgentConfig,
    client: Arc<dyn ChatCompletion>,
}

impl ChatAgent {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        config: AgentConfig,
        client: Arc<dyn ChatCompletion>,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            config,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Generate a reply to `user_prompt`, limited to `max_sentences` sentences.
    ///
    /// The request is the agent's system turn, then the transcript, then the
    /// wrapped user turn. On success the user turn and the reply are appended
    /// to `transcript`; the system turn never is.
    ///
    /// The user turn is appended only after the call succeeds so a failed call
    /// leaves the transcript untouched. Any fault ends the session, so appending
    /// before the call would not be observable.
    pub fn generate(
        &self,
        user_prompt: &str,
        transcript: &mut Transcript,
        max_sentences: usize,
    ) -> Result<String> {
        let user_turn = ConversationMessage::user(respond_within(max_sentences, user_prompt));

        let mut messages = Vec::with_capacity(transcript.len() + 2);
        messages.push(ConversationMessage::system(self.system_prompt.as_str()));
        messages.extend(transcript.messages().iter().cloned());
        messages.push(user_turn.clone());

        let reply = self.client.complete(&ChatRequest::new(&self.config, messages))?;
        debug!(agent = %self.name, chars = reply.len(), "Agent replied");

        transcript.push(user_turn);
        transcript.add_assistant_message(reply.as_str());

        Ok(reply)
    }
}
