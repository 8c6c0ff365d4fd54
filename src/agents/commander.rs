use crate::llm::client::{ChatCompletion, ChatRequest};
use crate::llm::config::AgentConfig;
use crate::llm::context::{ConversationMessage, Transcript};
use crate::llm::prompts::{classifier_instructions, classifier_question};
use crate::speech::SpeechInterface;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

static BRACKET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[(.*?)\]").expect("bracket pattern is a valid regex")
});

/// Domains a request can be routed to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Wood,
    Fasteners,
    Payments,
    General,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Wood,
        Category::Fasteners,
        Category::Payments,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Wood => "Wood",
            Category::Fasteners => "Fasteners",
            Category::Payments => "Payments",
            Category::General => "General",
        }
    }

    /// Exact, case-sensitive lookup of a label
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == label)
    }

    /// Comma-separated list of every category name
    pub fn list() -> String {
        Category::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying an utterance
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    /// Bracketed text extracted verbatim from the model's answer (may be empty)
    pub label: String,

    /// `label` resolved against the closed category set
    pub category: Option<Category>,
}

impl Classification {
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        let category = Category::from_label(&label);
        Self { label, category }
    }

    pub fn is_recognized(&self) -> bool {
        self.category.is_some()
    }

    /// Category to dispatch to; unrecognized labels go to `General`
    pub fn route(&self) -> Category {
        self.category.unwrap_or(Category::General)
    }
}

/// First `[...]` span in `text`, or an empty string
pub fn extract_bracket_content(text: &str) -> String {
    BRACKET_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Front-desk agent: classifies requests and owns the speech interface
pub struct CommanderAgent {
    context: String,
    categories: String,
    config: AgentConfig,
    client: Arc<dyn ChatCompletion>,
    speech: Box<dyn SpeechInterface>,
}

impl CommanderAgent {
    pub fn new(
        context: impl Into<String>,
        categories: impl Into<String>,
        config: AgentConfig,
        client: Arc<dyn ChatCompletion>,
        speech: Box<dyn SpeechInterface>,
    ) -> Self {
        Self {
            context: context.into(),
            categories: categories.into(),
            config,
            client,
            speech,
        }
    }

    /// Ask the model which category fits `user_prompt`, given the conversation so far
    pub fn classify(&self, user_prompt: &str, transcript: &Transcript) -> Result<Classification> {
        let mut messages = Vec::with_capacity(transcript.len() + 2);
        messages.push(ConversationMessage::system(classifier_instructions(&self.context)));
        messages.extend(transcript.messages().iter().cloned());
        messages.push(ConversationMessage::user(classifier_question(
            &self.categories,
            user_prompt,
        )));

        let answer = self.client.complete(&ChatRequest::new(&self.config, messages))?;
        debug!(%answer, "Classifier answered");

        let classification = Classification::from_label(extract_bracket_content(&answer));
        info!(label = %classification.label, recognized = classification.is_recognized(), "Category");

        Ok(classification)
    }

    /// Speak `text`, blocking until playback ends
    pub fn say(&mut self, text: &str) -> Result<()> {
        self.speech.speak(text)
    }

    /// One recognition attempt; may return an empty string
    pub fn start_listening(&mut self) -> Result<String> {
        self.speech.listen()
    }

    pub fn stop_listening(&mut self) -> Result<()> {
        self.speech.stop_listening()
    }
}
