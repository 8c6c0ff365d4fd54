use crate::llm::client::{ChatCompletion, ChatRequest};
use crate::llm::config::AgentConfig;
use crate::llm::context::ConversationMessage;
use crate::llm::prompts::{
    intent_match_question, intent_question, INTENT_SYSTEM_PROMPT,
};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Outcome of an intent check
///
/// `matched` comes from a substring test on free-form model output. Treat it
/// as a noisy signal: the same utterance can produce a different verdict on
/// another run, and answers such as "Yes and no" count as a match.
#[derive(Clone, Debug, PartialEq)]
pub struct IntentVerdict {
    /// The model's one-sentence restatement of the user's intent
    pub stated_intent: String,

    /// Raw answer to the yes/no comparison
    pub answer: String,

    /// Whether `answer` was read as affirmative
    pub matched: bool,
}

impl IntentVerdict {
    pub fn is_match(&self) -> bool {
        self.matched
    }
}

/// Whether a yes/no answer counts as "yes" (case-insensitive substring)
pub fn answer_is_affirmative(answer: &str) -> bool {
    answer.to_lowercase().contains("yes")
}

/// Decides whether an utterance expresses a given intent
pub struct IntentAgent {
    config: AgentConfig,
    client: Arc<dyn ChatCompletion>,
}

impl IntentAgent {
    pub fn new(config: AgentConfig, client: Arc<dyn ChatCompletion>) -> Self {
        Self { config, client }
    }

    /// Two sequential calls: restate the intent, then ask whether the
    /// restatement matches `expected_intent`. Both carry the intent system turn;
    /// the yes/no constraint lives in the question itself.
    pub fn check_intent(&self, user_prompt: &str, expected_intent: &str) -> Result<IntentVerdict> {
        let stated_intent = self.ask(INTENT_SYSTEM_PROMPT, intent_question(user_prompt))?;
        let answer = self.ask(
            INTENT_SYSTEM_PROMPT,
            intent_match_question(&stated_intent, expected_intent),
        )?;
        let matched = answer_is_affirmative(&answer);

        debug!(%stated_intent, %answer, matched, "Intent checked");

        Ok(IntentVerdict {
            stated_intent,
            answer,
            matched,
        })
    }

    fn ask(&self, system_prompt: &str, question: String) -> Result<String> {
        let messages = vec![
            ConversationMessage::system(system_prompt),
            ConversationMessage::user(question),
        ];
        self.client.complete(&ChatRequest::new(&self.config, messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::GOODBYE_INTENT;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    struct Scripted {
        replies: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl Scripted {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    impl ChatCompletion for Scripted {
        fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.requests.lock().push(request.clone());
            Ok(self.replies.lock().pop_front().unwrap_or_default())
        }
    }

    #[test]
    fn test_affirmative_rule() {
        assert!(answer_is_affirmative("Yes."));
        assert!(answer_is_affirmative("YES"));
        assert!(answer_is_affirmative("yes, they do"));
        assert!(!answer_is_affirmative("No, they do not."));
        assert!(!answer_is_affirmative("I cannot tell."));
        assert!(!answer_is_affirmative(""));
    }

    #[test]
    fn test_goodbye_detected() {
        let client = Scripted::new(&["The user wants to leave.", "Yes."]);
        let agent = IntentAgent::new(AgentConfig::default(), client.clone());

        let verdict = agent.check_intent("Goodbye, thanks", GOODBYE_INTENT).unwrap();
        assert!(verdict.is_match());
        assert_eq!(verdict.stated_intent, "The user wants to leave.");

        let requests = client.requests.lock();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].messages[0].content, INTENT_SYSTEM_PROMPT);
        assert!(requests[0].messages[1].content.contains("Goodbye, thanks"));
        assert_eq!(requests[1].messages[0].content, INTENT_SYSTEM_PROMPT);
        assert_eq!(requests[1].messages.len(), 2);
        assert!(requests[1].messages[1]
            .content
            .contains("The user wants to leave."));
        assert!(requests[1].messages[1].content.contains(GOODBYE_INTENT));
    }

    #[test]
    fn test_negative_and_ambiguous_answers() {
        let client = Scripted::new(&["Wants to glue panels.", "No, they do not."]);
        let agent = IntentAgent::new(AgentConfig::default(), client);
        let verdict = agent
            .check_intent("I need help gluing mdf panels", GOODBYE_INTENT)
            .unwrap();
        assert!(!verdict.is_match());

        let client = Scripted::new(&["Unclear.", "I am not sure."]);
        let agent = IntentAgent::new(AgentConfig::default(), client);
        assert!(!agent.check_intent("hmm", GOODBYE_INTENT).unwrap().matched);
    }
}
