//! The dialogue loop: listen, classify, check for goodbye, respond
//!
//! Everything runs on the calling thread. Each service call blocks until its
//! round-trip completes and any fault ends the session.

use crate::agents::{Category, ChatAgent, Classification, CommanderAgent, IntentAgent};
use crate::integration::config::AppConfig;
use crate::llm::client::ChatCompletion;
use crate::llm::config::AgentConfig;
use crate::llm::context::Transcript;
use crate::llm::prompts::{
    COMMANDER_CONTEXT, FAREWELL, FASTENERS_PROMPT, GENERAL_PROMPT, GOODBYE_INTENT, GREETING,
    PAYMENTS_PROMPT, WOOD_PROMPT,
};
use crate::speech::SpeechInterface;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span};
use uuid::Uuid;

/// One domain agent per category
pub struct AgentRoster {
    wood: ChatAgent,
    fasteners: ChatAgent,
    payments: ChatAgent,
    general: ChatAgent,
}

impl AgentRoster {
    /// The four store specialists with their fixed prompts
    pub fn new(config: &AgentConfig, client: Arc<dyn ChatCompletion>) -> Self {
        let agent = |category: Category, prompt: &str| {
            ChatAgent::new(category.as_str(), prompt, config.clone(), Arc::clone(&client))
        };

        Self {
            wood: agent(Category::Wood, WOOD_PROMPT),
            fasteners: agent(Category::Fasteners, FASTENERS_PROMPT),
            payments: agent(Category::Payments, PAYMENTS_PROMPT),
            general: agent(Category::General, GENERAL_PROMPT),
        }
    }

    pub fn from_agents(wood: ChatAgent, fasteners: ChatAgent, payments: ChatAgent, general: ChatAgent) -> Self {
        Self {
            wood,
            fasteners,
            payments,
            general,
        }
    }

    pub fn get(&self, category: Category) -> &ChatAgent {
        match category {
            Category::Wood => &self.wood,
            Category::Fasteners => &self.fasteners,
            Category::Payments => &self.payments,
            Category::General => &self.general,
        }
    }

    /// Agent for a classification; unrecognized labels go to General
    pub fn route(&self, classification: &Classification) -> &ChatAgent {
        self.get(classification.route())
    }
}

/// Where the loop currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogueState {
    Greeting,
    Listening,
    Classifying,
    IntentCheck,
    Responding,
    Farewell,
}

/// Result of a single listen-to-speak cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Farewell,
}

/// What a finished session leaves behind
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub session_id: Uuid,

    /// Cycles answered by a domain agent
    pub turns: usize,

    pub transcript: Transcript,
}

pub struct DispatchLoop {
    commander: CommanderAgent,
    intent: IntentAgent,
    roster: AgentRoster,
    transcript: Transcript,
    max_sentences: usize,
    state: DialogueState,
    turns: usize,
    session_id: Uuid,
}

impl DispatchLoop {
    pub fn new(commander: CommanderAgent, intent: IntentAgent, roster: AgentRoster, max_sentences: usize) -> Self {
        Self {
            commander,
            intent,
            roster,
            transcript: Transcript::new(),
            max_sentences,
            state: DialogueState::Greeting,
            turns: 0,
            session_id: Uuid::new_v4(),
        }
    }

    /// Wire up the store's agents around a shared chat client and speech interface
    pub fn from_config(
        config: &AppConfig,
        client: Arc<dyn ChatCompletion>,
        speech: Box<dyn SpeechInterface>,
    ) -> Self {
        let commander = CommanderAgent::new(
            COMMANDER_CONTEXT,
            Category::list(),
            config.agent.clone(),
            Arc::clone(&client),
            speech,
        );
        let intent = IntentAgent::new(config.agent.clone(), Arc::clone(&client));
        let roster = AgentRoster::new(&config.agent, client);

        Self::new(commander, intent, roster, config.max_sentences)
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    fn set_state(&mut self, state: DialogueState) {
        debug!(from = ?self.state, to = ?state, "State");
        self.state = state;
    }

    /// Speak the opening line
    pub fn greet(&mut self) -> Result<()> {
        self.set_state(DialogueState::Greeting);
        self.commander.say(GREETING)
    }

    /// Run one cycle: listen, classify, check for goodbye, then respond or say farewell
    ///
    /// Afterwards the state is `Listening` when the loop continues and
    /// `Farewell` when it has ended.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.set_state(DialogueState::Listening);
        let utterance = self.commander.start_listening()?;
        info!(%utterance, "Heard");

        self.set_state(DialogueState::Classifying);
        let start = Instant::now();
        let classification = self.commander.classify(&utterance, &self.transcript)?;
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Classified");

        self.set_state(DialogueState::IntentCheck);
        let start = Instant::now();
        let verdict = self.intent.check_intent(&utterance, GOODBYE_INTENT)?;
        info!(
            stated_intent = %verdict.stated_intent,
            answer = %verdict.answer,
            goodbye = verdict.is_match(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Intent"
        );

        if verdict.is_match() {
            self.set_state(DialogueState::Farewell);
            self.commander.say(FAREWELL)?;
            return Ok(StepOutcome::Farewell);
        }

        self.set_state(DialogueState::Responding);
        let agent = self.roster.route(&classification);
        info!(agent = agent.name(), "Dispatching");

        let start = Instant::now();
        let reply = agent.generate(&utterance, &mut self.transcript, self.max_sentences)?;
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Generated");

        self.commander.say(&reply)?;
        self.turns += 1;

        self.set_state(DialogueState::Listening);
        Ok(StepOutcome::Continue)
    }

    /// Greet, then cycle until the customer says goodbye
    pub fn run(mut self) -> Result<SessionSummary> {
        let span = info_span!("session", id = %self.session_id);
        let _enter = span.enter();

        info!("Session started");
        self.greet()?;

        while self.step()? == StepOutcome::Continue {}

        self.commander.stop_listening()?;

        match self.transcript.to_json() {
            Ok(json) => debug!(transcript = %json, "Final transcript"),
            Err(e) => debug!("Could not serialize transcript: {}", e),
        }
        info!(turns = self.turns, "Session ended");

        Ok(SessionSummary {
            session_id: self.session_id,
            turns: self.turns,
            transcript: self.transcript,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::ChatRequest;

    struct Echo;

    impl ChatCompletion for Echo {
        fn complete(&self, request: &ChatRequest) -> Result<String> {
            Ok(request.messages[0].content.clone())
        }
    }

    #[test]
    fn test_roster_routing() {
        let roster = AgentRoster::new(&AgentConfig::default(), Arc::new(Echo));

        for category in Category::ALL {
            assert_eq!(roster.get(category).name(), category.as_str());
        }

        assert_eq!(roster.get(Category::Wood).system_prompt(), WOOD_PROMPT);
        assert_eq!(roster.route(&Classification::from_label("Payments")).name(), "Payments");
        assert_eq!(roster.route(&Classification::from_label("wood")).name(), "General");
        assert_eq!(roster.route(&Classification::from_label("")).name(), "General");
    }
}
