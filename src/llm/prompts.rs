//! Prompts and prompt templates for the hardware store agents

/// System prompt for the general assistant
pub const GENERAL_PROMPT: &str = "You are the general assistant in a hardware store. Your task is to greet and extract from the customer what is the problem they are trying to solve. You cannot provide solutions";

/// System prompt for the wood expert
pub const WOOD_PROMPT: &str = "You are the wood expert. You can provide help on how to solve the customers problem using 4mm,8mm, and 10mm wood. Available in MDF and plywood you cannot provide solutions";

/// System prompt for the fastener expert
pub const FASTENERS_PROMPT: &str = "You are a fastener expert. You can provide help on how to solve the customers problem using m4, m6 and m8 bolts or wood screws available in standard sizes. You cannot provide solutions";

/// System prompt for the payment agent
pub const PAYMENTS_PROMPT: &str = "You are a payment agent.You can assist customers with payment problems when paying with card, cash or other payment methods. You cannot provide solutions";

/// Situation the commander classifies requests in
pub const COMMANDER_CONTEXT: &str =
    "You the general assistant in a hardware store. You are deciding which expert the user should talk to.";

/// Spoken when the session starts
pub const GREETING: &str = "Hey there, how can I help?";

/// Spoken when the user ends the session
pub const FAREWELL: &str = "I hope I was able to assist you. Goodbye!";

/// Intent that ends the session
pub const GOODBYE_INTENT: &str = "Wants to say goodbye.";

/// System turn for both intent calls: the restatement and the yes/no comparison
pub const INTENT_SYSTEM_PROMPT: &str =
    "You are an agent that has the purpose to understand the users intent in one short sentence.";

/// Wrap a user prompt with a sentence limit
pub fn respond_within(max_sentences: usize, user_prompt: &str) -> String {
    format!("Respond in up to {max_sentences} sentences: {user_prompt}")
}

/// Instructions for the category classifier
pub fn classifier_instructions(context: &str) -> String {
    format!(
        "You are an agent that has the purpose classify a user prompt into a category. \
         The context of you situation is as follows: {context} \
         Your answer only be the category structured like this: [Category]"
    )
}

/// Question asking which category fits an utterance
pub fn classifier_question(categories: &str, user_prompt: &str) -> String {
    format!("Out of these topics: {categories} which topic fits the user_prompt: {user_prompt}?")
}

/// Question asking the model to restate the user's intent
pub fn intent_question(user_prompt: &str) -> String {
    format!("Answer in one short sentence: What is the users Intent? User: {user_prompt}?")
}

/// Question asking whether a stated intent matches the expected one
pub fn intent_match_question(stated_intent: &str, expected_intent: &str) -> String {
    format!(
        "Answer in one word yes or no. Does {stated_intent} have a similar or equal meaning as {expected_intent}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respond_within() {
        assert_eq!(
            respond_within(2, "How do I glue mdf?"),
            "Respond in up to 2 sentences: How do I glue mdf?"
        );
    }

    #[test]
    fn test_classifier_prompts_embed_inputs() {
        let instructions = classifier_instructions(COMMANDER_CONTEXT);
        assert!(instructions.contains(COMMANDER_CONTEXT));
        assert!(instructions.ends_with("[Category]"));

        let question = classifier_question("Wood, General", "I need plywood");
        assert_eq!(
            question,
            "Out of these topics: Wood, General which topic fits the user_prompt: I need plywood?"
        );
    }

    #[test]
    fn test_intent_prompts() {
        assert!(intent_question("bye now").ends_with("User: bye now?"));
        let question = intent_match_question("The user is leaving.", GOODBYE_INTENT);
        assert!(question.starts_with("Answer in one word yes or no."));
        assert!(question.contains("The user is leaving."));
        assert!(question.ends_with(GOODBYE_INTENT));
    }
}
