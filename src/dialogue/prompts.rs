//! Prompt framings for panel generation calls.
//!
//! Every prompt opens with the respondent's persona and private context so
//! the generated voice stays in character across the whole run.

/// Warm-up framing used before the question is posed.
const INTRODUCTION: &str = "\n\nTake a moment to settle into character. In a few \
sentences, describe your current mood, what matters to you, and how you tend to \
react to new ideas.";

const QUESTION_PRE: &str = "\n\nYou are being asked the following question:\n";

const QUESTION_POST: &str = "\n\nAnswer in character. Give your full response, a \
short answer of 3-10 words summarizing your position, and an intensity from 0.0 \
to 1.0 for how strongly you hold this view.";

/// Warm-up prompt: persona plus the introduction framing.
pub fn introduction(persona: &str) -> String {
    format!("{persona}{INTRODUCTION}")
}

/// Structured question prompt, folding in the warm-up thought.
pub fn question(persona: &str, initial_thought: &str, question: &str) -> String {
    format!("{persona}{INTRODUCTION}{initial_thought}{QUESTION_PRE}{question}{QUESTION_POST}")
}

/// Opening remarks: the first speaker shares their view with the group.
pub fn opening_remarks(persona: &str, context: &str, question: &str) -> String {
    format!(
        "{persona}\n\n{context}\n\nThe question being discussed is: {question}\n\n\
You are now talking to other people about this question. Share your thoughts in \
a conversational way. Keep your response under 100 words."
    )
}

/// Reply to the immediately preceding turn.
pub fn reply(persona: &str, context: &str, question: &str) -> String {
    format!(
        "{persona}\n\n{context}\n\nThe question being discussed is: {question}\n\n\
You are replying to the previous person's comment. Share your thoughts in \
response. Keep your response under 100 words."
    )
}

/// Structured final reflection once the conversation has ended.
pub fn reflection(persona: &str, context: &str, question: &str) -> String {
    format!(
        "{persona}\n\n{context}\n\nThe question is: {question}\n\n\
After this conversation, what are your final thoughts on the question? Give \
your answer, your reasoning, and how strongly you now feel about it."
    )
}

/// Direct one-on-one exchange with a user.
pub fn direct(persona: &str, context: &str, name: &str, message: &str) -> String {
    format!(
        "{persona}\n\n{context}\n\nA user is asking you: {message}\n\n\
As {name}, respond directly to the user's question. Keep your response \
conversational and under 150 words."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_prompt_carries_all_parts() {
        let prompt = question("You are Ada.", "I feel curious.", "Should we build it?");
        assert!(prompt.starts_with("You are Ada."));
        assert!(prompt.contains("I feel curious."));
        assert!(prompt.contains("Should we build it?"));
        assert!(prompt.contains("0.0"));
    }

    #[test]
    fn test_reply_mentions_previous_comment() {
        let prompt = reply("persona", "context", "q");
        assert!(prompt.contains("previous person's comment"));
    }

    #[test]
    fn test_direct_addresses_the_user() {
        let prompt = direct("persona", "context", "Ada", "who are you?");
        assert!(prompt.contains("A user is asking you: who are you?"));
        assert!(prompt.contains("As Ada,"));
    }
}
