//! Termination predicates deciding whether a message ends a conversation.

use crate::agent::ChatMessage;

/// Marker the sessions' prompts ask agents to emit when they are done.
pub const TERMINATE: &str = "TERMINATE";

/// A pure predicate over a received message.
pub trait TerminationCondition: Send + Sync {
    /// Whether `message` ends the conversation.
    fn is_termination(&self, message: &ChatMessage) -> bool;
}

impl<F> TerminationCondition for F
where
    F: Fn(&ChatMessage) -> bool + Send + Sync,
{
    fn is_termination(&self, message: &ChatMessage) -> bool {
        self(message)
    }
}

/// Terminates when the content contains `TERMINATE` anywhere (case-sensitive).
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsTerminate;

impl TerminationCondition for ContainsTerminate {
    fn is_termination(&self, message: &ChatMessage) -> bool {
        message.content().contains(TERMINATE)
    }
}

/// Terminates when the right-trimmed content ends with `TERMINATE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndsWithTerminate;

impl TerminationCondition for EndsWithTerminate {
    fn is_termination(&self, message: &ChatMessage) -> bool {
        message.content().trim_end().ends_with(TERMINATE)
    }
}

/// Terminates only when the whole content is `TERMINATE`.
///
/// Agents that configure nothing else use this.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactTerminate;

impl TerminationCondition for ExactTerminate {
    fn is_termination(&self, message: &ChatMessage) -> bool {
        message.content() == TERMINATE
    }
}

/// Terminates on a custom substring.
#[derive(Debug, Clone)]
pub struct ContainsText {
    pattern: String,
}

impl ContainsText {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl TerminationCondition for ContainsText {
    fn is_termination(&self, message: &ChatMessage) -> bool {
        message.content().contains(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> ChatMessage {
        ChatMessage::text("Maria", "Joseph", text)
    }

    #[test]
    fn contains_terminate_anywhere() {
        assert!(ContainsTerminate.is_termination(&msg("TERMINATE")));
        assert!(ContainsTerminate.is_termination(&msg("Nice to meet you. TERMINATE")));
        assert!(ContainsTerminate.is_termination(&msg("TERMINATE now, please")));
        assert!(!ContainsTerminate.is_termination(&msg("Hi, I'm Maria.")));
        assert!(!ContainsTerminate.is_termination(&msg("terminate")));
    }

    #[test]
    fn ends_with_terminate_ignores_trailing_whitespace() {
        assert!(EndsWithTerminate.is_termination(&msg("Done.\nTERMINATE \n")));
        assert!(!EndsWithTerminate.is_termination(&msg("TERMINATE is what I will say later")));
    }

    #[test]
    fn exact_terminate() {
        assert!(ExactTerminate.is_termination(&msg("TERMINATE")));
        assert!(!ExactTerminate.is_termination(&msg("ok TERMINATE")));
    }

    #[test]
    fn closures_are_conditions() {
        let thanks = |m: &ChatMessage| m.content().contains("Thank you");
        assert!(thanks.is_termination(&msg("Thank you!")));
        assert!(ContainsText::new("Thank you").is_termination(&msg("Thank you!")));
        assert!(!ContainsText::new("Thank you").is_termination(&msg("thanks")));
    }
}
