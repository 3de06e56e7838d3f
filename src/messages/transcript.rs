use super::types::{Message, Speaker};
use tracing::warn;

/// Ordered, append-only conversation log
///
/// Entries are never edited or reordered. The only ways to remove entries
/// are [`Transcript::clear`] and [`Transcript::replace`].
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, refusing blank user/assistant turns
    ///
    /// Returns `false` when the message was dropped.
    pub fn push(&mut self, message: Message) -> bool {
        if message.speaker != Speaker::System && message.text.trim().is_empty() {
            warn!("Dropping blank {} message", message.speaker);
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Swap in a whole new sequence (used when loading from disk)
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages
            .into_iter()
            .filter(|m| m.speaker == Speaker::System || !m.text.trim().is_empty())
            .collect();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Speaker/text pairs, the part of a message that survives persistence
    pub fn turns(&self) -> Vec<(Speaker, String)> {
        self.messages
            .iter()
            .map(|m| (m.speaker, m.text.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("one"));
        transcript.push(Message::assistant("two"));
        transcript.push(Message::status("three"));

        let texts: Vec<_> = transcript.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_blank_turns_are_dropped_but_blank_status_is_kept() {
        let mut transcript = Transcript::new();
        assert!(!transcript.push(Message::user("   ")));
        assert!(!transcript.push(Message::assistant("")));
        assert!(transcript.push(Message::status("")));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_replace_discards_previous_entries() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("old"));
        transcript.replace(vec![Message::assistant("new"), Message::user(" ")]);

        assert_eq!(transcript.turns(), vec![(Speaker::Assistant, "new".to_string())]);
    }
}
