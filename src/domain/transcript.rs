use super::Message;

/// Ordered, append-only log of turns for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    turns: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.turns.push(message);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    /// The most recent `count` turns, oldest first.
    pub fn last(&self, count: usize) -> &[Message] {
        let start = self.turns.len().saturating_sub(count);
        &self.turns[start..]
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_more_turns_than_window_when_taking_last_then_returns_newest_in_order() {
        let mut transcript = Transcript::new();
        for i in 0..12 {
            transcript.push(Message::user(format!("turn {i}")));
        }

        let window = transcript.last(10);

        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "turn 2");
        assert_eq!(window[9].content, "turn 11");
    }

    #[test]
    fn given_fewer_turns_than_window_when_taking_last_then_returns_all() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("only"));

        assert_eq!(transcript.last(10).len(), 1);
        assert!(Transcript::new().last(10).is_empty());
    }
}
