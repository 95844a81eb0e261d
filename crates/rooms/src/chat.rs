/// Chat message sequencing
///
/// Assigns the per-room monotonic message id. Messages are not retained:
/// chat history does not outlive the room, and fan-out happens at acceptance
/// time in the room actor.
use lockstep_core::{validate_chat_message, Result};

#[derive(Debug, Default)]
pub struct ChatLog {
    next_id: u64,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the text and assign the next message id.
    ///
    /// Returns the id and the trimmed text on success; ids start at 1 and
    /// increase strictly in acceptance order.
    pub fn accept(&mut self, text: &str, max_len: usize) -> Result<(u64, String)> {
        let text = validate_chat_message(text, max_len)?;
        self.next_id += 1;
        Ok((self.next_id, text))
    }

    pub fn accepted_count(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let mut log = ChatLog::new();
        let (a, _) = log.accept("one", 500).unwrap();
        let (b, _) = log.accept("two", 500).unwrap();
        let (c, _) = log.accept("three", 500).unwrap();
        assert!(a < b && b < c);
        assert_eq!(a, 1);
        assert_eq!(log.accepted_count(), 3);
    }

    #[test]
    fn test_rejected_messages_consume_no_id() {
        let mut log = ChatLog::new();
        assert!(log.accept("   ", 500).is_err());
        assert!(log.accept(&"x".repeat(501), 500).is_err());

        let (id, _) = log.accept("ok", 500).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_text_is_trimmed() {
        let mut log = ChatLog::new();
        let (_, text) = log.accept("  hello  ", 500).unwrap();
        assert_eq!(text, "hello");
    }
}
