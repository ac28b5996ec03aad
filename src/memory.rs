use std::collections::HashMap;

use crate::chat::Turn;

/// Conversational memory, keyed by an opaque per-session id.
pub trait MemoryStore {
    /// Turns recorded for a session, oldest first
    fn get(&self, session_id: &str) -> Vec<Turn>;

    fn append(&mut self, session_id: &str, turn: Turn);

    fn clear(&mut self, session_id: &str);
}

/// Process-local memory; nothing survives a restart
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sessions: HashMap<String, Vec<Turn>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore for InMemoryStore {
    fn get(&self, session_id: &str) -> Vec<Turn> {
        self.sessions.get(session_id).cloned().unwrap_or_default()
    }

    fn append(&mut self, session_id: &str, turn: Turn) {
        self.sessions.entry(session_id.to_string()).or_default().push(turn);
    }

    fn clear(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(q: &str) -> Turn {
        Turn {
            question: q.to_string(),
            input: q.to_string(),
            answer: format!("answer to {q}"),
        }
    }

    #[test]
    fn test_append_and_get_in_order() {
        let mut store = InMemoryStore::new();
        store.append("s1", turn("first"));
        store.append("s1", turn("second"));

        let history = store.get("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].question, "first");
        assert_eq!(history[1].question, "second");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut store = InMemoryStore::new();
        store.append("s1", turn("mine"));
        assert!(store.get("s2").is_empty());

        store.clear("s2");
        assert_eq!(store.get("s1").len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut store = InMemoryStore::new();
        store.append("s1", turn("gone"));
        store.clear("s1");
        assert!(store.get("s1").is_empty());
    }
}
