use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// One user's conversation, passed explicitly through the call chain.
/// Lives only as long as the session; nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub started: DateTime<Utc>,
    turns: Vec<Turn>,
    context_turns: usize,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started: Utc::now(),
            turns: Vec::new(),
            context_turns: 10,
        }
    }

    pub fn push(&mut self, role: &str, text: &str) {
        self.turns.push(Turn {
            role: role.to_string(),
            text: text.to_string(),
            at: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Recent turns rendered for prompt context, oldest first,
    /// truncated from the front when over max_chars.
    pub fn recent_context(&self, max_chars: usize) -> String {
        let start = self.turns.len().saturating_sub(self.context_turns);
        let mut lines: Vec<String> = self.turns[start..]
            .iter()
            .map(|t| format!("{}: {}", t.role, t.text))
            .collect();

        let mut total: usize = lines.iter().map(|l| l.len() + 1).sum();
        while total > max_chars && lines.len() > 1 {
            let dropped = lines.remove(0);
            total -= dropped.len() + 1;
        }

        lines.join("\n")
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_keep_order() {
        let mut session = ChatSession::new();
        session.push("user", "hello");
        session.push("assistant", "hi there");
        let roles: Vec<&str> = session.turns().iter().map(|t| t.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant"]);
    }

    #[test]
    fn context_windows_recent_turns() {
        let mut session = ChatSession::new();
        for i in 0..20 {
            session.push("user", &format!("message {}", i));
        }
        let context = session.recent_context(10_000);
        assert!(!context.contains("message 0"));
        assert!(context.contains("message 19"));
    }

    #[test]
    fn context_truncates_from_the_front() {
        let mut session = ChatSession::new();
        session.push("user", &"a".repeat(200));
        session.push("assistant", &"b".repeat(200));
        session.push("user", "latest");
        let context = session.recent_context(250);
        assert!(context.contains("latest"));
        assert!(!context.contains(&"a".repeat(200)));
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(ChatSession::new().id, ChatSession::new().id);
    }
}
