use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// Gateway-assigned conversation identifier (a Discord channel id).
pub type ConversationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Per-conversation bounded history, shared between the inbound handler and
/// the cadence broadcaster.
///
/// Each conversation keeps at most `cap` turns; the oldest are evicted first.
/// One lock guards the whole map, which is enough for the traffic a single
/// bot sees.
pub struct ConversationStore {
    cap: usize,
    conversations: Mutex<HashMap<ConversationId, VecDeque<Turn>>>,
}

impl ConversationStore {
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn append(&self, conversation: ConversationId, turn: Turn) {
        let mut conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let history = conversations.entry(conversation).or_default();
        history.push_back(turn);
        while history.len() > self.cap {
            history.pop_front();
        }
    }

    /// Last `k` turns in order, or fewer if the history is shorter.
    pub fn recent(&self, conversation: ConversationId, k: usize) -> Vec<Turn> {
        let conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match conversations.get(&conversation) {
            Some(history) => {
                let skip = history.len().saturating_sub(k);
                history.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Snapshot of the full history, creating an empty one if absent.
    pub fn get_or_create(&self, conversation: ConversationId) -> Vec<Turn> {
        let mut conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        conversations
            .entry(conversation)
            .or_default()
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self, conversation: ConversationId) -> usize {
        let conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        conversations.get(&conversation).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, conversation: ConversationId) -> bool {
        self.len(conversation) == 0
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
