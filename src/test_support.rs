//! Test doubles for the completion service and the chat gateway.

use crate::completion::{CompletionGateway, CompletionRequest};
use crate::discord::ChatSink;
use crate::error::{CompletionError, EmitError};
use crate::history::ConversationId;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn test_tokens() -> Vec<String> {
    ["<:fire:1>", "<:fish:2>", "<a:skull_dancing_gif:3>", "<:nerd:4>"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Answers with queued results, then with `Unknown` once the queue is empty.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Unknown("script exhausted".into())))
    }
}

/// Records every send; optionally fails all of them.
pub struct RecordingSink {
    sent: Mutex<Vec<(ConversationId, String)>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<(ConversationId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn send(&self, conversation: ConversationId, text: &str) -> Result<(), EmitError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmitError {
                conversation,
                reason: "Unknown Channel".into(),
            });
        }
        self.sent.lock().unwrap().push((conversation, text.to_string()));
        Ok(())
    }
}
