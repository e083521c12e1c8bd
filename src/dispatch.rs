use crate::completion::{CompletionGateway, CompletionRequest};
use crate::config::BotSettings;
use crate::corpus::Corpus;
use crate::decorate::Decorator;
use crate::discord::ChatSink;
use crate::error::CompletionError;
use crate::history::{ConversationId, ConversationStore, Turn};
use crate::persona;
use crate::prompt;
use crate::sanitize::sanitize;
use rand::Rng;
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// One message delivered by the chat gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub conversation_id: ConversationId,
    pub author_id: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Authored by the bot itself, or the bot's id is not known yet.
    Ignored,
    Replied,
    /// The completion failed with the given error kind; a fallback was sent.
    FallbackSent(&'static str),
    EmitFailed,
}

/// Per-message pipeline: record, compose, complete, clean up, reply.
///
/// Every inbound message from someone else produces exactly one send
/// attempt. Completion failures turn into a fallback reply and leave the
/// history without an assistant turn.
pub struct Dispatcher {
    gateway: Arc<dyn CompletionGateway>,
    sink: Arc<dyn ChatSink>,
    store: Arc<ConversationStore>,
    corpus: Arc<Corpus>,
    decorator: Arc<Decorator>,
    settings: BotSettings,
    last_active: watch::Sender<Option<ConversationId>>,
    self_id: OnceLock<u64>,
}

impl Dispatcher {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        sink: Arc<dyn ChatSink>,
        store: Arc<ConversationStore>,
        corpus: Arc<Corpus>,
        decorator: Arc<Decorator>,
        settings: BotSettings,
        last_active: watch::Sender<Option<ConversationId>>,
    ) -> Self {
        Self {
            gateway,
            sink,
            store,
            corpus,
            decorator,
            settings,
            last_active,
            self_id: OnceLock::new(),
        }
    }

    /// Record the bot's own user id. Later calls are ignored.
    pub fn set_self_id(&self, id: u64) {
        if self.self_id.set(id).is_err() {
            debug!(id, "self id already set");
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn subscribe_last_active(&self) -> watch::Receiver<Option<ConversationId>> {
        self.last_active.subscribe()
    }

    pub async fn handle(&self, message: InboundMessage) -> DispatchOutcome {
        match self.self_id.get() {
            Some(&id) if id != message.author_id => {}
            Some(_) => {
                debug!(conversation = message.conversation_id, "ignoring own message");
                return DispatchOutcome::Ignored;
            }
            None => {
                debug!("ignoring message, self id not known yet");
                return DispatchOutcome::Ignored;
            }
        }

        let conversation = message.conversation_id;
        self.last_active.send_replace(Some(conversation));
        self.store.append(conversation, Turn::user(message.text));

        let request = self.build_request(conversation, &mut rand::thread_rng());

        let (reply, outcome) = match self.gateway.complete(&request).await {
            Ok(raw) => {
                let reply = self
                    .decorator
                    .decorate_with(&sanitize(&raw), &mut rand::thread_rng());
                self.store.append(conversation, Turn::assistant(reply.clone()));
                (reply, DispatchOutcome::Replied)
            }
            Err(e) => {
                warn!(conversation, kind = e.kind(), error = %e, "completion failed, sending fallback");
                let reply = self.fallback_reply(&e, &mut rand::thread_rng());
                (reply, DispatchOutcome::FallbackSent(e.kind()))
            }
        };

        match self.sink.send(conversation, &reply).await {
            Ok(()) => {
                info!(conversation, reply = %reply, "reply sent");
                outcome
            }
            Err(e) => {
                error!(conversation, error = %e, "failed to send reply");
                DispatchOutcome::EmitFailed
            }
        }
    }

    fn build_request<R: Rng>(&self, conversation: ConversationId, rng: &mut R) -> CompletionRequest {
        let flavor = self
            .corpus
            .sample_with(1, rng)
            .into_iter()
            .next()
            .unwrap_or_default();
        let tail = self.store.recent(conversation, self.settings.prompt_window);

        CompletionRequest {
            messages: prompt::compose(
                &self.settings.system_prompt,
                &flavor,
                &tail,
                self.settings.style_hint_chars,
            ),
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            top_p: self.settings.top_p,
        }
    }

    /// Rate limits and network trouble get a corpus roast; anything that
    /// needs an operator gets an apology.
    fn fallback_reply<R: Rng>(&self, err: &CompletionError, rng: &mut R) -> String {
        let base = match err {
            CompletionError::RateLimit(_) | CompletionError::Transport(_) => self
                .corpus
                .sample_with(1, rng)
                .into_iter()
                .next()
                .unwrap_or_else(|| persona::random_apology(rng).to_string()),
            CompletionError::Auth(_) | CompletionError::Model(_) | CompletionError::Unknown(_) => {
                persona::random_apology(rng).to_string()
            }
        };
        self.decorator.decorate_with(&sanitize(&base), rng)
    }
}
