use crate::dispatch::{Dispatcher, InboundMessage};
use crate::error::EmitError;
use crate::history::ConversationId;
use async_trait::async_trait;
use serenity::all::{ChannelId, Context, CreateMessage, EventHandler, Http, Message, Ready};
use std::sync::Arc;
use tracing::{error, info};

/// Outbound half of the chat gateway.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send(&self, conversation: ConversationId, text: &str) -> Result<(), EmitError>;
}

/// Posts into Discord channels over the REST API.
pub struct DiscordService {
    http: Arc<Http>,
}

impl DiscordService {
    pub fn new(token: &str) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
        }
    }
}

#[async_trait]
impl ChatSink for DiscordService {
    async fn send(&self, conversation: ConversationId, text: &str) -> Result<(), EmitError> {
        let builder = CreateMessage::new().content(text);
        ChannelId::new(conversation)
            .send_message(&self.http, builder)
            .await
            .map(|_| ())
            .map_err(|e| EmitError {
                conversation,
                reason: e.to_string(),
            })
    }
}

/// Inbound half: forwards gateway events to the dispatcher.
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
}

impl Handler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[serenity::async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.dispatcher.set_self_id(ready.user.id.get());
        info!(user = %ready.user.name, id = %ready.user.id, "connected to Discord");
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let inbound = InboundMessage {
            conversation_id: msg.channel_id.get(),
            author_id: msg.author.id.get(),
            text: msg.content,
        };
        let conversation = inbound.conversation_id;

        // A panic while handling one message must not take the shard down.
        let dispatcher = Arc::clone(&self.dispatcher);
        let task = tokio::spawn(async move { dispatcher.handle(inbound).await });
        if let Err(e) = task.await {
            error!(conversation, error = %e, "message dispatch aborted");
        }
    }
}
