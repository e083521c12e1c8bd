use axum::{extract::State, routing::get, Json, Router};
use dotenv::dotenv;
use roastbot::broadcaster::CadenceBroadcaster;
use roastbot::completion::CompletionClient;
use roastbot::config::Config;
use roastbot::corpus::{Corpus, WebCorpusSource};
use roastbot::decorate::Decorator;
use roastbot::discord::{DiscordService, Handler};
use roastbot::dispatch::Dispatcher;
use roastbot::history::ConversationStore;
use serde::Serialize;
use serenity::all::{Client, GatewayIntents};
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    store: Arc<ConversationStore>,
    corpus_size: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    conversations: usize,
    corpus_size: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn StdError + Send + Sync>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let settings = config.settings.clone();

    let source = WebCorpusSource::new(config.corpus_urls.clone(), config.corpus_timeout);
    let corpus = Arc::new(Corpus::initialize(&source).await);

    let store = Arc::new(ConversationStore::new(settings.history_cap));
    let decorator = Arc::new(Decorator::from_catalogue(settings.decoration.clone()));
    let discord = Arc::new(DiscordService::new(&config.discord_token));
    let gateway = Arc::new(CompletionClient::new(
        &config.llm_endpoint,
        &config.llm_api_key,
        config.llm_timeout,
    ));

    let (last_active_tx, last_active_rx) = watch::channel(None);
    let dispatcher = Arc::new(Dispatcher::new(
        gateway,
        discord.clone(),
        store.clone(),
        corpus.clone(),
        decorator.clone(),
        settings.clone(),
        last_active_tx,
    ));

    let cancel = CancellationToken::new();
    let broadcaster = CadenceBroadcaster::new(
        discord,
        decorator,
        last_active_rx,
        settings.cadence_phrase.clone(),
        settings.cadence_interval,
        cancel.child_token(),
    );
    let broadcaster_task = tokio::spawn(broadcaster.run());

    let state = AppState {
        store,
        corpus_size: corpus.len(),
    };
    let app = Router::new()
        .route("/", get(handle_health))
        .route("/health", get(handle_health))
        .with_state(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "health endpoint listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "health endpoint stopped");
        }
    });

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler::new(dispatcher))
        .await?;

    let shard_manager = client.shard_manager.clone();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("shutting down");
        shutdown.cancel();
        shard_manager.shutdown_all().await;
    });

    if let Err(e) = client.start().await {
        error!(error = %e, "Discord client stopped");
    }

    cancel.cancel();
    if let Err(e) = broadcaster_task.await {
        error!(error = %e, "cadence broadcaster task failed");
    }
    Ok(())
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive",
        conversations: state.store.conversation_count(),
        corpus_size: state.corpus_size,
    })
}
