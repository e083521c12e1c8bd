use crate::error::ConfigError;
use crate::persona::{DEFAULT_CADENCE_PHRASE, SYSTEM_PROMPT};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

const DEFAULT_CORPUS_URLS: &[&str] = &[
    "https://www.rd.com/article/funny-roasts/",
    "https://parade.com/1147834/marynliles/roast-jokes/",
];

/// How decoration tokens are chosen and where they go.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationPolicy {
    pub min_tokens: usize,
    pub max_tokens: usize,
    /// Chance of appending the token group instead of splicing it in.
    pub append_probability: f64,
    /// Texts with fewer words than this always get the group appended.
    pub short_text_words: usize,
    pub max_chars: usize,
}

impl Default for DecorationPolicy {
    fn default() -> Self {
        Self {
            min_tokens: 1,
            max_tokens: 3,
            append_probability: 0.5,
            short_text_words: 4,
            max_chars: 500,
        }
    }
}

/// Tunables for the reply pipeline and the cadence loop.
#[derive(Debug, Clone, PartialEq)]
pub struct BotSettings {
    pub system_prompt: String,
    /// Turns kept per conversation.
    pub history_cap: usize,
    /// Turns sent with each completion request. Independent of `history_cap`.
    pub prompt_window: usize,
    pub style_hint_chars: usize,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub decoration: DecorationPolicy,
    pub cadence_interval: Duration,
    pub cadence_phrase: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.trim().to_string(),
            history_cap: 10,
            prompt_window: 6,
            style_hint_chars: 150,
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: 0.9,
            max_tokens: 120,
            top_p: 0.95,
            decoration: DecorationPolicy::default(),
            cadence_interval: Duration::from_secs(60),
            cadence_phrase: DEFAULT_CADENCE_PHRASE.to_string(),
        }
    }
}

pub struct Config {
    pub discord_token: String,
    pub llm_endpoint: String,
    pub llm_api_key: String,
    pub llm_timeout: Duration,
    pub corpus_urls: Vec<String>,
    pub corpus_timeout: Duration,
    pub http_port: u16,
    pub settings: BotSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let llm_api_key = get("LLM_API_KEY").ok_or(ConfigError::Missing("LLM_API_KEY"))?;
        let llm_endpoint = get("LLM_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_LLM_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        let defaults = BotSettings::default();
        let decoration = DecorationPolicy {
            min_tokens: parse_or(&get, "DECORATION_MIN", defaults.decoration.min_tokens)?,
            max_tokens: parse_or(&get, "DECORATION_MAX", defaults.decoration.max_tokens)?,
            append_probability: parse_or(
                &get,
                "DECORATION_APPEND_PROBABILITY",
                defaults.decoration.append_probability,
            )?,
            short_text_words: defaults.decoration.short_text_words,
            max_chars: parse_or(&get, "MAX_REPLY_CHARS", defaults.decoration.max_chars)?,
        };

        let settings = BotSettings {
            system_prompt: get("SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            history_cap: parse_or(&get, "HISTORY_CAP", defaults.history_cap)?,
            prompt_window: parse_or(&get, "PROMPT_WINDOW", defaults.prompt_window)?,
            style_hint_chars: parse_or(&get, "STYLE_HINT_CHARS", defaults.style_hint_chars)?,
            model: get("LLM_MODEL").unwrap_or(defaults.model),
            temperature: parse_or(&get, "LLM_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(&get, "LLM_MAX_TOKENS", defaults.max_tokens)?,
            top_p: parse_or(&get, "LLM_TOP_P", defaults.top_p)?,
            decoration,
            cadence_interval: Duration::from_secs(parse_or(
                &get,
                "CADENCE_INTERVAL_SECS",
                defaults.cadence_interval.as_secs(),
            )?),
            cadence_phrase: get("CADENCE_PHRASE").unwrap_or(defaults.cadence_phrase),
        };
        validate(&settings)?;

        let corpus_urls = match get("CORPUS_URLS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORPUS_URLS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            discord_token,
            llm_endpoint,
            llm_api_key,
            llm_timeout: Duration::from_secs(parse_or(&get, "LLM_TIMEOUT_SECS", 30)?),
            corpus_urls,
            corpus_timeout: Duration::from_secs(parse_or(&get, "CORPUS_FETCH_TIMEOUT_SECS", 10)?),
            http_port: parse_or(&get, "PORT", 8080)?,
            settings,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn invalid(key: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

// Longest token in the catalogue is well under 64 characters.
const MIN_REPLY_CHARS_PER_TOKEN: usize = 64;

fn validate(settings: &BotSettings) -> Result<(), ConfigError> {
    let decoration = &settings.decoration;
    if settings.history_cap == 0 {
        return Err(invalid("HISTORY_CAP", 0, "must be at least 1"));
    }
    if decoration.min_tokens == 0 {
        return Err(invalid("DECORATION_MIN", 0, "must be at least 1"));
    }
    if decoration.min_tokens > decoration.max_tokens {
        return Err(invalid(
            "DECORATION_MAX",
            decoration.max_tokens,
            "must not be smaller than DECORATION_MIN",
        ));
    }
    if !(0.0..=1.0).contains(&decoration.append_probability) {
        return Err(invalid(
            "DECORATION_APPEND_PROBABILITY",
            decoration.append_probability,
            "must be between 0 and 1",
        ));
    }
    if decoration.max_chars < decoration.max_tokens * MIN_REPLY_CHARS_PER_TOKEN {
        return Err(invalid(
            "MAX_REPLY_CHARS",
            decoration.max_chars,
            "too small to hold a full decoration group",
        ));
    }
    Ok(())
}
