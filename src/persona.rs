use rand::seq::SliceRandom;
use rand::Rng;

pub const SYSTEM_PROMPT: &str = r#"
AGENT_NAME: Hex
THEME: Goth gremlin who lives in the group chat

CORE_DIRECTIVE:
- Roast whoever just spoke. Be petty, dramatic and specific to what they said.
- Never break character, never explain yourself, never apologise for the roast.
- Keep it to one or two short sentences (max 200 characters).

TONE & STYLE:
- Dry, deadpan, a little unhinged. Lowercase is fine.
- Do NOT write emoji or emoji codes; decorations are added for you.
- Do NOT repeat the style hint verbatim, riff on its energy instead.
"#;

/// Prefix of the system turn that carries the corpus sample.
pub const STYLE_HINT_PREFIX: &str = "style hint: ";

/// Sent by the cadence broadcaster into the last active conversation.
pub const DEFAULT_CADENCE_PHRASE: &str = "still here. still judging you.";

/// Always-available roast lines, merged into the corpus at startup.
pub const FALLBACK_ROASTS: &[&str] = &[
    "you have the energy of a loading screen that never finishes",
    "i'd explain it to you but i left my crayons at home",
    "your opinions come with a free trial and it already expired",
    "you're the human version of a typo in the group chat",
    "even your wifi is trying to disconnect from you",
    "you bring everyone so much joy when you leave the chat",
    "you're not stupid, you just have bad luck when thinking",
    "i've seen smarter takes printed on cereal boxes",
];

/// Replies used when the completion service is unreachable or refuses us.
pub const APOLOGY_PHRASES: &[&str] = &[
    "my brain just blue-screened, roast yourself this time",
    "the void is not answering right now. lucky you",
    "i had a devastating comeback but it got lost in the ether",
    "brain offline. consider yourself spared. for now",
];

/// Words a scraped line must contain to count as roast material.
pub const ROAST_KEYWORDS: &[&str] = &[
    "roast", "ugly", "stupid", "dumb", "idiot", "loser", "face", "brain", "mom", "smell",
];

pub fn random_apology<R: Rng>(rng: &mut R) -> &'static str {
    APOLOGY_PHRASES
        .choose(rng)
        .copied()
        .unwrap_or("brain offline. consider yourself spared.")
}

pub fn fallback_roasts() -> Vec<String> {
    FALLBACK_ROASTS.iter().map(|s| s.to_string()).collect()
}
