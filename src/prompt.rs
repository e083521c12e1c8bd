use crate::history::Turn;
use crate::persona::STYLE_HINT_PREFIX;

/// Build the message list for one completion call:
/// the system instructions, a style hint cut to `hint_chars`, then the
/// conversation tail as given.
pub fn compose(
    system_instructions: &str,
    flavor_sample: &str,
    history_tail: &[Turn],
    hint_chars: usize,
) -> Vec<Turn> {
    let hint: String = flavor_sample.chars().take(hint_chars).collect();

    let mut messages = Vec::with_capacity(history_tail.len() + 2);
    messages.push(Turn::system(system_instructions));
    messages.push(Turn::system(format!("{}{}", STYLE_HINT_PREFIX, hint)));
    messages.extend_from_slice(history_tail);
    messages
}
