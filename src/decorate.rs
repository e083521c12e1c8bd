use crate::config::DecorationPolicy;
use crate::emoji;
use rand::seq::SliceRandom;
use rand::Rng;

const ELLIPSIS: &str = "...";

/// Places catalogue emoji into outgoing text.
///
/// The group of tokens is chosen fresh for every call. The base text is
/// shortened first when needed, so the decorated result always fits in
/// `policy.max_chars` without cutting a token in half.
pub struct Decorator {
    tokens: Vec<String>,
    policy: DecorationPolicy,
}

impl Decorator {
    pub fn new(tokens: Vec<String>, policy: DecorationPolicy) -> Self {
        Self { tokens, policy }
    }

    pub fn from_catalogue(policy: DecorationPolicy) -> Self {
        Self::new(emoji::rendered_tokens(), policy)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn policy(&self) -> &DecorationPolicy {
        &self.policy
    }

    /// Between `min_tokens` and `max_tokens` distinct tokens, fewer only if
    /// the catalogue itself is smaller.
    pub fn pick_tokens<R: Rng>(&self, rng: &mut R) -> Vec<&str> {
        if self.tokens.is_empty() {
            return Vec::new();
        }
        let low = self.policy.min_tokens.max(1);
        let wanted = rng.gen_range(low..=self.policy.max_tokens.max(low));
        self.tokens
            .choose_multiple(rng, wanted.min(self.tokens.len()))
            .map(String::as_str)
            .collect()
    }

    pub fn decorate(&self, text: &str) -> String {
        self.decorate_with(text, &mut rand::thread_rng())
    }

    /// Append the group, or splice it into the second half of the words.
    pub fn decorate_with<R: Rng>(&self, text: &str, rng: &mut R) -> String {
        let picked = self.pick_tokens(rng);
        if picked.is_empty() {
            return truncate_with_ellipsis(text, self.policy.max_chars);
        }
        let group = picked.join(" ");
        let text = self.fit_base(text, &group);

        let words: Vec<&str> = text.split_whitespace().collect();
        let append =
            words.len() < self.policy.short_text_words || rng.gen_bool(self.policy.append_probability);
        if append || words.is_empty() {
            return join_group(&text, &group);
        }

        let insert_at = rng.gen_range(words.len() / 2..words.len());
        let mut spliced = words;
        spliced.insert(insert_at, &group);
        spliced.join(" ")
    }

    /// Always append; used for the cadence phrase.
    pub fn append_with<R: Rng>(&self, text: &str, rng: &mut R) -> String {
        let picked = self.pick_tokens(rng);
        if picked.is_empty() {
            return truncate_with_ellipsis(text, self.policy.max_chars);
        }
        let group = picked.join(" ");
        join_group(&self.fit_base(text, &group), &group)
    }

    fn fit_base(&self, text: &str, group: &str) -> String {
        let budget = self
            .policy
            .max_chars
            .saturating_sub(group.chars().count() + 1);
        truncate_with_ellipsis(text, budget)
    }
}

fn join_group(text: &str, group: &str) -> String {
    if text.trim().is_empty() {
        group.to_string()
    } else {
        format!("{} {}", text.trim_end(), group)
    }
}

/// Cut `text` to at most `limit` characters, marking the cut with `...`.
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    if keep == 0 {
        return String::new();
    }
    let head: String = text.chars().take(keep).collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}
