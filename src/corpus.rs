//! Roast corpus: short flavor lines used to bias the prompt's tone.
//!
//! Built once at startup from a best-effort web scrape plus a fixed
//! fallback list, so it is never empty. Read-only afterwards.

use crate::error::CorpusFetchError;
use crate::persona::{fallback_roasts, FALLBACK_ROASTS, ROAST_KEYWORDS};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

/// At most this many scraped lines are kept.
pub const MAX_REMOTE_ENTRIES: usize = 100;

const BLOCK_SELECTOR: &str = "p, li, blockquote, h2, h3, h4";
const MIN_LINE_CHARS: usize = 20;
const MAX_LINE_CHARS: usize = 200;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; roastbot/0.1)";

/// Somewhere roast lines can be pulled from.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<String>, CorpusFetchError>;
}

/// Scrapes block elements from a list of pages.
pub struct WebCorpusSource {
    client: Client,
    urls: Vec<String>,
    timeout: Duration,
}

impl WebCorpusSource {
    pub fn new(urls: Vec<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            urls,
            timeout,
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<Vec<String>, CorpusFetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CorpusFetchError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CorpusFetchError::Status(response.status().as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CorpusFetchError::Http(e.to_string()))?;
        extract_candidates(&html)
    }
}

#[async_trait]
impl CorpusSource for WebCorpusSource {
    /// Pages that fail are logged and skipped; the result is whatever the
    /// remaining pages produced.
    async fn fetch(&self) -> Result<Vec<String>, CorpusFetchError> {
        let mut lines = Vec::new();
        for url in &self.urls {
            match self.fetch_page(url).await {
                Ok(found) => {
                    info!(url = %url, count = found.len(), "scraped roast lines");
                    lines.extend(found);
                }
                Err(e) => warn!(url = %url, error = %e, "corpus page fetch failed"),
            }
            if lines.len() >= MAX_REMOTE_ENTRIES {
                break;
            }
        }
        Ok(lines)
    }
}

/// Pull candidate roast lines out of an HTML page.
///
/// A candidate is the whitespace-normalised text of a block element, between
/// 20 and 200 characters long, that mentions at least one roast keyword.
pub fn extract_candidates(html: &str) -> Result<Vec<String>, CorpusFetchError> {
    let selector =
        Selector::parse(BLOCK_SELECTOR).map_err(|e| CorpusFetchError::Parse(e.to_string()))?;
    let document = Html::parse_document(html);

    let candidates = document
        .select(&selector)
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| {
            let len = text.chars().count();
            (MIN_LINE_CHARS..=MAX_LINE_CHARS).contains(&len)
        })
        .filter(|text| {
            let lower = text.to_lowercase();
            ROAST_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        })
        .collect();
    Ok(candidates)
}

/// Deduplicated pool of roast lines.
#[derive(Debug, Clone)]
pub struct Corpus {
    entries: Vec<String>,
}

impl Corpus {
    /// Fetch from `source` and merge with the fallback list. Never fails.
    pub async fn initialize(source: &dyn CorpusSource) -> Self {
        let remote = match source.fetch().await {
            Ok(lines) => lines,
            Err(e) => {
                warn!(error = %e, "corpus fetch failed, using fallback lines only");
                Vec::new()
            }
        };
        let remote_count = remote.len().min(MAX_REMOTE_ENTRIES);
        let corpus = Self::from_parts(remote, fallback_roasts());
        info!(
            remote = remote_count,
            total = corpus.len(),
            "roast corpus ready"
        );
        corpus
    }

    /// Union of `remote` (capped) and `fallback`, first occurrence wins.
    pub fn from_parts(remote: Vec<String>, fallback: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let entries = remote
            .into_iter()
            .take(MAX_REMOTE_ENTRIES)
            .chain(fallback)
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .filter(|line| seen.insert(line.clone()))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn sample(&self, count: usize) -> Vec<String> {
        self.sample_with(count, &mut rand::thread_rng())
    }

    /// `min(count, len)` distinct lines chosen uniformly without replacement.
    pub fn sample_with<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<String> {
        if self.entries.is_empty() {
            return FALLBACK_ROASTS
                .iter()
                .take(count)
                .map(|s| s.to_string())
                .collect();
        }
        self.entries
            .choose_multiple(rng, count.min(self.entries.len()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct FailingSource;

    #[async_trait]
    impl CorpusSource for FailingSource {
        async fn fetch(&self) -> Result<Vec<String>, CorpusFetchError> {
            Err(CorpusFetchError::Http("connection refused".into()))
        }
    }

    struct FixedSource(Vec<String>);

    #[async_trait]
    impl CorpusSource for FixedSource {
        async fn fetch(&self) -> Result<Vec<String>, CorpusFetchError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn failing_fetch_yields_exactly_the_fallback() {
        let corpus = Corpus::initialize(&FailingSource).await;
        assert_eq!(corpus.entries(), fallback_roasts().as_slice());
    }

    #[tokio::test]
    async fn empty_fetch_yields_exactly_the_fallback() {
        let corpus = Corpus::initialize(&FixedSource(Vec::new())).await;
        assert!(!corpus.is_empty());
        assert_eq!(corpus.entries(), fallback_roasts().as_slice());
    }

    #[tokio::test]
    async fn remote_lines_are_merged_and_deduplicated() {
        let remote = vec![
            "your brain has left the chat".to_string(),
            "your brain has left the chat".to_string(),
            FALLBACK_ROASTS[0].to_string(),
            "   ".to_string(),
        ];
        let corpus = Corpus::initialize(&FixedSource(remote)).await;
        assert_eq!(corpus.len(), FALLBACK_ROASTS.len() + 1);
        assert_eq!(corpus.entries()[0], "your brain has left the chat");
        for line in FALLBACK_ROASTS {
            assert!(corpus.entries().iter().any(|e| e == line));
        }
    }

    #[test]
    fn remote_contribution_is_capped() {
        let remote: Vec<String> = (0..500).map(|i| format!("roast number {i}")).collect();
        let corpus = Corpus::from_parts(remote, fallback_roasts());
        assert_eq!(corpus.len(), MAX_REMOTE_ENTRIES + FALLBACK_ROASTS.len());
    }

    #[test]
    fn sample_returns_distinct_members() {
        let corpus = Corpus::from_parts(Vec::new(), fallback_roasts());
        let mut rng = StdRng::seed_from_u64(42);
        for k in 0..12 {
            let picked = corpus.sample_with(k, &mut rng);
            assert_eq!(picked.len(), k.min(corpus.len()));
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), picked.len());
            assert!(picked.iter().all(|p| corpus.entries().contains(p)));
        }
    }

    #[test]
    fn repeated_single_samples_cover_the_corpus() {
        let corpus = Corpus::from_parts(Vec::new(), fallback_roasts());
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.extend(corpus.sample_with(1, &mut rng));
        }
        assert_eq!(seen.len(), corpus.len());
    }

    #[test]
    fn empty_corpus_samples_from_fallback_list() {
        let corpus = Corpus::from_parts(Vec::new(), Vec::new());
        assert!(corpus.is_empty());
        let picked = corpus.sample(3);
        assert_eq!(picked, fallback_roasts()[..3].to_vec());
    }

    #[test]
    fn extracts_keyword_blocks_of_reasonable_length() {
        let html = r#"
            <html><body>
              <h2>Best roasts</h2>
              <p>You're so   dumb you tripped over a wireless   network.</p>
              <ul>
                <li>Your face makes onions cry.</li>
                <li>ugly</li>
                <li>This paragraph is long enough but has no trigger words at all.</li>
              </ul>
              <blockquote>If brains were taxed you would get a <b>refund</b>.</blockquote>
              <p>Subscribe to our newsletter for more stupid content and weekly updates,
                 plus exclusive offers that nobody asked for and nobody will ever read,
                 because nobody reads newsletters, not even the people who write them.
                 Seriously, stop reading this, it is far too long to be a roast line.</p>
            </body></html>
        "#;
        let lines = extract_candidates(html).unwrap();
        assert_eq!(
            lines,
            vec![
                "You're so dumb you tripped over a wireless network.",
                "Your face makes onions cry.",
                "If brains were taxed you would get a refund.",
            ]
        );
    }
}
