//! Keyword rule tables for title scanning.
//!
//! A [`Lexicon`] is a list of lowercase terms plus a matching rule. The
//! social adapter consults a [`LexiconSet`] so the detection rules can be
//! swapped through configuration without touching any scoring code.

use crate::config::{LexiconConfig, MatcherKind};

/// A normalized term list with its matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    terms: Vec<String>,
    matcher: MatcherKind,
}

impl Lexicon {
    /// Build a lexicon. Terms are trimmed and lowercased; blank terms are
    /// dropped. Whole-word terms are reduced to their words, so a term with
    /// no alphanumeric content is dropped too.
    pub fn new<I, S>(terms: I, matcher: MatcherKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| {
                let term = t.as_ref().trim().to_lowercase();
                match matcher {
                    MatcherKind::Substring => term,
                    MatcherKind::WholeWord => word_padded_inner(&term),
                }
            })
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms, matcher }
    }

    /// Whether any term matches the text.
    pub fn matches(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        match self.matcher {
            MatcherKind::Substring => self.terms.iter().any(|t| haystack.contains(t.as_str())),
            MatcherKind::WholeWord => {
                let padded = word_padded(&haystack);
                self.terms
                    .iter()
                    .any(|t| padded.contains(&format!(" {t} ")))
            }
        }
    }

    /// Number of texts with at least one matching term.
    pub fn count_matching<'a, I>(&self, texts: I) -> u32
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts
            .into_iter()
            .filter(|text| self.matches(text))
            .fold(0_u32, |acc, _| acc.saturating_add(1))
    }

    /// The normalized terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Collapse text into space-separated alphanumeric words with a leading
/// and trailing space, so whole-word lookups are a substring search.
fn word_padded(text: &str) -> String {
    format!(" {} ", word_padded_inner(text))
}

fn word_padded_inner(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The rule tables used by the social adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconSet {
    /// Drives the crisis ratio.
    pub crisis: Lexicon,
    /// Reported for display only.
    pub interest: Lexicon,
}

impl LexiconSet {
    /// Build both tables from configuration.
    pub fn from_config(config: &LexiconConfig) -> Self {
        Self {
            crisis: Lexicon::new(&config.crisis, config.matcher),
            interest: Lexicon::new(&config.interest, config.matcher),
        }
    }
}

impl Default for LexiconSet {
    fn default() -> Self {
        Self::from_config(&LexiconConfig::default())
    }
}
