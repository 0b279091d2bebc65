//! Configuration types for the feed adapters.
//!
//! These structs mirror the `feeds` and `lexicon` sections of
//! `shdwnet-config.yaml`. Every field has a default so an absent or partial
//! file still yields a working adapter set.

use serde::Deserialize;
use shdwnet_types::SourceId;

/// Adapter settings: which sources to poll, where, and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedsConfig {
    /// Per-adapter deadline in milliseconds. A fetch that exceeds it falls
    /// back like any other failure.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// `User-Agent` header sent with every request. Some listing APIs
    /// reject anonymous clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Sources polled each cycle.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<SourceId>,

    /// Endpoint URL per source.
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            enabled: default_enabled(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

/// Endpoint URLs, one per source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// GOES X-ray flux, JSON array of objects with a `flux` field.
    pub solar_xray: String,
    /// Planetary K-index, JSON array of rows.
    pub kindex: String,
    /// Solar wind plasma, JSON array of rows.
    pub plasma: String,
    /// Seismic GeoJSON feature collection.
    pub seismic: String,
    /// Social listing with `data.children[].data.{title,score}`.
    pub social: String,
    /// Flat JSON array of discussion ids.
    pub discussion: String,
}

impl EndpointsConfig {
    /// The URL configured for a source.
    pub fn url_for(&self, source: SourceId) -> &str {
        match source {
            SourceId::SolarXray => &self.solar_xray,
            SourceId::KIndex => &self.kindex,
            SourceId::Plasma => &self.plasma,
            SourceId::Seismic => &self.seismic,
            SourceId::Social => &self.social,
            SourceId::Discussion => &self.discussion,
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            solar_xray: "https://services.swpc.noaa.gov/json/goes/primary/xrays-1-day.json"
                .to_owned(),
            kindex: "https://services.swpc.noaa.gov/products/noaa-planetary-k-index.json"
                .to_owned(),
            plasma: "https://services.swpc.noaa.gov/products/solar-wind/plasma-1-day.json"
                .to_owned(),
            seismic:
                "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson"
                    .to_owned(),
            social: "https://www.reddit.com/r/worldnews/.json".to_owned(),
            discussion: "https://hacker-news.firebaseio.com/v0/topstories.json".to_owned(),
        }
    }
}

/// How lexicon terms are matched against text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Case-insensitive substring match.
    #[default]
    Substring,
    /// Case-insensitive match on whole words only.
    WholeWord,
}

/// Keyword rule tables used by the social adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LexiconConfig {
    /// Terms that flag a title as crisis-related. Drives the crisis ratio.
    #[serde(default = "default_crisis_terms")]
    pub crisis: Vec<String>,

    /// Terms that flag a title as technology interest. Counted for display
    /// only; never part of any signal.
    #[serde(default = "default_interest_terms")]
    pub interest: Vec<String>,

    /// Matching rule shared by both tables.
    #[serde(default)]
    pub matcher: MatcherKind,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            crisis: default_crisis_terms(),
            interest: default_interest_terms(),
            matcher: MatcherKind::default(),
        }
    }
}

const fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "shdwnet-signal/0.1".to_owned()
}

fn default_enabled() -> Vec<SourceId> {
    SourceId::ALL.to_vec()
}

fn default_crisis_terms() -> Vec<String> {
    [
        "breaking",
        "urgent",
        "war",
        "attack",
        "explosion",
        "crisis",
        "emergency",
        "earthquake",
        "tsunami",
    ]
    .into_iter()
    .map(ToOwned::to_owned)
    .collect()
}

fn default_interest_terms() -> Vec<String> {
    ["ai", "quantum", "breakthrough", "spacex", "nasa", "fusion", "crypto"]
        .into_iter()
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_poll_every_source() {
        let config = FeedsConfig::default();
        assert_eq!(config.enabled, SourceId::ALL.to_vec());
        assert_eq!(config.timeout_ms, 10_000);
        for source in SourceId::ALL {
            assert!(config.endpoints.url_for(source).starts_with("https://"));
        }
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: FeedsConfig = serde_json::from_value(serde_json::json!({
            "enabled": ["kindex", "seismic"],
            "endpoints": { "kindex": "http://localhost:9000/k.json" }
        }))
        .unwrap_or_default();
        assert_eq!(config.enabled, vec![SourceId::KIndex, SourceId::Seismic]);
        assert_eq!(config.endpoints.kindex, "http://localhost:9000/k.json");
        assert_eq!(
            config.endpoints.seismic,
            EndpointsConfig::default().seismic
        );
    }

    #[test]
    fn lexicon_defaults() {
        let lexicon = LexiconConfig::default();
        assert_eq!(lexicon.crisis.len(), 9);
        assert!(lexicon.interest.contains(&"quantum".to_owned()));
        assert_eq!(lexicon.matcher, MatcherKind::Substring);
    }
}
