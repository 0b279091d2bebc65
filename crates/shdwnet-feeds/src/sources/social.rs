//! Social listing crisis proxy.

use serde_json::Value;
use shdwnet_types::RawMetrics;

use super::Extraction;
use crate::error::FeedError;
use crate::lexicon::LexiconSet;
use crate::parse::{as_array, as_number, count_u32, unit};

/// Posts scanned from the top of the listing.
pub const MAX_POSTS: usize = 25;

/// Scan the top posts for crisis terms and average their scores.
///
/// Signal is `0.5 * activity + 0.5 * crisis`. The interest lexicon is
/// counted into the metrics but does not contribute.
///
/// # Errors
///
/// [`FeedError::ShapeMismatch`] without `data.children`,
/// [`FeedError::EmptyDataset`] when the listing is empty.
pub fn extract_social(payload: &Value, lexicons: &LexiconSet) -> Result<Extraction, FeedError> {
    let children = payload
        .get("data")
        .and_then(|d| d.get("children"))
        .ok_or_else(|| FeedError::ShapeMismatch("missing data.children".to_owned()))
        .and_then(|c| as_array(c, "children"))?;
    if children.is_empty() {
        return Err(FeedError::EmptyDataset);
    }

    let posts: Vec<(&str, Option<f64>)> = children
        .iter()
        .take(MAX_POSTS)
        .map(|child| {
            let data = child.get("data");
            let title = data
                .and_then(|d| d.get("title"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            let score = data.and_then(|d| d.get("score")).and_then(as_number);
            (title, score)
        })
        .collect();

    let degraded = posts.iter().any(|(_, score)| score.is_none());
    let posts_considered = count_u32(posts.len());
    let total_score: f64 = posts.iter().map(|(_, score)| score.unwrap_or(0.0)).sum();
    let average_score = total_score / f64::from(posts_considered.max(1));

    let titles = || posts.iter().map(|(title, _)| *title);
    let crisis_hits = lexicons.crisis.count_matching(titles());
    let interest_hits = lexicons.interest.count_matching(titles());

    let activity = unit(average_score / 50_000.0);
    let crisis = unit(f64::from(crisis_hits) / 5.0);

    Ok(Extraction {
        raw: RawMetrics::Social {
            posts_considered,
            crisis_hits,
            interest_hits,
            average_score,
            activity,
            crisis,
        },
        signal: 0.5f64.mul_add(activity, 0.5 * crisis),
        degraded,
    })
}
