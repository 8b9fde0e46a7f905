//! Supporter records and tier-based selection.
//!
//! Selection is intentionally simple: a tier token (possibly plural) selects
//! the records whose tier label matches it case-insensitively, deduplicated
//! by identity with the first occurrence winning. Selection is side-effect
//! free and idempotent, so route handlers can call it repeatedly on the same
//! list without surprises.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single supporter, as resolved by the caller.
///
/// Records are read-only inputs to a render; the engine never mutates or
/// stores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupporterRecord {
    /// Unique identity used for deduplication
    pub id: u64,
    /// Display name, used in diagnostics
    pub name: String,
    /// Avatar reference: an absolute URL or a local-rooted path
    #[serde(default)]
    pub avatar: Option<String>,
    /// Tier label, e.g. "backer" or "gold sponsor"
    pub tier: String,
    /// Personal website linked from the montage
    #[serde(default)]
    pub website: Option<String>,
    /// Social handle used as a link fallback
    #[serde(default)]
    pub twitter_handle: Option<String>,
    /// When the supporter joined; drives `recent` ordering
    pub created_at: DateTime<Utc>,
}

impl SupporterRecord {
    /// The URL a viewer should land on when clicking this supporter's
    /// avatar: their website, else their social profile, else `None`.
    pub fn link(&self) -> Option<String> {
        if let Some(website) = &self.website {
            return Some(website.clone());
        }
        self.twitter_handle
            .as_ref()
            .map(|h| format!("https://twitter.com/{}", h))
    }
}

/// Strip one trailing plural marker from a tier token ("backers" -> "backer").
pub fn singularize(tier: &str) -> &str {
    tier.strip_suffix('s').unwrap_or(tier)
}

/// Select the supporters belonging to `tier`, deduplicated by identity.
///
/// The token may carry a trailing plural `s`; matching is case-insensitive
/// against the singularized token. The first occurrence of each identity
/// wins and input order is preserved.
pub fn filter_by_tier(supporters: &[SupporterRecord], tier: &str) -> Vec<SupporterRecord> {
    let token = singularize(tier).to_lowercase();
    let mut seen = HashSet::new();
    supporters
        .iter()
        .filter(|s| s.tier.to_lowercase() == token)
        .filter(|s| seen.insert(s.id))
        .cloned()
        .collect()
}

/// Count the supporters whose tier label contains the singularized token,
/// deduplicated by identity. Used by the badge operation, which matches
/// loosely ("sponsors" counts "gold sponsor" and "silver sponsor" alike).
pub fn count_matching(supporters: &[SupporterRecord], tier: &str) -> usize {
    let token = singularize(tier).to_lowercase();
    let mut seen = HashSet::new();
    supporters
        .iter()
        .filter(|s| s.tier.to_lowercase().contains(&token))
        .filter(|s| seen.insert(s.id))
        .count()
}

/// Sort supporters by creation timestamp, most recent first. Stable, so
/// records sharing a timestamp keep their input order.
pub fn sort_recent(supporters: &mut [SupporterRecord]) {
    supporters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: u64, tier: &str, day: u32) -> SupporterRecord {
        SupporterRecord {
            id,
            name: format!("supporter-{}", id),
            avatar: None,
            tier: tier.to_string(),
            website: None,
            twitter_handle: None,
            created_at: Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn filter_strips_plural_and_ignores_case() {
        let supporters = vec![record(1, "Backer", 1), record(2, "sponsor", 2)];
        let filtered = filter_by_tier(&supporters, "backers");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn filter_dedupes_first_occurrence_wins() {
        let mut dup = record(1, "backer", 5);
        dup.name = "duplicate".to_string();
        let supporters = vec![record(1, "backer", 1), record(2, "backer", 2), dup];
        let filtered = filter_by_tier(&supporters, "backer");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].name, "supporter-1");
    }

    #[test]
    fn filter_is_idempotent() {
        let supporters = vec![record(1, "backer", 1), record(1, "backer", 2), record(3, "backer", 3)];
        let once = filter_by_tier(&supporters, "backers");
        let twice = filter_by_tier(&once, "backers");
        assert_eq!(once.len(), twice.len());
        assert!(once.iter().zip(&twice).all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn recent_order_is_descending() {
        let mut supporters = vec![record(1, "backer", 1), record(2, "backer", 3), record(3, "backer", 2)];
        sort_recent(&mut supporters);
        let ids: Vec<u64> = supporters.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn loose_count_matches_substring() {
        let supporters = vec![
            record(1, "gold sponsor", 1),
            record(2, "silver sponsor", 2),
            record(3, "backer", 3),
            record(1, "gold sponsor", 4),
        ];
        assert_eq!(count_matching(&supporters, "sponsors"), 2);
        assert_eq!(count_matching(&supporters, "backers"), 1);
    }

    #[test]
    fn link_prefers_website_over_handle() {
        let mut s = record(1, "backer", 1);
        assert_eq!(s.link(), None);
        s.twitter_handle = Some("ferris".to_string());
        assert_eq!(s.link().as_deref(), Some("https://twitter.com/ferris"));
        s.website = Some("https://ferris.example".to_string());
        assert_eq!(s.link().as_deref(), Some("https://ferris.example"));
    }
}
