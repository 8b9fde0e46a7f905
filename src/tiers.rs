//! Tier-driven sizing policy.
//!
//! Elevated tiers render larger avatars. The multiplier is found with a
//! single highest-specificity lookup: the table below is ordered by
//! descending multiplier and the first case-insensitive substring match
//! wins, so a label like "diamond gold sponsor" sizes as diamond rather
//! than compounding both multipliers.

/// Named elevated tiers and their sizing multipliers, most specific first.
const MULTIPLIERS: [(&str, f64); 3] = [("diamond", 2.0), ("gold", 1.5), ("silver", 1.25)];

/// The sizing multiplier for a tier label. 1.0 for anything unrecognized.
pub fn size_multiplier(tier: &str) -> f64 {
    let tier = tier.to_lowercase();
    MULTIPLIERS
        .iter()
        .find(|(name, _)| tier.contains(name))
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

/// Whether a tier label denotes sponsorship. Sponsors keep their own logo
/// aspect ratio and get a plain height-only CDN transform.
pub fn is_sponsor(tier: &str) -> bool {
    tier.to_lowercase().contains("sponsor")
}

/// Compute the target avatar height in pixels.
///
/// `single_vector` selects the larger 128px base used for single-avatar SVG
/// thumbnails; everything else (montages, raster thumbnails) starts from
/// 64px. An explicit caller override always wins outright and suppresses the
/// tier multiplier. Pure: identical `(tier, single_vector, override)`
/// triples always yield identical results.
pub fn target_height(tier: &str, single_vector: bool, override_height: Option<u32>) -> u32 {
    if let Some(h) = override_height {
        return h;
    }
    let base = if single_vector { 128.0 } else { 64.0 };
    (base * size_multiplier(tier)).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_lookup_is_single_and_specific() {
        assert_eq!(size_multiplier("silver sponsor"), 1.25);
        assert_eq!(size_multiplier("Gold Sponsor"), 1.5);
        assert_eq!(size_multiplier("diamond"), 2.0);
        assert_eq!(size_multiplier("backer"), 1.0);
        // No compounding: the most specific (highest) tier wins alone.
        assert_eq!(size_multiplier("diamond gold sponsor"), 2.0);
    }

    #[test]
    fn override_beats_multiplier() {
        assert_eq!(target_height("gold sponsor", true, Some(40)), 40);
        assert_eq!(target_height("backer", false, Some(200)), 200);
    }

    #[test]
    fn base_heights_per_context() {
        assert_eq!(target_height("backer", true, None), 128);
        assert_eq!(target_height("backer", false, None), 64);
        assert_eq!(target_height("silver sponsor", true, None), 160);
        assert_eq!(target_height("gold sponsor", false, None), 96);
        assert_eq!(target_height("diamond sponsor", false, None), 128);
    }

    #[test]
    fn policy_is_deterministic() {
        for _ in 0..2 {
            assert_eq!(target_height("gold sponsor", true, None), 192);
        }
    }

    #[test]
    fn sponsor_detection() {
        assert!(is_sponsor("Gold Sponsor"));
        assert!(!is_sponsor("backer"));
    }
}
