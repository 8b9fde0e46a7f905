//! Avatar reference resolution.
//!
//! Turns supporter records into fetchable image references. Remote avatars
//! are rewritten through an image-transform CDN (the [`ImageProxy`] seam):
//! sponsor logos get a plain height-only transform so their aspect ratio
//! survives, every other tier gets a face-cropped circular thumbnail.
//! Local-rooted references and positional placeholders never reach the
//! network on the single-avatar path; they short-circuit to a redirect.

use crate::roster::{singularize, SupporterRecord};
use crate::tiers::is_sponsor;
use crate::BannerConfig;
use log::debug;

/// An image-URL-transform collaborator.
///
/// Implementations accept a source reference and return a rewritten,
/// directly fetchable URL. The default [`CdnProxy`] builds Cloudinary-style
/// fetch URLs; tests substitute a pass-through.
pub trait ImageProxy: Send + Sync {
    /// Face-cropped circular-bordered thumbnail at `size` x `size` pixels.
    fn thumbnail(&self, source: &str, size: u32) -> String;

    /// Scale to `height` pixels, preserving aspect ratio.
    fn scaled(&self, source: &str, height: u32) -> String;
}

/// Default [`ImageProxy`] backed by a Cloudinary-style fetch endpoint.
#[derive(Debug, Clone)]
pub struct CdnProxy {
    base_url: String,
}

impl CdnProxy {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn encode(source: &str) -> String {
        url::form_urlencoded::byte_serialize(source.as_bytes()).collect()
    }
}

impl ImageProxy for CdnProxy {
    fn thumbnail(&self, source: &str, size: u32) -> String {
        format!(
            "{}/c_thumb,g_face,h_{size},r_max,w_{size},bo_3px_solid_white/c_thumb,h_{size},r_max,w_{size},bo_2px_solid_rgb:66C71A/e_trim/f_auto/{}",
            self.base_url,
            Self::encode(source),
        )
    }

    fn scaled(&self, source: &str, height: u32) -> String {
        format!("{}/h_{height}/{}", self.base_url, Self::encode(source))
    }
}

/// Result of resolving a single-avatar request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarSource {
    /// Serve a redirect to this local path; nothing to fetch
    Redirect(String),
    /// Fetch this remote reference
    Remote(String),
}

/// The local path of a tier's call-to-action image.
pub fn cta_path(tier: &str) -> String {
    let image = if is_sponsor(tier) { "sponsor" } else { singularize(tier) };
    format!("/static/images/become_{}.svg", image.to_lowercase())
}

/// Resolve the image reference for ordinal `position` within the filtered
/// supporter list.
///
/// One past the last supporter resolves to the tier's call-to-action image;
/// anything beyond that to a 1x1 transparent placeholder, so a fixed grid of
/// positions can be requested without knowing the supporter count upfront.
pub fn resolve_single(
    config: &BannerConfig,
    proxy: &dyn ImageProxy,
    supporters: &[SupporterRecord],
    tier: &str,
    position: usize,
    max_height: u32,
) -> AvatarSource {
    if position > supporters.len() {
        return AvatarSource::Redirect(config.placeholder_path.clone());
    }
    if position == supporters.len() {
        return AvatarSource::Redirect(cta_path(tier));
    }

    match supporters[position].avatar.as_deref() {
        None => AvatarSource::Redirect(config.default_avatar_path.clone()),
        Some(avatar) if avatar.starts_with('/') => AvatarSource::Redirect(avatar.to_string()),
        Some(avatar) if is_sponsor(tier) => AvatarSource::Remote(proxy.scaled(avatar, max_height)),
        Some(avatar) => AvatarSource::Remote(proxy.thumbnail(avatar, max_height)),
    }
}

/// A resolved montage entry: the reference to fetch, the hyperlink target of
/// the placed image and the owning supporter's name for diagnostics.
#[derive(Debug, Clone)]
pub struct MontageItem {
    pub url: String,
    pub link: String,
    pub label: String,
}

/// Resolve every supporter in the (already filtered and ordered) list.
///
/// Records without an avatar are skipped here so the fetch fan-out and the
/// link attribution stay aligned. Transforms request twice the row height
/// for sharpness on high-density screens. Local-rooted references are made
/// absolute against the site base URL so they stay fetchable.
pub fn resolve_montage(
    config: &BannerConfig,
    proxy: &dyn ImageProxy,
    supporters: &[SupporterRecord],
    tier: &str,
    avatar_height: u32,
    button: bool,
) -> Vec<MontageItem> {
    let landing = config.landing_url();
    let mut items = Vec::with_capacity(supporters.len() + 1);

    for supporter in supporters {
        let avatar = match supporter.avatar.as_deref() {
            Some(a) => a,
            None => {
                debug!("No avatar for {}; skipping montage slot", supporter.name);
                continue;
            }
        };
        let url = if avatar.starts_with('/') {
            format!("{}{}", config.site_url, avatar)
        } else if is_sponsor(tier) {
            proxy.scaled(avatar, avatar_height * 2)
        } else {
            proxy.thumbnail(avatar, avatar_height * 2)
        };
        items.push(MontageItem {
            url,
            link: supporter.link().unwrap_or_else(|| landing.clone()),
            label: supporter.name.clone(),
        });
    }

    if button {
        items.push(MontageItem {
            url: format!("{}{}", config.site_url, cta_path(tier)),
            link: landing,
            label: "call-to-action".to_string(),
        });
    }

    items
}
