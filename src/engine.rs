//! The compositing engine: filter -> resolve -> fetch -> probe -> layout ->
//! compose.
//!
//! Each render owns its own cursor and result buffers; nothing mutable is
//! shared across renders, so one engine instance can serve concurrent
//! requests behind an `Arc`.

use crate::fetch::{self, FetchOutcome};
use crate::probe;
use crate::rendering::compose::{self, SVG_CONTENT_TYPE};
use crate::rendering::layout::{self, CanvasSize};
use crate::rendering::PlacedImage;
use crate::resolve::{self, AvatarSource, CdnProxy, ImageProxy};
use crate::roster::{self, SupporterRecord};
use crate::tiers;
use crate::{AvatarReply, BannerConfig, Error, OutputFormat, RenderedDocument, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::time::Duration;

fn default_margin() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// Supporter ordering applied before layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    /// Most recently created supporters first
    Recent,
}

/// Parameters of a montage render.
///
/// Zero values for `count_limit`, `width` and `height` mean "no limit" and
/// "auto-size to content" respectively, matching the query-string shape the
/// caller forwards.
#[derive(Debug, Clone, Deserialize)]
pub struct MontageRequest {
    pub tier: String,
    #[serde(default)]
    pub format: OutputFormat,
    /// Maximum number of supporters to place; 0 = unlimited
    #[serde(default)]
    pub count_limit: usize,
    /// Explicit canvas width; 0 = auto-size, nonzero also enables wrapping
    #[serde(default)]
    pub width: u32,
    /// Explicit canvas height; 0 = auto-size
    #[serde(default)]
    pub height: u32,
    /// Per-avatar row height; None = tier size policy
    #[serde(default)]
    pub avatar_height: Option<u32>,
    #[serde(default = "default_margin")]
    pub margin: u32,
    #[serde(default)]
    pub order: Option<OrderMode>,
    /// Append the tier's call-to-action image after the last supporter
    #[serde(default = "default_true")]
    pub button: bool,
}

impl Default for MontageRequest {
    fn default() -> Self {
        Self {
            tier: String::new(),
            format: OutputFormat::Svg,
            count_limit: 0,
            width: 0,
            height: 0,
            avatar_height: None,
            margin: 5,
            order: None,
            button: true,
        }
    }
}

/// Parameters of a single-avatar render.
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarRequest {
    pub tier: String,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub format: OutputFormat,
    /// Target avatar height; None = tier size policy
    #[serde(default)]
    pub avatar_height: Option<u32>,
}

impl Default for AvatarRequest {
    fn default() -> Self {
        Self {
            tier: String::new(),
            position: 0,
            format: OutputFormat::Svg,
            avatar_height: None,
        }
    }
}

fn default_badge_color() -> String {
    "brightgreen".to_string()
}

/// Parameters of a tier badge render.
#[derive(Debug, Clone, Deserialize)]
pub struct BadgeRequest {
    pub tier: String,
    #[serde(default = "default_badge_color")]
    pub color: String,
    #[serde(default)]
    pub style: Option<String>,
}

/// The avatar banner compositing engine.
///
/// Construction builds the shared HTTP client; all render operations borrow
/// `self` immutably and can run concurrently.
pub struct BannerEngine {
    config: BannerConfig,
    client: reqwest::Client,
    proxy: Box<dyn ImageProxy>,
}

impl BannerEngine {
    /// Create an engine with the default CDN-backed image proxy.
    pub fn new(config: BannerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))?;

        let proxy = Box::new(CdnProxy::new(&config.cdn_url));
        Ok(Self { config, client, proxy })
    }

    /// Replace the image-transform collaborator (tests use a pass-through).
    pub fn with_proxy(mut self, proxy: Box<dyn ImageProxy>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    /// Render the multi-avatar montage banner for a tier.
    ///
    /// Fetch and decode failures are isolated per item: a montage with k
    /// broken avatars out of N renders the surviving N-k, packed as if the
    /// broken ones were never resolved.
    pub async fn montage(
        &self,
        supporters: &[SupporterRecord],
        request: &MontageRequest,
    ) -> Result<RenderedDocument> {
        let mut users = roster::filter_by_tier(supporters, &request.tier);
        if request.order == Some(OrderMode::Recent) {
            roster::sort_recent(&mut users);
        }
        if request.count_limit > 0 && users.len() > request.count_limit {
            users.truncate(request.count_limit);
        }

        let row_height = tiers::target_height(&request.tier, false, request.avatar_height);
        let items = resolve::resolve_montage(
            &self.config,
            self.proxy.as_ref(),
            &users,
            &request.tier,
            row_height,
            request.button,
        );

        let urls: Vec<String> = items.iter().map(|i| i.url.clone()).collect();
        let outcomes = fetch::fetch_all(&self.client, &urls).await;

        // Fan-in: keep survivors in resolution order, measuring each.
        let mut survivors = Vec::with_capacity(items.len());
        for (item, outcome) in items.iter().zip(outcomes) {
            let image = match outcome {
                FetchOutcome::Fetched(image) => image,
                // Already logged by the orchestrator
                FetchOutcome::Failed { .. } => continue,
            };
            let dims = match probe::probe_dimensions(&image.bytes, &image.content_type) {
                Ok(dims) => dims,
                Err(e) => {
                    warn!("Cannot get the dimensions of the avatar of {}: {}", item.label, e);
                    continue;
                }
            };
            survivors.push((probe::scaled_width(dims, row_height), image, item));
        }

        let widths: Vec<u32> = survivors.iter().map(|(w, _, _)| *w).collect();
        let (placements, auto) = layout::pack(&widths, row_height, request.margin, request.width);
        let canvas = CanvasSize {
            width: if request.width > 0 { request.width } else { auto.width },
            height: if request.height > 0 { request.height } else { auto.height },
        };

        let placed: Vec<PlacedImage> = survivors
            .into_iter()
            .zip(placements)
            .map(|((width, image, item), at)| PlacedImage {
                x: at.x,
                y: at.y,
                width,
                height: row_height,
                bytes: image.bytes,
                content_type: image.content_type,
                link: item.link.clone(),
            })
            .collect();

        debug!(
            "Montage for {:?}: {} of {} images placed on {}x{}",
            request.tier,
            placed.len(),
            urls.len(),
            canvas.width,
            canvas.height
        );

        self.finish(compose::montage_document(&placed, canvas), request.format)
    }

    /// Render one supporter's avatar at an ordinal position within the tier.
    ///
    /// Local-rooted and placeholder resolutions come back as
    /// [`AvatarReply::Redirect`] without touching the network. On the fetch
    /// path any failure is fatal to the request and names the unreachable
    /// reference.
    pub async fn avatar(
        &self,
        supporters: &[SupporterRecord],
        request: &AvatarRequest,
    ) -> Result<AvatarReply> {
        let users = roster::filter_by_tier(supporters, &request.tier);
        let max_height = tiers::target_height(
            &request.tier,
            request.format == OutputFormat::Svg,
            request.avatar_height,
        );

        let source = resolve::resolve_single(
            &self.config,
            self.proxy.as_ref(),
            &users,
            &request.tier,
            request.position,
            max_height,
        );
        let url = match source {
            AvatarSource::Redirect(path) => return Ok(AvatarReply::Redirect(path)),
            AvatarSource::Remote(url) => url,
        };

        let image = fetch::fetch_one(&self.client, &url).await?;

        if request.format == OutputFormat::Png {
            // Raster passthrough: serve the upstream bytes as-is.
            return Ok(AvatarReply::Document(RenderedDocument {
                content_type: image.content_type,
                bytes: image.bytes,
                cache_control: Some(self.config.cache_control()),
            }));
        }

        let thumb_height = (max_height as f64 / 2.0).round() as u32;
        let thumb_width = if tiers::is_sponsor(&request.tier) {
            // Sponsor logos keep their aspect ratio; degrade to square if
            // the payload cannot be measured.
            match probe::probe_dimensions(&image.bytes, &image.content_type) {
                Ok(dims) => probe::scaled_width(dims, thumb_height),
                Err(e) => {
                    warn!("Cannot measure sponsor avatar {}: {}", url, e);
                    thumb_height
                }
            }
        } else {
            thumb_height
        };

        let svg = compose::thumbnail_document(thumb_width, thumb_height, &image.content_type, &image.bytes);
        Ok(AvatarReply::Document(RenderedDocument {
            bytes: svg.into_bytes(),
            content_type: SVG_CONTENT_TYPE.to_string(),
            cache_control: Some(self.config.cache_control()),
        }))
    }

    /// Render a supporter-count badge by delegating to the badge service.
    pub async fn badge(
        &self,
        supporters: &[SupporterRecord],
        request: &BadgeRequest,
    ) -> Result<RenderedDocument> {
        let count = roster::count_matching(supporters, &request.tier);
        let mut url = format!(
            "{}/{}-{}-{}.svg",
            self.config.badge_url, request.tier, count, request.color
        );
        if let Some(style) = &request.style {
            url.push_str("?style=");
            url.push_str(style);
        }

        let image = fetch::fetch_one(&self.client, &url).await?;
        Ok(RenderedDocument {
            bytes: image.bytes,
            content_type: SVG_CONTENT_TYPE.to_string(),
            cache_control: None,
        })
    }

    /// Resolve the click-through target for an avatar at `position`.
    ///
    /// One past the last supporter points at the support anchor of the
    /// landing page; beyond that is a definite not-found.
    pub fn click_target(
        &self,
        supporters: &[SupporterRecord],
        tier: &str,
        position: usize,
    ) -> Result<String> {
        let users = roster::filter_by_tier(supporters, tier);
        if position > users.len() {
            return Err(Error::NotFound(format!(
                "position {} exceeds the {} supporters in {:?}",
                position,
                users.len(),
                tier
            )));
        }
        if position == users.len() {
            return Ok(format!("{}#support", self.config.landing_url()));
        }
        Ok(users[position]
            .link()
            .unwrap_or_else(|| self.config.landing_url()))
    }

    fn finish(&self, svg: String, format: OutputFormat) -> Result<RenderedDocument> {
        let cache_control = Some(self.config.cache_control());
        match format {
            OutputFormat::Svg => Ok(RenderedDocument {
                bytes: svg.into_bytes(),
                content_type: SVG_CONTENT_TYPE.to_string(),
                cache_control,
            }),
            #[cfg(feature = "raster")]
            OutputFormat::Png => Ok(RenderedDocument {
                bytes: crate::rendering::raster::rasterize_svg(&svg)?,
                content_type: compose::PNG_CONTENT_TYPE.to_string(),
                cache_control,
            }),
            #[cfg(not(feature = "raster"))]
            OutputFormat::Png => Err(Error::RasterError(
                "PNG output requires the `raster` feature".to_string(),
            )),
        }
    }
}
