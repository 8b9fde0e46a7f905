//! Backerwall Compositing Engine
//!
//! A banner compositing engine that turns a list of supporter records into a
//! composite image: a horizontal (optionally wrapped) montage of supporter
//! avatars, or a single supporter's avatar thumbnail. Avatars are fetched
//! concurrently, measured, packed left-to-right on a canvas and serialized as
//! SVG markup, optionally rasterized to PNG.
//!
//! # Features
//!
//! - **Per-item failure isolation**: one unreachable or corrupt avatar never
//!   aborts a montage; the item is dropped and logged
//! - **Deterministic layout**: identical inputs always produce the same
//!   placements and canvas bounds
//! - **Raster backend** (default): SVG output can be converted to PNG via the
//!   `raster` feature
//!
//! # Example
//!
//! ```no_run
//! use backerwall::{BannerConfig, BannerEngine, MontageRequest};
//!
//! # async fn run(supporters: Vec<backerwall::SupporterRecord>) -> backerwall::Result<()> {
//! let config = BannerConfig {
//!     site_url: "https://example.org".to_string(),
//!     ..Default::default()
//! };
//!
//! let engine = BannerEngine::new(config)?;
//! let request = MontageRequest {
//!     tier: "backers".to_string(),
//!     ..Default::default()
//! };
//! let document = engine.montage(&supporters, &request).await?;
//! println!("{} bytes of {}", document.bytes.len(), document.content_type);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

// Tier selection and record filtering
pub mod roster;
pub use roster::SupporterRecord;

// Tier multipliers and target pixel sizes
pub mod tiers;

// Avatar reference resolution (CDN rewrites, placeholders)
pub mod resolve;
pub use resolve::{CdnProxy, ImageProxy};

// Concurrent fetch orchestration
pub mod fetch;

// Pixel dimension probing of fetched payloads
pub mod probe;

// Layout and document composition
pub mod rendering;

// The engine tying the pipeline together
pub mod engine;
pub use engine::{AvatarRequest, BadgeRequest, BannerEngine, MontageRequest, OrderMode};

/// Requested output encoding of a render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Vector markup, `image/svg+xml;charset=utf-8`
    #[default]
    Svg,
    /// Raster bytes, `image/png` (requires the `raster` feature for montages)
    Png,
}

/// Configuration for the compositing engine
///
/// This struct contains the core engine configuration used when creating a
/// `BannerEngine` instance. All collaborator endpoints are explicit here so
/// renders never reach for ambient global state. The defaults are chosen to
/// be conservative:
/// - `timeout_ms` bounds every individual avatar fetch; a timeout is treated
///   as an ordinary fetch failure
/// - `cache_max_age_secs` is the public cache lifetime advertised on
///   successful montage/avatar documents
///
/// # Examples
///
/// ```
/// let cfg = backerwall::BannerConfig::default();
/// assert_eq!(cfg.cache_max_age_secs, 300);
/// ```
#[derive(Debug, Clone)]
pub struct BannerConfig {
    /// Base URL of the site hosting static images and landing pages
    pub site_url: String,
    /// Collective slug appended to `site_url` for fallback landing links
    pub slug: String,
    /// Base URL of the image-transform CDN used for avatar thumbnails
    pub cdn_url: String,
    /// Base URL of the badge rendering service
    pub badge_url: String,
    /// User agent string to send with requests
    pub user_agent: String,
    /// Timeout for each individual image fetch in milliseconds
    pub timeout_ms: u64,
    /// Public cache lifetime advertised on rendered documents, in seconds
    pub cache_max_age_secs: u32,
    /// Local path served when a supporter has no avatar
    pub default_avatar_path: String,
    /// Local path of the 1x1 transparent placeholder
    pub placeholder_path: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            site_url: "https://example.org".to_string(),
            slug: "collective".to_string(),
            cdn_url: "https://res.cloudinary.com/demo/image/fetch".to_string(),
            badge_url: "https://img.shields.io/badge".to_string(),
            user_agent: "Mozilla/5.0 (compatible; Backerwall/0.1)".to_string(),
            timeout_ms: 10000,
            cache_max_age_secs: 300,
            default_avatar_path: "/static/images/user.svg".to_string(),
            placeholder_path: "/static/images/1px.png".to_string(),
        }
    }
}

impl BannerConfig {
    /// The landing URL used when a supporter has no website of their own.
    pub fn landing_url(&self) -> String {
        format!("{}/{}", self.site_url, self.slug)
    }

    /// The `Cache-Control` value to advertise on successful documents.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age_secs)
    }
}

/// A rendered output document
///
/// Returned by the montage and single-avatar operations; `content_type` is
/// ready to use as an HTTP `Content-Type` header and `cache_control`, when
/// present, as a `Cache-Control` header.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Serialized document bytes (SVG markup or PNG data)
    pub bytes: Vec<u8>,
    /// MIME content type of `bytes`
    pub content_type: String,
    /// Public cache lifetime to advertise, if any
    pub cache_control: Option<String>,
}

/// Outcome of a single-avatar render
///
/// Local-rooted references and positional placeholders short-circuit to a
/// redirect instead of a fetched document.
#[derive(Debug, Clone)]
pub enum AvatarReply {
    /// Redirect the caller to this local path
    Redirect(String),
    /// A rendered document to serve directly
    Document(RenderedDocument),
}
