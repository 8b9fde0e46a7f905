//! Render a small montage banner to `montage.svg`.
//!
//! Avatars are fetched from the live network, so run this with connectivity:
//!
//! ```sh
//! cargo run --example render_montage
//! ```

use backerwall::{BannerConfig, BannerEngine, ImageProxy, MontageRequest, SupporterRecord};
use chrono::Utc;

/// Fetch avatars directly instead of rewriting them through a CDN.
struct DirectProxy;

impl ImageProxy for DirectProxy {
    fn thumbnail(&self, source: &str, _size: u32) -> String {
        source.to_string()
    }
    fn scaled(&self, source: &str, _height: u32) -> String {
        source.to_string()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let supporters: Vec<SupporterRecord> = (1..=3)
        .map(|i| SupporterRecord {
            id: i,
            name: format!("demo-supporter-{}", i),
            avatar: Some(format!("https://picsum.photos/id/{}/64/64", 100 + i)),
            tier: "backer".to_string(),
            website: None,
            twitter_handle: None,
            created_at: Utc::now(),
        })
        .collect();

    let engine = BannerEngine::new(BannerConfig::default())?.with_proxy(Box::new(DirectProxy));
    let request = MontageRequest {
        tier: "backers".to_string(),
        button: false,
        ..Default::default()
    };

    let document = engine.montage(&supporters, &request).await?;
    std::fs::write("montage.svg", &document.bytes)?;
    println!("Wrote montage.svg ({} bytes)", document.bytes.len());
    Ok(())
}
