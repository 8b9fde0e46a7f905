//! Render one supporter's avatar thumbnail, or print the redirect path for
//! positions that resolve to a placeholder.

use backerwall::{
    AvatarReply, AvatarRequest, BannerConfig, BannerEngine, ImageProxy, SupporterRecord,
};
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
    let supporters = vec![SupporterRecord {
        id: 1,
        name: "demo-supporter".to_string(),
        avatar: Some("https://picsum.photos/id/101/128/128".to_string()),
        tier: "backer".to_string(),
        website: Some("https://example.org".to_string()),
        twitter_handle: None,
        created_at: Utc::now(),
    }];

    let engine = BannerEngine::new(BannerConfig::default())?.with_proxy(Box::new(DirectProxy));

    for position in 0..3 {
        let request = AvatarRequest {
            tier: "backers".to_string(),
            position,
            ..Default::default()
        };
        match engine.avatar(&supporters, &request).await? {
            AvatarReply::Redirect(path) => println!("position {}: redirect {}", position, path),
            AvatarReply::Document(document) => {
                let file = format!("avatar-{}.svg", position);
                std::fs::write(&file, &document.bytes)?;
                println!("position {}: wrote {} ({} bytes)", position, file, document.bytes.len());
            }
        }
    }
    Ok(())
}
