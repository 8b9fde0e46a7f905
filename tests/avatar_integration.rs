//! Integration tests for the single-avatar path: redirects, thumbnails,
//! raster passthrough and fatal fetch failures

use backerwall::resolve::ImageProxy;
use backerwall::{
    AvatarReply, AvatarRequest, BannerConfig, BannerEngine, Error, OutputFormat, SupporterRecord,
};
use chrono::{TimeZone, Utc};
use std::io::Cursor;

struct Passthrough;

impl ImageProxy for Passthrough {
    fn thumbnail(&self, source: &str, _size: u32) -> String {
        source.to_string()
    }
    fn scaled(&self, source: &str, _height: u32) -> String {
        source.to_string()
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([1, 2, 3, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn start_test_server() -> String {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();
    std::thread::spawn(move || {
        let square = png_bytes(64, 64);
        let wide = png_bytes(128, 64);
        for request in server.incoming_requests() {
            let png_header = "Content-Type: image/png".parse::<tiny_http::Header>().unwrap();
            let response = match request.url() {
                "/avatars/wide.png" => tiny_http::Response::from_data(wide.clone()).with_header(png_header),
                "/avatars/missing.png" => {
                    tiny_http::Response::from_data(b"gone".to_vec()).with_status_code(404)
                }
                _ => tiny_http::Response::from_data(square.clone()).with_header(png_header),
            };
            let _ = request.respond(response);
        }
    });
    format!("http://{}", addr)
}

fn supporter(id: u64, tier: &str, avatar: Option<String>) -> SupporterRecord {
    SupporterRecord {
        id,
        name: format!("supporter-{}", id),
        avatar,
        tier: tier.to_string(),
        website: None,
        twitter_handle: None,
        created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn engine() -> BannerEngine {
    BannerEngine::new(BannerConfig::default()).unwrap().with_proxy(Box::new(Passthrough))
}

fn request(tier: &str, position: usize) -> AvatarRequest {
    AvatarRequest {
        tier: tier.to_string(),
        position,
        ..Default::default()
    }
}

#[tokio::test]
async fn position_at_count_redirects_to_call_to_action() {
    let supporters = vec![supporter(1, "backer", None)];
    match engine().avatar(&supporters, &request("backers", 1)).await.unwrap() {
        AvatarReply::Redirect(path) => assert_eq!(path, "/static/images/become_backer.svg"),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[tokio::test]
async fn position_past_count_redirects_to_placeholder() {
    let supporters = vec![supporter(1, "backer", None)];
    match engine().avatar(&supporters, &request("backers", 2)).await.unwrap() {
        AvatarReply::Redirect(path) => assert_eq!(path, "/static/images/1px.png"),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[tokio::test]
async fn local_rooted_avatar_redirects_verbatim() {
    let supporters = vec![supporter(1, "backer", Some("/static/images/me.png".to_string()))];
    match engine().avatar(&supporters, &request("backer", 0)).await.unwrap() {
        AvatarReply::Redirect(path) => assert_eq!(path, "/static/images/me.png"),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_avatar_redirects_to_default() {
    let supporters = vec![supporter(1, "backer", None)];
    match engine().avatar(&supporters, &request("backer", 0)).await.unwrap() {
        AvatarReply::Redirect(path) => assert_eq!(path, "/static/images/user.svg"),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[tokio::test]
async fn svg_thumbnail_embeds_fetched_avatar() {
    let base = start_test_server();
    let supporters = vec![supporter(1, "backer", Some(format!("{}/avatars/a.png", base)))];

    let reply = engine().avatar(&supporters, &request("backer", 0)).await.unwrap();
    let document = match reply {
        AvatarReply::Document(document) => document,
        other => panic!("expected document, got {other:?}"),
    };

    assert_eq!(document.content_type, "image/svg+xml;charset=utf-8");
    assert_eq!(document.cache_control.as_deref(), Some("public, max-age=300"));
    let svg = String::from_utf8(document.bytes).unwrap();
    // 128px policy height halves to a 64px square thumbnail.
    assert!(svg.contains("width=\"64\" height=\"64\""), "thumb: {svg}");
    assert!(svg.contains("data:image/png;base64,"));
}

#[tokio::test]
async fn sponsor_thumbnail_keeps_aspect_ratio() {
    let base = start_test_server();
    let supporters = vec![supporter(
        1,
        "gold sponsor",
        Some(format!("{}/avatars/wide.png", base)),
    )];

    let req = AvatarRequest {
        tier: "gold sponsor".to_string(),
        avatar_height: Some(100),
        ..Default::default()
    };
    let reply = engine().avatar(&supporters, &req).await.unwrap();
    let document = match reply {
        AvatarReply::Document(document) => document,
        other => panic!("expected document, got {other:?}"),
    };

    // 100px override halves to 50; the 128x64 logo scales to 100x50.
    let svg = String::from_utf8(document.bytes).unwrap();
    assert!(svg.contains("width=\"100\" height=\"50\""), "sponsor thumb: {svg}");
}

#[tokio::test]
async fn png_format_passes_upstream_bytes_through() {
    let base = start_test_server();
    let supporters = vec![supporter(1, "backer", Some(format!("{}/avatars/a.png", base)))];

    let req = AvatarRequest {
        tier: "backer".to_string(),
        format: OutputFormat::Png,
        ..Default::default()
    };
    let reply = engine().avatar(&supporters, &req).await.unwrap();
    match reply {
        AvatarReply::Document(document) => {
            assert_eq!(document.content_type, "image/png");
            assert_eq!(document.bytes, png_bytes(64, 64));
        }
        other => panic!("expected document, got {other:?}"),
    }
}

#[tokio::test]
async fn single_fetch_failure_is_fatal_and_names_reference() {
    let base = start_test_server();
    let url = format!("{}/avatars/missing.png", base);
    let supporters = vec![supporter(1, "backer", Some(url.clone()))];

    let err = engine().avatar(&supporters, &request("backer", 0)).await.unwrap_err();
    assert!(matches!(err, Error::FetchError(_)));
    assert!(err.to_string().contains(&url), "should name the reference: {err}");
}
