//! Concurrent fetch orchestration.
//!
//! All fetches for one render are started together and joined before any
//! layout work begins; results come back in request order regardless of
//! completion order. The batch entry point never fails as a whole: each
//! reference gets its own [`FetchOutcome`] and failures are passed through
//! for per-item skip handling downstream. The per-fetch timeout lives on the
//! shared `reqwest::Client` (set at engine construction), so a hung remote
//! turns into an ordinary per-item failure instead of stalling the render.
//! Dropping the render future cancels whatever is still in flight.

use crate::{Error, Result};
use futures::future::join_all;
use log::warn;

/// A successfully fetched image payload.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Per-reference outcome of a batch fetch. Consumed once by the prober.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(FetchedImage),
    Failed { url: String, reason: String },
}

/// Fetch a single reference. Any transport error, non-success status or
/// timeout is fatal and names the unreachable reference.
pub async fn fetch_one(client: &reqwest::Client, url: &str) -> Result<FetchedImage> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::FetchError(format!("{}: {}", url, e)))?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::FetchError(format!("{}: {}", url, e)))?
        .to_vec();

    Ok(FetchedImage { bytes, content_type })
}

/// Fetch every reference concurrently, recording one outcome per reference.
///
/// A failure is logged and captured, never propagated, so one unreachable
/// avatar cannot abort or hang the whole montage.
pub async fn fetch_all(client: &reqwest::Client, urls: &[String]) -> Vec<FetchOutcome> {
    join_all(urls.iter().map(|url| async move {
        match fetch_one(client, url).await {
            Ok(image) => FetchOutcome::Fetched(image),
            Err(e) => {
                warn!("Batch fetch failed for {}: {}", url, e);
                FetchOutcome::Failed {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_server(body: &'static [u8]) -> String {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr();
        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                let response = match request.url() {
                    "/missing.png" => tiny_http::Response::from_string("gone").with_status_code(404),
                    _ => tiny_http::Response::from_data(body).with_header(
                        "Content-Type: image/png".parse::<tiny_http::Header>().unwrap(),
                    ),
                };
                let _ = request.respond(response);
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn batch_isolates_failures() {
        let base = start_server(b"not-really-a-png");
        let client = reqwest::Client::new();
        let urls = vec![
            format!("{}/a.png", base),
            format!("{}/missing.png", base),
            format!("{}/b.png", base),
        ];

        let outcomes = fetch_all(&client, &urls).await;
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], FetchOutcome::Fetched(_)));
        assert!(matches!(outcomes[1], FetchOutcome::Failed { .. }));
        assert!(matches!(outcomes[2], FetchOutcome::Fetched(_)));
    }

    #[tokio::test]
    async fn single_failure_is_fatal_and_names_url() {
        let base = start_server(b"payload");
        let client = reqwest::Client::new();
        let url = format!("{}/missing.png", base);

        let err = fetch_one(&client, &url).await.unwrap_err();
        assert!(err.to_string().contains(&url), "error should name the url: {err}");
    }

    #[tokio::test]
    async fn fetched_payload_carries_content_type() {
        let base = start_server(b"payload");
        let client = reqwest::Client::new();

        let image = fetch_one(&client, &format!("{}/ok.png", base)).await.unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes, b"payload");
    }
}
