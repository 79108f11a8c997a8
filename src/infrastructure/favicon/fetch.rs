use std::time::Duration;

use tracing::debug;
use url::Url;

/// A successful GET: final URL after redirects, declared content type and body.
#[derive(Debug)]
pub struct Fetched {
    pub url: Url,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Issues the GET requests of the resolution chain.
///
/// Every failure (transport error, non-success status, oversized or truncated
/// body) comes back as `None` so the chain can move on to its next step.
pub struct Fetcher {
    client: reqwest::Client,
    request_timeout: Duration,
    max_body_bytes: usize,
}

impl Fetcher {
    pub fn new(client: reqwest::Client, request_timeout: Duration, max_body_bytes: usize) -> Self {
        Self {
            client,
            request_timeout,
            max_body_bytes,
        }
    }

    pub async fn get(&self, url: &Url) -> Option<Fetched> {
        let mut response = match self
            .client
            .get(url.clone())
            .timeout(self.request_timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                debug!(%url, error = %err, "favicon request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(%url, status = %response.status(), "favicon request returned non-success");
            return None;
        }

        if let Some(length) = response.content_length()
            && length > self.max_body_bytes as u64
        {
            debug!(%url, length, "favicon response exceeds body limit");
            return None;
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .trim()
            .to_string();
        let final_url = response.url().clone();

        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if body.len() + chunk.len() > self.max_body_bytes {
                        debug!(%url, "favicon response exceeds body limit");
                        return None;
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(err) => {
                    debug!(%url, error = %err, "failed to read favicon response body");
                    return None;
                }
            }
        }

        Some(Fetched {
            url: final_url,
            content_type,
            body,
        })
    }
}
