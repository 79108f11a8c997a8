use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::data_uri;
use super::fetch::{Fetched, Fetcher};
use super::links::find_icon_href;
use crate::domain::favicons::{Asset, is_image_content_type};
use crate::domain::resolver::ResolveError;

/// A validated site origin and the URLs derived from it.
#[derive(Debug, Clone)]
pub struct Origin {
    url: Url,
}

impl Origin {
    pub fn parse(origin: &str) -> Result<Self, ResolveError> {
        let invalid = |reason: String| ResolveError::InvalidOrigin {
            origin: origin.to_string(),
            reason,
        };

        let mut url = Url::parse(origin.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self { url })
    }

    /// `<origin>/favicon.ico`, keeping any path segment of the origin.
    pub fn favicon_ico(&self) -> Url {
        let mut url = self.url.clone();
        let path = format!("{}/favicon.ico", self.url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }

    /// The document at `/` on the origin's host.
    pub fn root(&self) -> Url {
        let mut url = self.url.clone();
        url.set_path("/");
        url
    }

    /// The origin itself, when it is mounted below the domain root.
    pub fn subpath(&self) -> Option<Url> {
        if self.url.path().trim_matches('/').is_empty() {
            None
        } else {
            Some(self.url.clone())
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedIcon {
    /// Where the icon came from: a fetched URL or the inline `data:` URI.
    pub url: String,
    pub asset: Asset,
}

#[derive(Debug)]
pub enum Lookup {
    Found(ResolvedIcon),
    Absent,
}

/// One step of the resolution chain. `Absent` hands over to the next step.
#[async_trait]
pub trait IconStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, fetcher: &Fetcher, origin: &Origin) -> Result<Lookup, ResolveError>;
}

/// Strategies in priority order.
pub fn default_chain() -> Vec<Box<dyn IconStrategy>> {
    vec![Box::new(WellKnownIcon), Box::new(DocumentLink)]
}

/// Fetches `/favicon.ico` relative to the origin.
pub struct WellKnownIcon;

#[async_trait]
impl IconStrategy for WellKnownIcon {
    fn name(&self) -> &'static str {
        "favicon.ico"
    }

    async fn lookup(&self, fetcher: &Fetcher, origin: &Origin) -> Result<Lookup, ResolveError> {
        let Some(fetched) = fetcher.get(&origin.favicon_ico()).await else {
            return Ok(Lookup::Absent);
        };
        Ok(image_lookup(fetched))
    }
}

/// Follows the icon `<link>` of the origin's HTML document.
///
/// The root document is tried first. When that request fails and the origin
/// carries a path, the document at that path is used instead.
pub struct DocumentLink;

#[async_trait]
impl IconStrategy for DocumentLink {
    fn name(&self) -> &'static str {
        "document link"
    }

    async fn lookup(&self, fetcher: &Fetcher, origin: &Origin) -> Result<Lookup, ResolveError> {
        let document = match fetcher.get(&origin.root()).await {
            Some(doc) => doc,
            None => {
                let Some(path) = origin.subpath() else {
                    return Ok(Lookup::Absent);
                };
                let Some(doc) = fetcher.get(&path).await else {
                    return Ok(Lookup::Absent);
                };
                doc
            }
        };

        let html = String::from_utf8_lossy(&document.body);
        let Some(href) = find_icon_href(&html) else {
            debug!(url = %document.url, "document has no icon link");
            return Ok(Lookup::Absent);
        };

        if data_uri::is_data_uri(&href) {
            return Ok(match data_uri::decode(&href) {
                Some(asset) => Lookup::Found(ResolvedIcon { url: href, asset }),
                None => {
                    debug!(url = %document.url, "icon link has a malformed data URI");
                    Lookup::Absent
                }
            });
        }

        let icon_url = match document.url.join(&href) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => {
                debug!(%url, "icon link uses an unsupported scheme");
                return Ok(Lookup::Absent);
            }
            Err(err) => {
                debug!(href = %href, error = %err, "icon link is not a valid URL");
                return Ok(Lookup::Absent);
            }
        };

        let Some(fetched) = fetcher.get(&icon_url).await else {
            return Ok(Lookup::Absent);
        };
        Ok(image_lookup(fetched))
    }
}

fn image_lookup(fetched: Fetched) -> Lookup {
    if !is_image_content_type(&fetched.content_type) {
        debug!(
            url = %fetched.url,
            content_type = %fetched.content_type,
            "favicon candidate is not an image"
        );
        return Lookup::Absent;
    }

    Lookup::Found(ResolvedIcon {
        url: fetched.url.to_string(),
        asset: Asset {
            content_type: fetched.content_type,
            data: fetched.body,
        },
    })
}
