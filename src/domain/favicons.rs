use chrono::{DateTime, Utc};

use crate::domain::sites::SiteFaviconState;

// Storage column names for the favicon fields of a site.
pub const FAVICON_ORIGIN: &str = "favicon_origin";
pub const FAVICON_LAST_ATTEMPT_AT: &str = "favicon_last_attempt_at";
pub const FAVICON_DATA: &str = "favicon_data";
pub const FAVICON_CONTENT_TYPE: &str = "favicon_content_type";
pub const FAVICON_FETCHED_AT: &str = "favicon_fetched_at";

/// A resolved favicon: raw bytes plus the declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Asset {
    pub fn new(content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Whether this asset should replace the stored favicon.
    ///
    /// A site that never had a successful fetch always counts as changed.
    /// Otherwise bytes must match exactly and content types case-insensitively.
    pub fn differs_from(&self, stored: &SiteFaviconState) -> bool {
        stored.fetched_at.is_none()
            || self.data != stored.data
            || !self
                .content_type
                .trim()
                .eq_ignore_ascii_case(stored.content_type.trim())
    }
}

/// Returns true when the media type of a `Content-Type` value is `image/*`.
pub fn is_image_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type.starts_with("image/") && media_type.len() > "image/".len()
}

/// Proposed changes to a site's favicon fields. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaviconUpdate {
    pub origin: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub data: Option<Vec<u8>>,
    pub content_type: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl FaviconUpdate {
    /// The update every attempt records, whatever its outcome.
    pub fn attempt(origin: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            origin: Some(origin.into()),
            last_attempt_at: Some(now),
            ..Self::default()
        }
    }

    /// Storage column names of the staged fields, in column order.
    pub fn staged_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.origin.is_some() {
            fields.push(FAVICON_ORIGIN);
        }
        if self.last_attempt_at.is_some() {
            fields.push(FAVICON_LAST_ATTEMPT_AT);
        }
        if self.data.is_some() {
            fields.push(FAVICON_DATA);
        }
        if self.content_type.is_some() {
            fields.push(FAVICON_CONTENT_TYPE);
        }
        if self.fetched_at.is_some() {
            fields.push(FAVICON_FETCHED_AT);
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.staged_fields().is_empty()
    }

    /// True when this update replaces the stored favicon content.
    pub fn replaces_favicon(&self) -> bool {
        self.data.is_some()
    }
}

/// Outcome of one collection attempt for a site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionResult {
    /// `None` when the site has no origin configured.
    pub updates: Option<FaviconUpdate>,
    pub should_notify: bool,
    /// Set to the attempt time exactly when `should_notify` is true.
    pub event_at: Option<DateTime<Utc>>,
}
