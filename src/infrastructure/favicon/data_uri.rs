use base64::{Engine, engine::general_purpose::STANDARD};

use crate::domain::favicons::Asset;

const DEFAULT_MEDIA_TYPE: &str = "text/plain;charset=US-ASCII";
const BASE64_MARKER: &str = ";base64";

pub fn is_data_uri(href: &str) -> bool {
    href.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Decode a `data:[<mediatype>][;base64],<payload>` URI into an asset.
///
/// Returns `None` for malformed URIs. Payloads without the base64 marker are
/// taken as literal bytes.
pub fn decode(href: &str) -> Option<Asset> {
    if !is_data_uri(href) {
        return None;
    }
    let (meta, payload) = href[5..].split_once(',')?;

    let meta = meta.trim();
    let split = meta.len().saturating_sub(BASE64_MARKER.len());
    let is_base64 = meta
        .get(split..)
        .is_some_and(|marker| marker.eq_ignore_ascii_case(BASE64_MARKER));
    let media_type = if is_base64 {
        meta[..split].trim()
    } else {
        meta
    };
    let content_type = if media_type.is_empty() || media_type.starts_with(';') {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        media_type.to_string()
    };

    let data = if is_base64 {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD.decode(compact).ok()?
    } else {
        payload.as_bytes().to_vec()
    };

    Some(Asset { content_type, data })
}
