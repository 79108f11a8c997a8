use scraper::{Html, Selector};

const ICON_REL: &str = "icon";
const TOUCH_ICON_RELS: [&str; 2] = ["apple-touch-icon", "apple-touch-icon-precomposed"];

/// Extracts the favicon `href` from an HTML document.
///
/// The first `<link>` whose `rel` tokens include `icon` wins (this covers
/// `rel="shortcut icon"`). Apple touch icons are only used when no regular
/// icon link exists. Hrefs are returned as written, without resolution.
pub fn find_icon_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("link[rel][href]").ok()?;

    let mut touch_icon = None;
    for element in document.select(&selector) {
        let Some(href) = element
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|h| !h.is_empty())
        else {
            continue;
        };
        let rel = element.value().attr("rel").unwrap_or_default();
        let mut tokens = rel.split_ascii_whitespace();

        if tokens.clone().any(|t| t.eq_ignore_ascii_case(ICON_REL)) {
            return Some(href.to_string());
        }
        if touch_icon.is_none()
            && tokens.any(|t| TOUCH_ICON_RELS.iter().any(|r| t.eq_ignore_ascii_case(r)))
        {
            touch_icon = Some(href.to_string());
        }
    }

    touch_icon
}
