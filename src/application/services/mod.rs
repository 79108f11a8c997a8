pub mod favicon_refresh;
pub mod favicons;

pub use favicon_refresh::{FaviconRefresher, RefreshError, RefreshSummary, SiteRefresh};
pub use favicons::{CollectionFailure, FaviconCollector};
