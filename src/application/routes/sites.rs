use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{
    CACHE_CONTROL, CONTENT_SECURITY_POLICY, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS,
};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::errors::AppError;
use crate::application::state::AppState;
use crate::domain::favicons::is_image_content_type;
use crate::domain::ids::SiteId;
use crate::domain::sites::{NewSite, Site};

const FAVICON_CACHE_CONTROL: &str = "public, max-age=3600";
const FAVICON_CSP: &str = "default-src 'none'; style-src 'unsafe-inline'; sandbox";

#[derive(Debug, Serialize, Deserialize)]
pub struct SiteResponse {
    pub id: SiteId,
    pub name: String,
    pub origin: Option<String>,
    pub has_favicon: bool,
    pub favicon_content_type: Option<String>,
    pub favicon_fetched_at: Option<DateTime<Utc>>,
    pub favicon_last_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Site> for SiteResponse {
    fn from(site: Site) -> Self {
        let has_favicon = site.favicon.has_favicon();
        Self {
            id: site.id,
            name: site.name,
            origin: site.origin,
            has_favicon,
            favicon_content_type: Some(site.favicon.content_type).filter(|c| !c.is_empty()),
            favicon_fetched_at: site.favicon.fetched_at,
            favicon_last_attempt_at: site.favicon_last_attempt_at,
            created_at: site.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub changed: bool,
    pub notified: bool,
    pub event_at: Option<DateTime<Utc>>,
}

#[tracing::instrument(skip(state, new_site))]
pub(crate) async fn create_site(
    State(state): State<AppState>,
    Json(new_site): Json<NewSite>,
) -> Result<(StatusCode, Json<SiteResponse>), AppError> {
    let new_site = new_site.normalize();
    if new_site.name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if let Some(origin) = &new_site.origin {
        let valid = url::Url::parse(origin)
            .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host());
        if !valid {
            return Err(AppError::validation("origin must be an absolute http(s) URL"));
        }
    }

    let site = state.site_repo.insert(new_site).await?;
    info!(site_id = %site.id, "site created");

    Ok((StatusCode::CREATED, Json(SiteResponse::from(site))))
}

pub(crate) async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<SiteId>,
) -> Result<Json<SiteResponse>, AppError> {
    let site = state.site_repo.get(id).await?;
    Ok(Json(SiteResponse::from(site)))
}

pub(crate) async fn get_favicon(
    State(state): State<AppState>,
    Path(id): Path<SiteId>,
) -> Result<Response, AppError> {
    let site = state.site_repo.get(id).await?;
    // Inline icons are stored with whatever type they declared.
    if !site.favicon.has_favicon() || !is_image_content_type(&site.favicon.content_type) {
        return Err(AppError::NotFound);
    }

    Ok((
        [
            (CONTENT_TYPE, site.favicon.content_type),
            (CACHE_CONTROL, FAVICON_CACHE_CONTROL.to_string()),
            (X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            (CONTENT_SECURITY_POLICY, FAVICON_CSP.to_string()),
        ],
        site.favicon.data,
    )
        .into_response())
}

/// Re-collect the favicon now and push an event even if nothing changed.
#[tracing::instrument(skip(state))]
pub(crate) async fn refresh_favicon(
    State(state): State<AppState>,
    Path(id): Path<SiteId>,
) -> Result<Json<RefreshResponse>, AppError> {
    let site = state.site_repo.get(id).await?;
    if site.origin.is_none() {
        return Err(AppError::Conflict(
            "site has no origin configured".to_string(),
        ));
    }

    let refresh = state.favicon_refresher.refresh_site(&site, true).await?;
    info!(
        site_id = %site.id,
        changed = refresh.changed,
        notified = refresh.notified,
        "favicon refreshed on demand"
    );

    Ok(Json(RefreshResponse {
        changed: refresh.changed,
        notified: refresh.notified,
        event_at: refresh.event_at,
    }))
}
