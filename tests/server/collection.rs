use std::time::Duration;

use chrono::{TimeZone, Utc};
use feedbackd::application::services::FaviconCollector;
use feedbackd::domain::favicons::{
    FAVICON_CONTENT_TYPE, FAVICON_DATA, FAVICON_FETCHED_AT, FAVICON_LAST_ATTEMPT_AT,
    FAVICON_ORIGIN,
};
use feedbackd::domain::resolver::ResolveError;
use feedbackd::infrastructure::favicon::ResolverConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

use crate::helpers::{
    PNG_BYTES, image_response, insert_site, refresh_harness, test_resolver, test_resolver_config,
};

async fn png_origin() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(image_response(PNG_BYTES, "image/png"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn changed_favicon_is_staged_and_stored() {
    let server = png_origin().await;
    let harness = refresh_harness(&test_resolver_config(), 1).await;
    let site = insert_site(&harness.site_repo, Some(server.uri().as_str())).await;
    let collector = FaviconCollector::new(test_resolver(&test_resolver_config()));
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

    let result = collector
        .collect(&site.favicon, &server.uri(), false, now)
        .await
        .expect("collection failed");

    let updates = result.updates.expect("updates staged");
    assert_eq!(
        updates.staged_fields(),
        vec![
            FAVICON_ORIGIN,
            FAVICON_LAST_ATTEMPT_AT,
            FAVICON_DATA,
            FAVICON_CONTENT_TYPE,
            FAVICON_FETCHED_AT
        ]
    );
    assert!(result.should_notify);
    assert_eq!(result.event_at, Some(now));

    harness
        .site_repo
        .apply_favicon_update(site.id, &updates)
        .await
        .expect("update failed");
    let stored = harness.site_repo.get(site.id).await.expect("site missing");
    assert_eq!(stored.favicon.data, PNG_BYTES);
    assert_eq!(stored.favicon.content_type, "image/png");
    assert_eq!(stored.favicon.fetched_at, Some(now));
    assert_eq!(stored.favicon_last_attempt_at, Some(now));
    assert_eq!(stored.favicon_origin.as_deref(), Some(server.uri().as_str()));
}

#[tokio::test]
async fn second_collection_of_unchanged_favicon_does_not_notify() {
    let server = png_origin().await;
    let harness = refresh_harness(&test_resolver_config(), 1).await;
    let site = insert_site(&harness.site_repo, Some(server.uri().as_str())).await;
    let collector = FaviconCollector::new(test_resolver(&test_resolver_config()));

    let first_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let first = collector
        .collect(&site.favicon, &server.uri(), false, first_at)
        .await
        .expect("collection failed");
    assert!(first.should_notify);
    harness
        .site_repo
        .apply_favicon_update(site.id, first.updates.as_ref().unwrap())
        .await
        .expect("update failed");

    let site = harness.site_repo.get(site.id).await.expect("site missing");
    let second_at = Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap();
    let second = collector
        .collect(&site.favicon, &server.uri(), false, second_at)
        .await
        .expect("collection failed");

    assert!(!second.should_notify);
    assert!(second.event_at.is_none());
    let updates = second.updates.expect("updates staged");
    assert_eq!(
        updates.staged_fields(),
        vec![FAVICON_ORIGIN, FAVICON_LAST_ATTEMPT_AT, FAVICON_FETCHED_AT]
    );

    harness
        .site_repo
        .apply_favicon_update(site.id, &updates)
        .await
        .expect("update failed");
    let site = harness.site_repo.get(site.id).await.expect("site missing");
    assert_eq!(site.favicon.fetched_at, Some(second_at));
    assert_eq!(site.favicon.data, PNG_BYTES);
}

#[tokio::test]
async fn resolver_failure_returns_attempt_only_updates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(image_response(PNG_BYTES, "image/png").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = ResolverConfig {
        deadline: Duration::from_millis(200),
        ..test_resolver_config()
    };
    let collector = FaviconCollector::new(test_resolver(&config));
    let now = Utc::now();

    let failure = collector
        .collect(&Default::default(), &server.uri(), false, now)
        .await
        .expect_err("expected collection failure");

    assert_eq!(
        failure.attempted.staged_fields(),
        vec![FAVICON_ORIGIN, FAVICON_LAST_ATTEMPT_AT]
    );
    assert_eq!(failure.attempted.last_attempt_at, Some(now));
    assert!(matches!(failure.source, ResolveError::DeadlineExceeded(_)));
}

#[tokio::test]
async fn empty_origin_yields_empty_result() {
    let collector = FaviconCollector::new(test_resolver(&test_resolver_config()));

    let result = collector
        .collect(&Default::default(), "", false, Utc::now())
        .await
        .expect("collection failed");

    assert!(result.updates.is_none());
    assert!(!result.should_notify);
    assert!(result.event_at.is_none());
}
