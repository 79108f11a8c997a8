use std::time::Duration;

use feedbackd::domain::resolver::ResolveError;
use feedbackd::infrastructure::favicon::{HttpFaviconResolver, ResolverConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::{
    ICO_BYTES, PNG_BYTES, html_response, image_response, page_with_icon, test_resolver,
    test_resolver_config,
};

#[tokio::test]
async fn favicon_ico_short_circuits_the_chain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(image_response(ICO_BYTES, "image/x-icon"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(&page_with_icon("/other.png")))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = test_resolver(&test_resolver_config());

    let asset = resolver
        .resolve_asset(&server.uri())
        .await
        .expect("resolution failed")
        .expect("no favicon found");
    assert_eq!(asset.content_type, "image/x-icon");
    assert_eq!(asset.data, ICO_BYTES);

    let url = resolver
        .resolve(&server.uri())
        .await
        .expect("resolution failed");
    assert_eq!(url, Some(format!("{}/favicon.ico", server.uri())));
}

#[tokio::test]
async fn resolved_icon_carries_url_and_asset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(image_response(ICO_BYTES, "image/x-icon"))
        .mount(&server)
        .await;

    let resolver =
        HttpFaviconResolver::new(&test_resolver_config()).expect("Failed to build resolver");
    let icon = resolver
        .resolve_icon(&server.uri())
        .await
        .expect("resolution failed")
        .expect("no favicon found");

    assert_eq!(icon.url, format!("{}/favicon.ico", server.uri()));
    assert_eq!(icon.asset.content_type, "image/x-icon");
    assert_eq!(icon.asset.data, ICO_BYTES);
}

#[tokio::test]
async fn follows_root_relative_icon_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(&page_with_icon("/static/icon.png")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/static/icon.png"))
        .respond_with(image_response(PNG_BYTES, "image/png"))
        .mount(&server)
        .await;

    let resolver = test_resolver(&test_resolver_config());
    let asset = resolver
        .resolve_asset(&server.uri())
        .await
        .expect("resolution failed")
        .expect("no favicon found");

    assert_eq!(asset.content_type, "image/png");
    assert_eq!(asset.data, PNG_BYTES);
}

#[tokio::test]
async fn follows_document_relative_icon_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(&page_with_icon("assets/icon.svg")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assets/icon.svg"))
        .respond_with(image_response(b"<svg/>", "image/svg+xml"))
        .mount(&server)
        .await;

    let resolver = test_resolver(&test_resolver_config());
    let url = resolver
        .resolve(&server.uri())
        .await
        .expect("resolution failed");

    assert_eq!(url, Some(format!("{}/assets/icon.svg", server.uri())));
}

#[tokio::test]
async fn decodes_inline_data_uri_icon() {
    let server = MockServer::start().await;
    let data_uri = "data:image/svg+xml;base64,PHN2Zy8+";
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(&page_with_icon(data_uri)))
        .mount(&server)
        .await;

    let resolver = test_resolver(&test_resolver_config());

    let asset = resolver
        .resolve_asset(&server.uri())
        .await
        .expect("resolution failed")
        .expect("no favicon found");
    assert_eq!(asset.content_type, "image/svg+xml");
    assert_eq!(asset.data, b"<svg/>");

    let url = resolver
        .resolve(&server.uri())
        .await
        .expect("resolution failed");
    assert_eq!(url.as_deref(), Some(data_uri));
}

#[tokio::test]
async fn non_image_favicon_falls_through_to_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not found", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(&page_with_icon("/icon.png")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/icon.png"))
        .respond_with(image_response(PNG_BYTES, "image/png"))
        .mount(&server)
        .await;

    let resolver = test_resolver(&test_resolver_config());
    let asset = resolver
        .resolve_asset(&server.uri())
        .await
        .expect("resolution failed")
        .expect("no favicon found");

    assert_eq!(asset.data, PNG_BYTES);
}

#[tokio::test]
async fn non_image_icon_link_is_absent_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(&page_with_icon("/icon.txt")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/icon.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hello", "text/plain"))
        .mount(&server)
        .await;

    let resolver = test_resolver(&test_resolver_config());
    let asset = resolver
        .resolve_asset(&server.uri())
        .await
        .expect("resolution failed");

    assert!(asset.is_none());
}

#[tokio::test]
async fn page_without_icon_link_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("<html><head><title>x</title></head></html>"))
        .mount(&server)
        .await;

    let resolver = test_resolver(&test_resolver_config());
    let asset = resolver
        .resolve_asset(&server.uri())
        .await
        .expect("resolution failed");

    assert!(asset.is_none());
}

#[tokio::test]
async fn falls_back_to_subpath_document_when_root_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app"))
        .respond_with(html_response(&page_with_icon("/app/icon.png")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app/icon.png"))
        .respond_with(image_response(PNG_BYTES, "image/png"))
        .mount(&server)
        .await;

    let resolver = test_resolver(&test_resolver_config());
    let origin = format!("{}/app", server.uri());
    let url = resolver.resolve(&origin).await.expect("resolution failed");

    assert_eq!(url, Some(format!("{}/app/icon.png", server.uri())));
}

#[tokio::test]
async fn subpath_document_is_skipped_when_root_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("<html><head></head></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app"))
        .respond_with(html_response(&page_with_icon("/app/icon.png")))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = test_resolver(&test_resolver_config());
    let origin = format!("{}/app", server.uri());
    let asset = resolver
        .resolve_asset(&origin)
        .await
        .expect("resolution failed");

    assert!(asset.is_none());
}

#[tokio::test]
async fn unreachable_origin_is_absent_not_error() {
    // Bind then drop a listener to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");
    drop(listener);

    let resolver = test_resolver(&test_resolver_config());
    let asset = resolver
        .resolve_asset(&format!("http://{addr}"))
        .await
        .expect("resolution failed");

    assert!(asset.is_none());
}

#[tokio::test]
async fn oversized_icon_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(image_response(&[0_u8; 64], "image/x-icon"))
        .mount(&server)
        .await;

    let config = ResolverConfig {
        max_body_bytes: 16,
        ..test_resolver_config()
    };
    let resolver = test_resolver(&config);
    let asset = resolver
        .resolve_asset(&server.uri())
        .await
        .expect("resolution failed");

    assert!(asset.is_none());
}

#[tokio::test]
async fn exceeding_the_deadline_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(
            image_response(ICO_BYTES, "image/x-icon").set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ResolverConfig {
        deadline: Duration::from_millis(200),
        ..test_resolver_config()
    };
    let resolver = test_resolver(&config);
    let err = resolver
        .resolve_asset(&server.uri())
        .await
        .expect_err("expected deadline error");

    assert!(matches!(err, ResolveError::DeadlineExceeded(_)));
}

#[tokio::test]
async fn invalid_origin_is_an_error() {
    let resolver = test_resolver(&test_resolver_config());
    let err = resolver
        .resolve_asset("not a url")
        .await
        .expect_err("expected invalid origin");

    assert!(matches!(err, ResolveError::InvalidOrigin { .. }));
}
