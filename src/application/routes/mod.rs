pub mod sites;

use axum::http::Request;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

use crate::application::state::AppState;

pub fn app_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .nest("/api/v1", api_router())
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .make_span_with(FeedbackMakeSpan)
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            ),
        )
        .with_state(state)
}

fn api_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/sites", post(sites::create_site))
        .route("/sites/{id}", get(sites::get_site))
        .route("/sites/{id}/favicon", get(sites::get_favicon))
        .route(
            "/sites/{id}/favicon/refresh",
            post(sites::refresh_favicon),
        )
}

#[derive(Clone)]
struct FeedbackMakeSpan;

impl<B> MakeSpan<B> for FeedbackMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
        )
    }
}
