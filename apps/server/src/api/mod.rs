use std::sync::Arc;

use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{config::Config, main_lib::AppState};

mod crypto;
mod health;
mod market_summary;
mod news;
mod search;
mod shared;
mod status;
mod stocks;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        stocks::get_stock_data,
        crypto::get_crypto_data,
        news::get_news,
        search::search_symbols,
        market_summary::get_market_summary,
        status::get_status
    ),
    tags((name = "market-oracle"))
)]
pub struct ApiDoc;

/// Answer CORS preflights with 204 instead of an empty 200.
async fn preflight_no_content(req: Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };
    cors.allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = cors_layer(config);
    let openapi = ApiDoc::openapi();

    let data = Router::new()
        .route("/stocks", get(stocks::get_stock_data))
        .route("/crypto", get(crypto::get_crypto_data))
        .route("/news", get(news::get_news))
        .route("/search", get(search::search_symbols))
        .route("/market-summary", get(market_summary::get_market_summary))
        .route("/status", get(status::get_status));

    let api = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .nest("/data", data);

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(preflight_no_content))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
