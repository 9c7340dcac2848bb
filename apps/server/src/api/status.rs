use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use oracle_market_data::WindowUsage;
use serde::Serialize;

use crate::main_lib::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    name: &'static str,
    entries: usize,
    ttl_secs: u64,
    max_entries: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStatus {
    providers: Vec<WindowUsage>,
    caches: Vec<CacheStatus>,
    timestamp: DateTime<Utc>,
}

/// Quota usage per provider and entry counts per route cache.
#[utoipa::path(
    get,
    path = "/api/data/status",
    responses((status = 200, description = "Provider quotas and cache sizes"))
)]
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<GatewayStatus> {
    let limiter = state.gateway.limiter();
    let providers = state
        .provider_ids()
        .into_iter()
        .map(|id| limiter.usage(id))
        .collect();
    let caches = state
        .caches
        .all()
        .into_iter()
        .map(|cache| {
            let policy = cache.policy();
            CacheStatus {
                name: cache.name(),
                entries: cache.len(),
                ttl_secs: policy.ttl.as_secs(),
                max_entries: policy.max_entries,
            }
        })
        .collect();
    Json(GatewayStatus {
        providers,
        caches,
        timestamp: Utc::now(),
    })
}
