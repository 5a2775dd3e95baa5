//! API Handlers
//!
//! HTTP request handlers for each cache engine endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheReport, SetOptions, TierLevel, TieredCache, DEFAULT_TTL_SECONDS};
use crate::error::{CacheError, Result};
use crate::models::{
    ClearRequest, ClearResponse, GetResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// The engine synchronizes internally per tier, so handlers share it
/// without an outer lock.
#[derive(Clone)]
pub struct AppState {
    /// The cache engine
    pub cache: Arc<TieredCache>,
}

impl AppState {
    /// Creates a new AppState around an engine instance.
    pub fn new(cache: Arc<TieredCache>) -> Self {
        Self { cache }
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair with optional TTL, tags, and persistence.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let options = SetOptions {
        ttl_seconds: req.ttl.unwrap_or(DEFAULT_TTL_SECONDS),
        tags: req.tags.unwrap_or_default(),
        persistent: req.persistent.unwrap_or(false),
    };
    state.cache.set(&req.key, req.value, options);

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value through the tier chain; 404 on a miss.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for POST /invalidate
///
/// Removes entries by key substring and/or tags from every enabled tier.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Json<InvalidateResponse> {
    let removed = state
        .cache
        .invalidate(req.pattern.as_deref(), req.tags.as_deref());

    Json(InvalidateResponse::new(removed))
}

/// Handler for POST /clear
///
/// Wipes the selected tiers; with no body or "all", wipes everything.
pub async fn clear_handler(
    State(state): State<AppState>,
    Json(req): Json<ClearRequest>,
) -> Result<Json<ClearResponse>> {
    let names = match req.levels {
        None => vec!["all".to_string()],
        Some(names) => names,
    };

    if names.iter().any(|name| name == "all") {
        state.cache.clear_all();
        return Ok(Json(ClearResponse::new(["all"])));
    }

    let levels = names
        .iter()
        .map(|name| name.parse::<TierLevel>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(CacheError::InvalidRequest)?;
    state.cache.clear(&levels);

    Ok(Json(ClearResponse::new(names)))
}

/// Handler for GET /stats
///
/// Returns aggregate counters plus per-tier occupancy.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheReport> {
    Json(state.cache.statistics())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    fn test_state() -> AppState {
        let config = Config {
            fast_tier_max_entries: 100,
            scoped_tier_enabled: false,
            durable_tier_enabled: false,
            ..Config::default()
        };
        AppState::new(Arc::new(TieredCache::new(&config).unwrap()))
    }

    fn set_request(key: &str, value: serde_json::Value) -> SetRequest {
        SetRequest {
            key: key.to_string(),
            value,
            ttl: None,
            tags: None,
            persistent: None,
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let result = set_handler(
            State(state.clone()),
            Json(set_request("test_key", json!("test_value"))),
        )
        .await;
        assert!(result.is_ok());

        let result = get_handler(State(state.clone()), Path("test_key".to_string())).await;
        let response = result.unwrap();
        assert_eq!(response.value, json!("test_value"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let state = test_state();

        let mut req = set_request("tagged", json!(1));
        req.tags = Some(vec!["hot".to_string()]);
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let response = invalidate_handler(
            State(state.clone()),
            Json(InvalidateRequest {
                pattern: None,
                tags: Some(vec!["hot".to_string()]),
            }),
        )
        .await;
        assert_eq!(response.removed, 1);

        let result = get_handler(State(state), Path("tagged".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_clear_handler_rejects_unknown_level() {
        let state = test_state();

        let result = clear_handler(
            State(state),
            Json(ClearRequest {
                levels: Some(vec!["l9".to_string()]),
            }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_clear_handler_defaults_to_all() {
        let state = test_state();
        set_handler(State(state.clone()), Json(set_request("key1", json!(1))))
            .await
            .unwrap();

        clear_handler(State(state.clone()), Json(ClearRequest::default()))
            .await
            .unwrap();

        let result = get_handler(State(state), Path("key1".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.counters.total_hits, 0);
        assert_eq!(response.counters.misses, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let result = set_handler(State(state), Json(set_request("", json!(1)))).await;
        assert!(result.is_err());
    }
}
