use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::catalog::HazardCategory;
use crate::engine::{FeedEngine, FeedSnapshot};
use crate::item::FeedItem;
use crate::location::LocationContext;
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FeedEngine>,
    pub metrics: Option<Metrics>,
}

impl AppState {
    pub fn new(engine: Arc<FeedEngine>) -> Self {
        Self {
            engine,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let mut router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/feed", get(feed))
        .route("/feed/category", get(feed_by_category))
        .route("/feed/breaking", get(feed_breaking))
        .route("/feed/urgent", get(feed_urgent))
        .route("/location", post(update_location))
        .route("/refresh", post(refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if let Some(m) = metrics {
        router = router.merge(m.router());
    }
    router
}

async fn feed(State(state): State<AppState>) -> Json<FeedSnapshot> {
    Json(state.engine.snapshot())
}

#[derive(Deserialize)]
struct CategoryQuery {
    #[serde(default)]
    category: Option<String>,
}

async fn feed_by_category(
    State(state): State<AppState>,
    Query(q): Query<CategoryQuery>,
) -> Result<Json<Vec<FeedItem>>, (StatusCode, String)> {
    let category = match q.category.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<HazardCategory>()
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
        ),
    };
    Ok(Json(state.engine.by_category(category)))
}

async fn feed_breaking(State(state): State<AppState>) -> Json<Vec<FeedItem>> {
    Json(state.engine.breaking())
}

async fn feed_urgent(State(state): State<AppState>) -> Json<Vec<FeedItem>> {
    Json(state.engine.urgent_or_high())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationResp {
    cache_hit: bool,
    feed: FeedSnapshot,
}

/// Accepts a location (or `null`). A cached feed is returned right away; the
/// refresh runs in the background.
async fn update_location(
    State(state): State<AppState>,
    Json(location): Json<Option<LocationContext>>,
) -> Json<LocationResp> {
    let present = location.is_some();
    let cache_hit = state.engine.set_location(location);

    if present {
        let engine = state.engine.clone();
        tokio::spawn(async move {
            if let Err(e) = engine.refresh().await {
                tracing::warn!(target: "feed", error = %e, "background refresh failed");
            }
        });
    }

    Json(LocationResp {
        cache_hit,
        feed: state.engine.snapshot(),
    })
}

/// Runs a refresh to completion. Fetch failures are reported in `error`.
async fn refresh(State(state): State<AppState>) -> Json<FeedSnapshot> {
    if let Err(e) = state.engine.refresh().await {
        tracing::debug!(target: "feed", error = %e, "refresh via api failed");
    }
    Json(state.engine.snapshot())
}
