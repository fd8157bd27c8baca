use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process and publish the cache TTL.
    /// Later calls reuse the installed recorder.
    pub fn init(ttl_secs: i64) -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new().install_recorder()?;
                describe();
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();

        // Static gauge with current TTL (absolute TTL, no sliding refresh)
        gauge!("feed_cache_ttl_secs").set(ttl_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("feed_refresh_total", "Refreshes started.");
    describe_counter!("feed_refresh_errors_total", "Refreshes that failed in the fetch step.");
    describe_counter!(
        "feed_stale_refresh_discarded_total",
        "Refresh results dropped because a newer refresh or location change started."
    );
    describe_counter!("feed_cache_hits_total", "Freshness cache hits.");
    describe_counter!("feed_cache_misses_total", "Freshness cache misses (absent, expired, other location).");
    describe_counter!("feed_cache_store_errors_total", "Cache storage read/write failures.");
    describe_gauge!("feed_items_gauge", "Items in the live feed.");
    describe_gauge!("feed_cache_ttl_secs", "Configured freshness TTL in seconds.");
}
