pub mod handlers;
pub mod models;
pub mod router;
pub mod views;

use crate::config::Config;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use models::AppState;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Wraps the application state in an Arc for shared handler access.
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Binds the server to the configured port and serves until `shutdown` resolves.
    pub async fn run(
        self,
        config: &Config,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let app = router::build(Arc::clone(&self.state), &config.cors_origins)
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
        let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));

        tracing::info!("API server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
