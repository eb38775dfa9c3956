use super::handlers;
use super::models::AppState;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds and returns the full Axum router with all routes and shared state.
pub fn build(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/refresh", get(handlers::refresh))
        .route("/active", get(handlers::active_pairs))
        .route("/usdt", get(handlers::usdt_pairs))
        .route("/health", get(handlers::health))
        .layer(cors(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| {
                HeaderValue::from_str(o)
                    .inspect_err(|_| tracing::warn!("[api] ignoring invalid CORS origin {o:?}"))
                    .ok()
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExchangeError;
    use crate::exchanges::FuturesData;
    use crate::models::{PairDescriptor, PairDetails};
    use crate::store::{PairStore, memory_pool};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct StubExchange {
        active: Option<Value>,
    }

    #[async_trait]
    impl FuturesData for StubExchange {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_active_pairs(&self) -> Result<Vec<PairDescriptor>, ExchangeError> {
            let raw = self
                .active
                .clone()
                .ok_or_else(|| ExchangeError::UnexpectedFormat("exchange offline".into()))?;
            crate::exchanges::coindcx::normalize_active_pairs(raw)
        }

        async fn fetch_pair_details(&self, pair: &str) -> Result<PairDetails, ExchangeError> {
            crate::exchanges::coindcx::normalize_pair_details(
                pair,
                json!({"kind": "perpetual", "status": "active", "tick_size": "0.1", "price_band_upper": "100"}),
            )
        }
    }

    async fn app(active: Option<Value>) -> Router {
        let store = PairStore::new(memory_pool().await);
        let state = Arc::new(AppState::new(Arc::new(StubExchange { active }), store));
        build(state, &["*".to_string()])
    }

    async fn get_path(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app(None).await;
        let response = get_path(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn refresh_redirects_and_index_shows_rows() {
        let app = app(Some(json!(["ETHUSDT", "BTCUSDT"]))).await;

        let response = get_path(&app, "/refresh").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let html = body_text(get_path(&app, "/").await).await;
        assert!(html.contains("Data refreshed successfully! 2 pairs stored."));
        let btc = html.find("<td>BTCUSDT</td>").unwrap();
        let eth = html.find("<td>ETHUSDT</td>").unwrap();
        assert!(btc < eth);

        // flashes are shown once
        let html = body_text(get_path(&app, "/").await).await;
        assert!(!html.contains("Data refreshed successfully"));
    }

    #[tokio::test]
    async fn index_lists_at_most_twenty() {
        let names: Vec<String> = (0..25).map(|i| format!("P{i:02}USDT")).collect();
        let app = app(Some(json!(names))).await;

        get_path(&app, "/refresh").await;
        let html = body_text(get_path(&app, "/").await).await;

        assert!(html.contains("Showing 20 of 25 stored pairs."));
        assert!(html.contains("<td>P19USDT</td>"));
        assert!(!html.contains("<td>P20USDT</td>"));
    }

    #[tokio::test]
    async fn refresh_failure_flashes_error() {
        let app = app(None).await;

        let response = get_path(&app, "/refresh").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let html = body_text(get_path(&app, "/").await).await;
        assert!(html.contains("Error refreshing data: active pairs unavailable"));
    }

    #[tokio::test]
    async fn flashes_survive_a_failed_index() {
        let store = PairStore::new(memory_pool().await);
        let state = Arc::new(AppState::new(Arc::new(StubExchange { active: None }), store));
        let app = build(Arc::clone(&state), &["*".to_string()]);

        get_path(&app, "/refresh").await;
        sqlx::query("DROP TABLE futures_pairs")
            .execute(state.store.pool())
            .await
            .unwrap();

        let response = get_path(&app, "/").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        crate::store::ensure_schema(state.store.pool()).await.unwrap();
        let html = body_text(get_path(&app, "/").await).await;
        assert!(html.contains("Error refreshing data"));
    }

    #[tokio::test]
    async fn active_renders_live_pairs() {
        let app = app(Some(json!([
            {"pair": "B-BTC_USDT", "base_currency": "BTC", "quote_currency": "USDT", "last_price": "64000"},
            {"pair": "B-ETH_INR", "base_currency": "ETH", "quote_currency": "INR"},
        ])))
        .await;

        let response = get_path(&app, "/active").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<td>B-BTC_USDT</td>"));
        assert!(html.contains("<td>64000</td>"));
        assert!(html.contains("<td>B-ETH_INR</td>"));
    }

    #[tokio::test]
    async fn usdt_filters_live_pairs() {
        let app = app(Some(json!(["BTCUSDT", "ETHINR"]))).await;

        let html = body_text(get_path(&app, "/usdt").await).await;
        assert!(html.contains("<td>BTCUSDT</td>"));
        assert!(!html.contains("ETHINR"));
    }

    #[tokio::test]
    async fn live_fetch_error_redirects_with_flash() {
        let app = app(None).await;

        let response = get_path(&app, "/active").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let response = get_path(&app, "/usdt").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let html = body_text(get_path(&app, "/").await).await;
        assert!(html.contains("Error fetching active pairs: unexpected response format: exchange offline"));
        assert!(html.contains("Error fetching USDT pairs"));
    }
}
