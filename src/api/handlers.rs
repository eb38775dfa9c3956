use super::models::{AppState, FlashLevel};
use super::views;
use crate::models::{ActivePairSummary, PairDescriptor};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// Rows shown on the index page.
pub const INDEX_LIMIT: i64 = 20;

/// GET /health: simple liveness check
pub async fn health() -> &'static str {
    "OK"
}

/// GET /: first stored pairs by name, plus pending flash messages
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let loaded = async {
        let pairs = state.store.list(INDEX_LIMIT).await?;
        let total = state.store.count().await?;
        Ok::<_, sqlx::Error>((pairs, total))
    };

    match loaded.await {
        Ok((pairs, total)) => {
            // drained only once the page can actually show them
            let flashes = state.take_flashes().await;
            Html(views::futures_page(&pairs, total, &flashes)).into_response()
        }
        Err(e) => {
            tracing::error!("[api] failed to load stored pairs: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to load stored pairs").into_response()
        }
    }
}

/// GET /refresh: rebuilds the stored table, then back to the index
pub async fn refresh(State(state): State<Arc<AppState>>) -> Redirect {
    let _running = state.refresh_lock().lock().await;

    match state.orchestrator.refresh().await {
        Ok(result) => {
            let mut message = format!(
                "Data refreshed successfully! {} pairs stored",
                result.pairs_processed
            );
            if result.pairs_failed > 0 {
                message.push_str(&format!(", {} skipped", result.pairs_failed));
            }
            message.push('.');
            state.flash(FlashLevel::Success, message).await;
        }
        Err(e) => {
            state
                .flash(FlashLevel::Error, format!("Error refreshing data: {e}"))
                .await;
        }
    }

    Redirect::to("/")
}

fn summaries(pairs: &[PairDescriptor]) -> Vec<ActivePairSummary> {
    pairs
        .iter()
        .filter(|p| p.is_object())
        .map(ActivePairSummary::from_descriptor)
        .collect()
}

/// GET /active: live active pairs, straight from the exchange
pub async fn active_pairs(State(state): State<Arc<AppState>>) -> Response {
    match state.exchange.fetch_active_pairs().await {
        Ok(pairs) => {
            let pairs = summaries(&pairs);
            tracing::info!("[api] retrieved {} active pairs from API", pairs.len());
            Html(views::active_pairs_page(&pairs)).into_response()
        }
        Err(e) => {
            tracing::error!("[api] error fetching active pairs: {e}");
            state
                .flash(FlashLevel::Error, format!("Error fetching active pairs: {e}"))
                .await;
            Redirect::to("/").into_response()
        }
    }
}

/// GET /usdt: live USDT-quoted pairs, straight from the exchange
pub async fn usdt_pairs(State(state): State<Arc<AppState>>) -> Response {
    match state.exchange.fetch_usdt_pairs().await {
        Ok(pairs) => {
            let pairs = summaries(&pairs);
            tracing::info!("[api] retrieved {} USDT pairs from API", pairs.len());
            Html(views::usdt_pairs_page(&pairs)).into_response()
        }
        Err(e) => {
            tracing::error!("[api] error fetching USDT pairs: {e}");
            state
                .flash(FlashLevel::Error, format!("Error fetching USDT pairs: {e}"))
                .await;
            Redirect::to("/").into_response()
        }
    }
}
