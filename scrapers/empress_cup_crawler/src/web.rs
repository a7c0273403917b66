use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::{future::Future, sync::Arc};
use tracing::{error, info};

use crate::crawler::{CrawlOutcome, ScheduleCrawler};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrawlResponse {
    Success {
        matches_updated: usize,
        timestamp: String,
    },
    NoUpdates,
    Error {
        message: String,
    },
}

#[derive(Clone)]
pub struct AppState {
    pub crawler: Arc<ScheduleCrawler>,
}

#[axum::debug_handler]
pub async fn crawl_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.crawler.run().await {
        Ok(CrawlOutcome::Updated {
            matches_updated,
            timestamp,
        }) => (
            StatusCode::OK,
            Json(CrawlResponse::Success {
                matches_updated,
                timestamp: timestamp.to_rfc3339(),
            }),
        ),
        Ok(CrawlOutcome::NoUpdates) => (StatusCode::OK, Json(CrawlResponse::NoUpdates)),
        Err(e) => {
            error!("Crawl failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CrawlResponse::Error {
                    message: e.to_string(),
                }),
            )
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/crawl", post(crawl_handler))
        .with_state(state)
}

pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
