use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::aggregate::{self, RiderAlert};
use crate::calendar::{self, RaceEntry};
use crate::ingest::{
    self,
    config::FeedSpec,
    providers::SyndicationProvider,
    types::{Article, FeedProvider, FeedStatus},
};
use crate::roster::{self, Rider};

#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<Vec<Rider>>,
    pub feeds: Arc<Vec<FeedSpec>>,
    pub client: reqwest::Client,
}

impl AppState {
    /// Roster and feed list from the default config paths; falls back to the
    /// embedded seeds.
    pub fn from_env() -> Self {
        let feeds = ingest::config::load_feeds_default().unwrap_or_else(|e| {
            tracing::warn!(error = ?e, "feeds config failed, using seed");
            ingest::config::default_seed()
        });
        Self {
            roster: roster::load_cached(),
            feeds: Arc::new(feeds),
            client: reqwest::Client::new(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/alerts", get(alerts))
        .route("/scan", post(scan))
        .route("/riders", get(riders))
        .route("/calendar", get(calendar_entries))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlertsResponse {
    alerts: BTreeMap<String, RiderAlert>,
    articles: Vec<Article>,
    calendar: &'static [RaceEntry],
    feeds: Vec<FeedStatus>,
    generated_at: String,
}

/// Full pipeline: fetch all feeds (each may fail on its own), sort + dedup,
/// aggregate, project. The response is cacheable; the pipeline holds no state
/// between requests.
async fn alerts(State(state): State<AppState>) -> impl IntoResponse {
    let providers: Vec<Box<dyn FeedProvider>> = state
        .feeds
        .iter()
        .map(|f| {
            Box::new(SyndicationProvider::new(f.clone(), state.client.clone()))
                as Box<dyn FeedProvider>
        })
        .collect();

    let (mut articles, feeds) = ingest::run_once(&providers).await;
    let now = Utc::now();
    let alerts = aggregate::aggregate(&mut articles, &state.roster, calendar::calendar(), now);
    tracing::info!(
        articles = articles.len(),
        alerts = alerts.len(),
        "alerts pipeline ran"
    );

    (
        [(header::CACHE_CONTROL, "s-maxage=300")],
        Json(AlertsResponse {
            alerts,
            articles,
            calendar: calendar::calendar(),
            feeds,
            generated_at: now.to_rfc3339(),
        }),
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanResponse {
    alerts: BTreeMap<String, RiderAlert>,
    articles: Vec<Article>,
    duplicates_dropped: usize,
}

/// Run the classification core over a posted article batch, no network
/// involved. The batch goes through the same sort + dedup as fetched feeds.
async fn scan(State(state): State<AppState>, Json(batch): Json<Vec<Article>>) -> Json<ScanResponse> {
    let (mut articles, duplicates_dropped) = ingest::sort_and_dedup(batch);
    let alerts =
        aggregate::aggregate(&mut articles, &state.roster, calendar::calendar(), Utc::now());
    Json(ScanResponse {
        alerts,
        articles,
        duplicates_dropped,
    })
}

async fn riders(State(state): State<AppState>) -> Json<Vec<Rider>> {
    Json(state.roster.as_ref().clone())
}

async fn calendar_entries() -> Json<&'static [RaceEntry]> {
    Json(calendar::calendar())
}
