// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::types::{Article, FeedProvider, FeedStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

/// Case-folded prefix length used as the dedup key over article titles.
pub const DEDUP_TITLE_PREFIX: usize = 50;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("radar_articles_fetched_total", "Articles parsed from feeds.");
        describe_counter!(
            "radar_articles_kept_total",
            "Articles kept after sort + dedup."
        );
        describe_counter!(
            "radar_dedup_total",
            "Articles dropped as title-prefix duplicates."
        );
        describe_counter!("radar_feed_errors_total", "Feed fetch/parse errors.");
        describe_gauge!(
            "radar_pipeline_last_run_ts",
            "Unix ts when the ingest pipeline last ran."
        );
    });
}

/// Normalize text: decode HTML entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Parse an ISO-ish article date. Feeds disagree on formats, so this accepts
/// RFC 3339, RFC 2822, and the two bare shapes seen in practice. Anything
/// else is `None`; callers treat that as very-old for sorting and as "now"
/// for projection.
pub fn parse_article_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc2822) {
        let unix = dt.to_offset(UtcOffset::UTC).unix_timestamp();
        return Utc.timestamp_opt(unix, 0).single();
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|ndt| Utc.from_utc_datetime(&ndt));
    }
    None
}

/// Dedup key: case-folded first 50 characters of the title.
pub fn dedup_key(title: &str) -> String {
    title.to_lowercase().chars().take(DEDUP_TITLE_PREFIX).collect()
}

/// Sort newest-first by parsed date (unparseable sorts as earliest), then
/// drop later duplicates keyed by title prefix. The order matters: dedup
/// after the sort decides which article counts as "most recent" downstream.
pub fn sort_and_dedup(mut articles: Vec<Article>) -> (Vec<Article>, usize) {
    articles.sort_by_key(|a| {
        std::cmp::Reverse(
            parse_article_date(&a.date)
                .map(|d| d.timestamp())
                .unwrap_or(0),
        )
    });

    let before = articles.len();
    let mut seen: HashSet<String> = HashSet::new();
    articles.retain(|a| seen.insert(dedup_key(&a.title)));
    let dropped = before - articles.len();

    (articles, dropped)
}

/// Fetch every configured feed, tolerating per-feed failure, then sort and
/// dedup the merged article list. Returns the articles plus one status entry
/// per feed.
pub async fn run_once(providers: &[Box<dyn FeedProvider>]) -> (Vec<Article>, Vec<FeedStatus>) {
    ensure_metrics_described();

    let mut raw = Vec::new();
    let mut statuses = Vec::with_capacity(providers.len());
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                statuses.push(FeedStatus {
                    name: p.name().to_string(),
                    ok: true,
                    error: None,
                    articles: v.len(),
                });
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, feed = p.name(), "feed error");
                counter!("radar_feed_errors_total").increment(1);
                statuses.push(FeedStatus {
                    name: p.name().to_string(),
                    ok: false,
                    error: Some(e.to_string()),
                    articles: 0,
                });
            }
        }
    }

    counter!("radar_articles_fetched_total").increment(raw.len() as u64);
    let (kept, dropped) = sort_and_dedup(raw);
    counter!("radar_articles_kept_total").increment(kept.len() as u64);
    counter!("radar_dedup_total").increment(dropped as u64);
    gauge!("radar_pipeline_last_run_ts").set(Utc::now().timestamp().max(0) as f64);

    (kept, statuses)
}
