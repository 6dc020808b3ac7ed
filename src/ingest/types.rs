// src/ingest/types.rs
use anyhow::Result;

/// Uniform article record produced by the feed-parsing collaborators.
/// `date` stays a raw string; absence or garbage degrades at the use site,
/// never here.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub source_feed_name: String,
    #[serde(default)]
    pub source_feed_lang: String,
    /// Names of riders mentioned in this article; filled during aggregation
    /// for display purposes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_riders: Vec<String>,
}

/// Per-feed retrieval outcome. A failed feed contributes zero articles and
/// one of these; it never fails the run.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub name: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub articles: usize,
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &str;
}
