// src/ingest/providers/mod.rs
pub mod atom;
pub mod rss;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ingest::config::{FeedDialect, FeedSpec};
use crate::ingest::types::{Article, FeedProvider};

/// Provider for one configured syndication feed; dispatches on the dialect.
pub struct SyndicationProvider {
    spec: FeedSpec,
    client: reqwest::Client,
}

impl SyndicationProvider {
    pub fn new(spec: FeedSpec, client: reqwest::Client) -> Self {
        Self { spec, client }
    }

    /// Parse a feed body without any network involvement; the testable core.
    pub fn parse_body(spec: &FeedSpec, body: &str) -> Result<Vec<Article>> {
        match spec.dialect {
            FeedDialect::Rss => rss::parse_rss_str(&spec.name, &spec.lang, body),
            FeedDialect::Atom => atom::parse_atom_str(&spec.name, &spec.lang, body),
        }
    }
}

#[async_trait]
impl FeedProvider for SyndicationProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let resp = self
            .client
            .get(&self.spec.url)
            .send()
            .await
            .with_context(|| format!("fetching feed {}", self.spec.name))?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("feed {} returned an error status", self.spec.name))?;
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading feed body for {}", self.spec.name))?;
        Self::parse_body(&self.spec, &body)
    }

    fn name(&self) -> &str {
        &self.spec.name
    }
}

/// Replace HTML entities that are not valid bare XML before deserializing.
pub(crate) fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
