// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "FEEDS_CONFIG_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedDialect {
    Rss,
    Atom,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
    pub lang: String,
    pub dialect: FeedDialect,
}

#[derive(Debug, Deserialize)]
struct FeedsFile {
    feeds: Vec<FeedSpec>,
}

/// Load the feed list from an explicit TOML path.
pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedSpec>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds config from {}", path.display()))?;
    let parsed: FeedsFile = toml::from_str(&content).context("parsing feeds toml")?;
    Ok(parsed.feeds)
}

/// Load the feed list using env var + fallbacks:
/// 1) $FEEDS_CONFIG_PATH
/// 2) config/feeds.toml
/// 3) built-in seed
pub fn load_feeds_default() -> Result<Vec<FeedSpec>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        }
        return Err(anyhow!("FEEDS_CONFIG_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    Ok(default_seed())
}

/// Embedded feed list, used when no config file is present.
pub fn default_seed() -> Vec<FeedSpec> {
    let parsed: FeedsFile =
        toml::from_str(include_str!("../../config/feeds.toml")).expect("valid embedded feeds");
    parsed.feeds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_parses_and_has_dialects() {
        let feeds = default_seed();
        assert!(!feeds.is_empty());
        assert!(feeds.iter().all(|f| !f.url.is_empty() && !f.name.is_empty()));
    }

    #[test]
    fn toml_roundtrip_with_atom_dialect() {
        let s = r#"
            [[feeds]]
            name = "Example"
            url = "https://example.org/feed.atom"
            lang = "en"
            dialect = "atom"
        "#;
        let parsed: FeedsFile = toml::from_str(s).unwrap();
        assert_eq!(parsed.feeds[0].dialect, FeedDialect::Atom);
    }
}
