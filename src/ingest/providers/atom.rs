// src/ingest/providers/atom.rs
//! Atom parsing: `<feed><entry>…` with RFC 3339 `published`/`updated`.

use anyhow::{Context, Result};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::providers::scrub_html_entities_for_xml;
use crate::ingest::types::Article;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<Text>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<Text>,
}

/// Atom text constructs may carry a `type` attribute; only the content
/// matters here.
#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

fn pick_link(links: &[Link]) -> String {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|l| l.href.clone())
        .unwrap_or_default()
}

/// Parse an Atom document into article records. `published` wins over
/// `updated` as the article date when both are present.
pub fn parse_atom_str(feed_name: &str, feed_lang: &str, body: &str) -> Result<Vec<Article>> {
    let xml_clean = scrub_html_entities_for_xml(body);
    let feed: Feed = from_str(&xml_clean).context("parsing atom xml")?;

    let mut out = Vec::with_capacity(feed.entries.len());
    for e in feed.entries {
        let title = normalize_text(
            e.title
                .as_ref()
                .and_then(|t| t.value.as_deref())
                .unwrap_or_default(),
        );
        if title.is_empty() {
            continue;
        }
        out.push(Article {
            title,
            description: normalize_text(
                e.summary
                    .as_ref()
                    .and_then(|t| t.value.as_deref())
                    .unwrap_or_default(),
            ),
            link: pick_link(&e.links),
            date: e.published.or(e.updated).unwrap_or_default(),
            source_feed_name: feed_name.to_string(),
            source_feed_lang: feed_lang.to_string(),
            matched_riders: Vec::new(),
        });
    }
    Ok(out)
}
