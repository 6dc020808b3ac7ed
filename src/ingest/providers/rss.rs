// src/ingest/providers/rss.rs
//! RSS 2.0 parsing: `<rss><channel><item>…` with RFC 2822 `pubDate`.

use anyhow::{Context, Result};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::providers::scrub_html_entities_for_xml;
use crate::ingest::types::Article;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// Parse an RSS 2.0 document into article records. Items without a title are
/// dropped; missing dates stay empty strings and degrade downstream.
pub fn parse_rss_str(feed_name: &str, feed_lang: &str, body: &str) -> Result<Vec<Article>> {
    let xml_clean = scrub_html_entities_for_xml(body);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.items.len());
    for it in rss.channel.items {
        let title = normalize_text(it.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        out.push(Article {
            title,
            description: normalize_text(it.description.as_deref().unwrap_or_default()),
            link: it.link.unwrap_or_default(),
            date: it.pub_date.unwrap_or_default(),
            source_feed_name: feed_name.to_string(),
            source_feed_lang: feed_lang.to_string(),
            matched_riders: Vec::new(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>WielerFlits</title>
    <item>
      <title>Pedersen breekt sleutelbeen bij val in&nbsp;training</title>
      <link>https://example.org/pedersen</link>
      <pubDate>Fri, 20 Feb 2026 08:30:00 GMT</pubDate>
      <description>&lt;p&gt;De Deen werd geopereerd.&lt;/p&gt;</description>
    </item>
    <item>
      <title></title>
      <description>no title, dropped</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_and_normalizes_text() {
        let arts = parse_rss_str("WielerFlits", "nl", FIXTURE).unwrap();
        assert_eq!(arts.len(), 1);
        let a = &arts[0];
        assert_eq!(a.title, "Pedersen breekt sleutelbeen bij val in training");
        assert_eq!(a.description, "De Deen werd geopereerd.");
        assert_eq!(a.link, "https://example.org/pedersen");
        assert_eq!(a.date, "Fri, 20 Feb 2026 08:30:00 GMT");
        assert_eq!(a.source_feed_name, "WielerFlits");
        assert_eq!(a.source_feed_lang, "nl");
    }

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        assert!(parse_rss_str("X", "en", "this is not xml").is_err());
    }
}
