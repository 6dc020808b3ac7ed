//! Alert aggregator: one left-to-right pass over the sorted article sequence,
//! one finalized alert per mentioned rider.
//!
//! Tier bookkeeping lives in a transient [`TierTally`] per rider, kept apart
//! from the output record so finalized alerts carry no internal state.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{self, RaceEntry};
use crate::ingest::{self, types::Article};
use crate::matcher;
use crate::roster::Rider;
use crate::severity::{self, SeverityTier, TIERS_BY_SEVERITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Mentioned in the news without injury language.
    News,
    /// At least one injury-tagged mention; sticky once set.
    Warning,
}

/// One article's contribution to a rider's alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMention {
    pub title: String,
    pub link: String,
    pub date: String,
    pub source: String,
    pub is_injury: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderAlert {
    pub rider_id: String,
    pub name: String,
    pub team: String,
    pub status: AlertStatus,
    pub severity: Option<SeverityTier>,
    pub missed_races: Vec<String>,
    pub return_date: Option<NaiveDate>,
    pub articles: Vec<ArticleMention>,
}

/// Per-rider accumulator for the aggregation pass; discarded after
/// finalization.
#[derive(Debug, Default, Clone)]
struct TierTally {
    counts: [u32; 5],
    latest_injury_date: Option<DateTime<Utc>>,
}

impl TierTally {
    fn record(&mut self, tier: SeverityTier, date: Option<DateTime<Utc>>) {
        self.counts[tier.rank()] += 1;
        if date > self.latest_injury_date {
            self.latest_injury_date = date;
        }
    }

    fn count(&self, tier: SeverityTier) -> u32 {
        self.counts[tier.rank()]
    }

    /// The final-severity rule cascade, checked in order:
    ///
    /// 1. `long` seen twice or more → `long`; repeated structural-injury
    ///    language is trusted over frequency of milder terms.
    /// 2. `long` seen exactly once with no `short` and no `dns` → `long`;
    ///    one unambiguous severe mention is not diluted by medium-tier noise,
    ///    but illness/non-start language alongside it marks the long hit as a
    ///    likely false positive and suppresses this rule.
    /// 3. Otherwise the most frequent tier wins, ties broken by severity.
    fn decide(&self) -> SeverityTier {
        if self.count(SeverityTier::Long) >= 2 {
            return SeverityTier::Long;
        }
        if self.count(SeverityTier::Long) == 1
            && self.count(SeverityTier::Short) == 0
            && self.count(SeverityTier::Dns) == 0
        {
            return SeverityTier::Long;
        }
        let mut best = SeverityTier::Unknown;
        let mut best_count = 0;
        for tier in TIERS_BY_SEVERITY {
            let n = self.count(tier);
            if n > best_count {
                best = tier;
                best_count = n;
            }
        }
        best
    }
}

/// Scan the (already sorted and deduped) article sequence and build one alert
/// per mentioned rider. Articles are annotated in place with the names of the
/// riders they matched. Riders with zero mentions do not appear in the map.
pub fn aggregate(
    articles: &mut [Article],
    roster: &[Rider],
    races: &[RaceEntry],
    now: DateTime<Utc>,
) -> BTreeMap<String, RiderAlert> {
    let mut alerts: BTreeMap<String, RiderAlert> = BTreeMap::new();
    let mut tallies: BTreeMap<String, TierTally> = BTreeMap::new();

    for article in articles.iter_mut() {
        article.matched_riders.clear();

        let text = format!("{} {}", article.title, article.description).to_lowercase();
        let is_injury = severity::is_injury_text(&text);
        let mention_severity = is_injury.then(|| severity::classify(&text));
        let article_date = ingest::parse_article_date(&article.date);

        for rider in matcher::match_riders(&text, roster) {
            article.matched_riders.push(rider.name.clone());

            let alert = alerts.entry(rider.id.clone()).or_insert_with(|| RiderAlert {
                rider_id: rider.id.clone(),
                name: rider.name.clone(),
                team: rider.team.clone(),
                status: if is_injury {
                    AlertStatus::Warning
                } else {
                    AlertStatus::News
                },
                severity: None,
                missed_races: Vec::new(),
                return_date: None,
                articles: Vec::new(),
            });

            alert.articles.push(ArticleMention {
                title: article.title.clone(),
                link: article.link.clone(),
                date: article.date.clone(),
                source: article.source_feed_name.clone(),
                is_injury,
                severity: mention_severity,
            });

            if is_injury {
                // A later non-injury mention never downgrades the status.
                alert.status = AlertStatus::Warning;
                tallies
                    .entry(rider.id.clone())
                    .or_default()
                    .record(mention_severity.unwrap_or(SeverityTier::Unknown), article_date);
            }
        }
    }

    for (rider_id, alert) in alerts.iter_mut() {
        if alert.status != AlertStatus::Warning {
            continue;
        }
        if let Some(tally) = tallies.get(rider_id) {
            let best = tally.decide();
            let projection = calendar::project(best, tally.latest_injury_date, now, races);
            alert.severity = Some(best);
            alert.missed_races = projection.missed_races;
            alert.return_date = Some(projection.return_date);
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 25, 12, 0, 0).unwrap()
    }

    fn races() -> Vec<RaceEntry> {
        vec![
            RaceEntry {
                race_id: "omloop".into(),
                date: NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
            },
            RaceEntry {
                race_id: "kuurne".into(),
                date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            },
        ]
    }

    fn roster() -> Vec<Rider> {
        vec![Rider::new("r1", "Jan Bakker", "X")]
    }

    fn art(title: &str, description: &str, date: &str) -> Article {
        Article {
            title: title.into(),
            description: description.into(),
            link: "https://example.org/a".into(),
            date: date.into(),
            source_feed_name: "Test".into(),
            source_feed_lang: "nl".into(),
            matched_riders: Vec::new(),
        }
    }

    #[test]
    fn single_long_mention_projects_rest_of_season() {
        let mut articles = vec![art("Bakker breaks collarbone", "", "2026-02-20")];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());

        let a = &alerts["r1"];
        assert_eq!(a.status, AlertStatus::Warning);
        assert_eq!(a.severity, Some(SeverityTier::Long));
        assert_eq!(a.missed_races, vec!["omloop", "kuurne"]);
        // 999 days out from the article date.
        assert_eq!(
            a.return_date,
            Some(NaiveDate::from_ymd_opt(2026, 2, 20).unwrap() + chrono::Duration::days(999))
        );
        assert_eq!(articles[0].matched_riders, vec!["Jan Bakker"]);
    }

    #[test]
    fn repeated_long_overrides_more_frequent_medium() {
        let mut articles = vec![
            art("Bakker fracture update", "", "2026-02-21"),
            art("Bakker surgery went well", "", "2026-02-22"),
            art("Bakker hamstring concern", "", "2026-02-18"),
            art("Bakker hamstring again", "", "2026-02-17"),
            art("Bakker hamstring still", "", "2026-02-16"),
        ];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());
        assert_eq!(alerts["r1"].severity, Some(SeverityTier::Long));
    }

    #[test]
    fn lone_long_beats_medium_noise() {
        // long ×1, medium ×2, no short/dns observed: the lone long wins.
        let mut articles = vec![
            art("Bakker fracture feared", "", "2026-02-21"),
            art("Bakker hamstring concern", "", "2026-02-19"),
            art("Bakker hamstring update", "", "2026-02-18"),
        ];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());
        assert_eq!(alerts["r1"].severity, Some(SeverityTier::Long));
    }

    #[test]
    fn lone_long_is_suppressed_by_short_observation() {
        // long ×1 alongside short ×2: the override does not apply and the
        // count decides.
        let mut articles = vec![
            art("Bakker shoulder knock", "", "2026-02-21"),
            art("Bakker ill before opening weekend", "", "2026-02-19"),
            art("Bakker still sick", "", "2026-02-18"),
        ];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());
        assert_eq!(alerts["r1"].severity, Some(SeverityTier::Short));
    }

    #[test]
    fn tie_breaks_toward_higher_severity() {
        // medium ×1 vs short ×1: equal counts, medium outranks short.
        let mut articles = vec![
            art("Bakker hamstring concern", "", "2026-02-21"),
            art("Bakker ill at home", "", "2026-02-19"),
        ];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());
        assert_eq!(alerts["r1"].severity, Some(SeverityTier::Medium));
    }

    #[test]
    fn news_only_mentions_get_no_projection() {
        let mut articles = vec![art("Bakker aims for a strong spring", "", "2026-02-20")];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());

        let a = &alerts["r1"];
        assert_eq!(a.status, AlertStatus::News);
        assert_eq!(a.severity, None);
        assert!(a.missed_races.is_empty());
        assert_eq!(a.return_date, None);
        assert_eq!(a.articles.len(), 1);
        assert!(!a.articles[0].is_injury);
    }

    #[test]
    fn injury_status_is_never_downgraded() {
        // Newest-first order: a plain news item after the injury one.
        let mut articles = vec![
            art("Bakker back on the rollers", "", "2026-02-22"),
            art("Bakker ziek thuis", "", "2026-02-19"),
        ];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());
        assert_eq!(alerts["r1"].status, AlertStatus::Warning);
        assert_eq!(alerts["r1"].articles.len(), 2);
    }

    #[test]
    fn reference_date_is_most_recent_injury_article() {
        // The older article carries the winning tier; the newer injury
        // article still provides the reference date.
        let mut articles = vec![
            art("Bakker crashes again in training", "", "2026-02-22"),
            art("Bakker hamstring tear confirmed", "", "2026-02-10"),
        ];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());
        let a = &alerts["r1"];
        assert_eq!(a.severity, Some(SeverityTier::Medium));
        assert_eq!(
            a.return_date,
            Some(NaiveDate::from_ymd_opt(2026, 2, 22).unwrap() + chrono::Duration::days(28))
        );
    }

    #[test]
    fn unmatched_riders_are_absent_and_empty_input_is_empty() {
        let mut none: Vec<Article> = Vec::new();
        assert!(aggregate(&mut none, &roster(), &races(), now()).is_empty());

        let mut articles = vec![art("Peloton previews the Omloop", "", "2026-02-20")];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let mut first = vec![
            art("Bakker breaks collarbone", "", "2026-02-20"),
            art("Bakker ziek", "", "2026-02-18"),
        ];
        let mut second = first.clone();
        let a = aggregate(&mut first, &roster(), &races(), now());
        let b = aggregate(&mut second, &roster(), &races(), now());
        assert_eq!(a, b);

        // Re-running over the already annotated slice changes nothing either.
        let c = aggregate(&mut first, &roster(), &races(), now());
        assert_eq!(a, c);
    }

    #[test]
    fn unparseable_dates_project_from_now() {
        let mut articles = vec![art("Bakker ziek voor Kuurne", "", "recent")];
        let alerts = aggregate(&mut articles, &roster(), &races(), now());
        let a = &alerts["r1"];
        assert_eq!(a.severity, Some(SeverityTier::Short));
        assert_eq!(
            a.return_date,
            Some(now().date_naive() + chrono::Duration::days(10))
        );
    }
}
