//! Severity classifier: maps free article text to one injury tier using
//! ordered keyword sets.
//!
//! Matching is case-insensitive substring matching with no word-boundary
//! requirement; the keyword lists mix Dutch and English on purpose. A keyword
//! hitting inside a larger token is an accepted false positive, handled
//! downstream by the aggregation overrides rather than here.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Injury severity, ordered so that `Ord` gives
/// `Long > Medium > Short > Dns > Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    /// An injury-adjacent term matched but no tiered keyword did.
    Unknown,
    /// Single-race non-start/withdrawal with no broader injury signal.
    Dns,
    /// Brief illness.
    Short,
    /// Multi-week soft-tissue injury.
    Medium,
    /// Season-ending or structural injury (fracture, surgery, major joint).
    Long,
}

/// All tiers, most severe first. Iteration order doubles as the tie-break
/// order in aggregation.
pub const TIERS_BY_SEVERITY: [SeverityTier; 5] = [
    SeverityTier::Long,
    SeverityTier::Medium,
    SeverityTier::Short,
    SeverityTier::Dns,
    SeverityTier::Unknown,
];

impl SeverityTier {
    /// Position in the severity order, `Long` = 0.
    pub fn rank(self) -> usize {
        match self {
            SeverityTier::Long => 0,
            SeverityTier::Medium => 1,
            SeverityTier::Short => 2,
            SeverityTier::Dns => 3,
            SeverityTier::Unknown => 4,
        }
    }

    /// Projected absence length in calendar days.
    pub fn absence_days(self) -> i64 {
        match self {
            SeverityTier::Long => 999, // effectively rest-of-season
            SeverityTier::Medium => 28,
            SeverityTier::Short => 10,
            SeverityTier::Dns => 3,
            SeverityTier::Unknown => 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeywordTables {
    long: Vec<String>,
    medium: Vec<String>,
    short: Vec<String>,
    dns: Vec<String>,
    generic: Vec<String>,
}

static KEYWORDS: Lazy<KeywordTables> = Lazy::new(|| {
    let raw = include_str!("../injury_keywords.json");
    serde_json::from_str::<KeywordTables>(raw).expect("valid injury keyword tables")
});

fn any_match(folded: &str, set: &[String]) -> bool {
    set.iter().any(|k| folded.contains(k.as_str()))
}

/// Classify text into a severity tier.
///
/// The four tiered sets are evaluated in fixed priority order
/// (long → medium → short → dns); the first set with a hit wins. Text that
/// reaches this function without any tiered hit classifies as `Unknown` —
/// callers gate on [`is_injury_text`] first, so `Unknown` means "injury
/// language without a tier-specific keyword".
pub fn classify(text: &str) -> SeverityTier {
    let folded = text.to_lowercase();
    let kw = &*KEYWORDS;
    for (tier, set) in [
        (SeverityTier::Long, &kw.long),
        (SeverityTier::Medium, &kw.medium),
        (SeverityTier::Short, &kw.short),
        (SeverityTier::Dns, &kw.dns),
    ] {
        if any_match(&folded, set) {
            return tier;
        }
    }
    SeverityTier::Unknown
}

/// Whether the text contains any injury-indicating term: the union of the
/// four tiered sets plus the generic set ("crash", "ruled out", ...). Decides
/// the `isInjury` flag only; generic terms never pick a tier.
pub fn is_injury_text(text: &str) -> bool {
    let folded = text.to_lowercase();
    let kw = &*KEYWORDS;
    any_match(&folded, &kw.long)
        || any_match(&folded, &kw.medium)
        || any_match(&folded, &kw.short)
        || any_match(&folded, &kw.dns)
        || any_match(&folded, &kw.generic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_keyword_wins_over_lower_tiers() {
        // "fracture" (long) present alongside "flu" (short): long has priority.
        assert_eq!(
            classify("rider suffers fracture after flu weekend"),
            SeverityTier::Long
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("FRACTURE"), classify("fracture"));
        assert_eq!(classify("FRACTURE"), SeverityTier::Long);
    }

    #[test]
    fn dutch_keywords_match() {
        assert_eq!(
            classify("renner breekt sleutelbeen na valpartij"),
            SeverityTier::Long
        );
        assert_eq!(classify("ziek naar huis"), SeverityTier::Short);
    }

    #[test]
    fn dns_without_injury_language() {
        assert_eq!(
            classify("hij ging niet van start in de omloop"),
            SeverityTier::Dns
        );
    }

    #[test]
    fn generic_terms_tag_injury_but_not_tier() {
        let text = "crashed hard in the finale";
        assert!(is_injury_text(text));
        assert_eq!(classify(text), SeverityTier::Unknown);
    }

    #[test]
    fn substring_match_has_no_word_boundary() {
        // "knie" inside a longer Dutch compound still counts; accepted policy.
        assert_eq!(classify("knieblessure houdt hem thuis"), SeverityTier::Long);
    }

    #[test]
    fn tier_order_is_total() {
        assert!(SeverityTier::Long > SeverityTier::Medium);
        assert!(SeverityTier::Medium > SeverityTier::Short);
        assert!(SeverityTier::Short > SeverityTier::Dns);
        assert!(SeverityTier::Dns > SeverityTier::Unknown);
    }

    #[test]
    fn classification_is_stateless() {
        let a = classify("collarbone fracture");
        let _ = classify("completely unrelated text");
        let b = classify("collarbone fracture");
        assert_eq!(a, b);
    }
}
