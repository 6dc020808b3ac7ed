//! Rider matcher: a per-article, per-rider predicate with no memory across
//! articles.

use crate::roster::Rider;

/// Last names shorter than this never match on their own; "Roy" inside an
/// unrelated word is not a mention.
pub const MIN_LAST_NAME_LEN: usize = 4;

/// Whether the case-folded article text mentions this rider: full name as a
/// substring, or the last name alone when it is long enough to be distinctive.
pub fn rider_matches(text_lower: &str, rider: &Rider) -> bool {
    if text_lower.contains(&rider.full_name_lower) {
        return true;
    }
    rider.last_name_lower.chars().count() >= MIN_LAST_NAME_LEN
        && text_lower.contains(&rider.last_name_lower)
}

/// All riders mentioned in the text, in roster order. Matching is independent
/// per rider; one article can mention several.
pub fn match_riders<'r>(text_lower: &str, roster: &'r [Rider]) -> Vec<&'r Rider> {
    roster
        .iter()
        .filter(|r| rider_matches(text_lower, r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Rider;

    #[test]
    fn full_name_matches_as_substring() {
        let r = Rider::new("r1", "Arnaud De Lie", "Lotto");
        assert!(rider_matches("arnaud de lie wint de sprint", &r));
    }

    #[test]
    fn short_last_name_never_matches_alone() {
        // Last name "Lie" (3 chars) would otherwise hit inside "believe".
        let r = Rider::new("r1", "Arnaud De Lie", "Lotto");
        assert!(!rider_matches("hard to believe what happened today", &r));
    }

    #[test]
    fn long_last_name_matches_alone() {
        let r = Rider::new("r1", "Mads Pedersen", "Lidl-Trek");
        assert!(rider_matches("pedersen wint gent-wevelgem", &r));
    }

    #[test]
    fn matching_is_case_folded_by_caller() {
        let r = Rider::new("r1", "Wout van Aert", "Team Visma | Lease a Bike");
        let text = "Wout van Aert breekt sleutelbeen".to_lowercase();
        assert!(rider_matches(&text, &r));
    }

    #[test]
    fn multiple_riders_can_match_one_article() {
        let roster = vec![
            Rider::new("a", "Mads Pedersen", "Lidl-Trek"),
            Rider::new("b", "Jasper Philipsen", "Alpecin-Deceuninck"),
            Rider::new("c", "Tom Pidcock", "Q36.5 Pro Cycling"),
        ];
        let matched = match_riders("pedersen klopt philipsen in de sprint", &roster);
        let ids: Vec<&str> = matched.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
