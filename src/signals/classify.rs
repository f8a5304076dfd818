use std::sync::LazyLock;

use regex::Regex;

use super::{Category, DatedEvent};

static ROUND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[sS](eries|eed)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub fund_raisings: Vec<DatedEvent>,
    pub acquisitions: Vec<DatedEvent>,
}

/// Category of an event description, or `None` for anything untracked.
///
/// "acquired" is checked first, so a text mentioning both a round and an
/// acquisition is an acquisition.
pub fn classify(text: &str) -> Option<Category> {
    if text.contains("acquired") {
        Some(Category::Acquisition)
    } else if ROUND_RE.is_match(text) {
        Some(Category::FundRaising)
    } else {
        None
    }
}

/// Stable partition of `events` into the two tracked buckets. Unclassified
/// events are dropped.
pub fn classify_events(events: Vec<DatedEvent>) -> Classified {
    let mut fund_raisings = Vec::new();
    let mut acquisitions = Vec::new();

    for event in events {
        match classify(event.text()) {
            Some(Category::Acquisition) => acquisitions.push(event),
            Some(Category::FundRaising) => fund_raisings.push(event),
            None => {}
        }
    }

    Classified {
        fund_raisings,
        acquisitions,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::parser::origins::AttributedEvent;

    fn dated(text: &str) -> DatedEvent {
        DatedEvent::new(
            NaiveDate::from_ymd_opt(2021, 10, 30).unwrap(),
            AttributedEvent {
                search_url: "http://s".into(),
                event_url: format!("http://e/{}", text.len()),
                event_text: text.into(),
            },
        )
    }

    #[test]
    fn keywords() {
        assert_eq!(classify("Amazon acquired by Google on The NYT"), Some(Category::Acquisition));
        assert_eq!(classify("Series C - Payfit on Les Echos"), Some(Category::FundRaising));
        assert_eq!(classify("series B - Qonto"), Some(Category::FundRaising));
        assert_eq!(classify("Seed - Alan"), Some(Category::FundRaising));
        assert_eq!(classify("pre-seed for Mistral"), Some(Category::FundRaising));
        assert_eq!(classify("Random newsletter blurb"), None);
    }

    #[test]
    fn acquisition_check_is_case_sensitive() {
        assert_eq!(classify("Acquired by nobody"), None);
        assert_eq!(classify("ACQUIRED"), None);
    }

    #[test]
    fn series_initial_only_is_case_insensitive() {
        assert_eq!(classify("SERIES A"), None);
        assert_eq!(classify("SEED"), None);
    }

    #[test]
    fn acquisition_wins_tie() {
        assert_eq!(
            classify("Series B backed Swile acquired by Spendesk"),
            Some(Category::Acquisition)
        );
    }

    #[test]
    fn partition_is_stable_and_disjoint() {
        let events = vec![
            dated("Series A - One"),
            dated("Two acquired by Three"),
            dated("Random newsletter blurb"),
            dated("Seed - Four"),
            dated("Five acquired by Six"),
        ];
        let c = classify_events(events);

        let fr: Vec<&str> = c.fund_raisings.iter().map(|e| e.text()).collect();
        let acq: Vec<&str> = c.acquisitions.iter().map(|e| e.text()).collect();
        assert_eq!(fr, vec!["Series A - One", "Seed - Four"]);
        assert_eq!(acq, vec!["Two acquired by Three", "Five acquired by Six"]);
        assert!(fr.iter().all(|t| !acq.contains(t)));
    }

    #[test]
    fn classified_batches_can_be_copied_and_logged() {
        let c = classify_events(vec![dated("Seed - Alan"), dated("Two acquired by Three")]);
        let copy = c.clone();
        assert_eq!(copy, c);
        let shown = format!("{:?}", copy);
        assert!(shown.contains("Seed - Alan"));
        assert!(shown.contains("Two acquired by Three"));
    }

    #[test]
    fn empty_input() {
        let c = classify_events(Vec::new());
        assert!(c.fund_raisings.is_empty());
        assert!(c.acquisitions.is_empty());
    }
}
