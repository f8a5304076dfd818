use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::parser::{self, origins::AttributedEvent};
use crate::signals::classify::classify_events;
use crate::signals::describe::{enrich_acquisition, enrich_fund_raising};
use crate::signals::{CompanyEvent, DatedEvent, Signals};

/// One alert email as handed over by the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawMessage {
    pub id: String,
    pub html: String,
}

/// Events extracted from a single message, still tied to its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMessage {
    pub id: String,
    pub events: Vec<AttributedEvent>,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub marker_label: String,
    pub enrich: bool,
}

/// Extract attributed events from every message. Messages are parsed in
/// parallel; the result keeps arrival order.
pub fn extract_business_data(messages: &[RawMessage], marker_label: &str) -> Vec<ExtractedMessage> {
    messages
        .par_iter()
        .map(|m| {
            let events = parser::extract_events(&m.html, marker_label);
            debug!(id = %m.id, events = events.len(), "message parsed");
            ExtractedMessage {
                id: m.id.clone(),
                events,
            }
        })
        .collect()
}

/// Flatten, date, classify and optionally split descriptions.
pub fn compute_signals(extracted: Vec<ExtractedMessage>, run_date: NaiveDate, enrich: bool) -> Signals {
    let dated: Vec<DatedEvent> = extracted
        .into_iter()
        .flat_map(|m| m.events)
        .map(|e| DatedEvent::new(run_date, e))
        .collect();
    let total = dated.len();

    let classified = classify_events(dated);
    let dropped = total - classified.fund_raisings.len() - classified.acquisitions.len();
    info!(
        total,
        fund_raisings = classified.fund_raisings.len(),
        acquisitions = classified.acquisitions.len(),
        dropped,
        "events classified"
    );

    if enrich {
        Signals {
            fund_raisings: classified.fund_raisings.into_iter().map(enrich_fund_raising).collect(),
            acquisitions: classified.acquisitions.into_iter().map(enrich_acquisition).collect(),
        }
    } else {
        Signals {
            fund_raisings: classified.fund_raisings.into_iter().map(CompanyEvent::bare).collect(),
            acquisitions: classified.acquisitions.into_iter().map(CompanyEvent::bare).collect(),
        }
    }
}

pub fn process(messages: &[RawMessage], run_date: NaiveDate, options: &PipelineOptions) -> Signals {
    let extracted = extract_business_data(messages, &options.marker_label);
    compute_signals(extracted, run_date, options.enrich)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::EventDetails;

    fn options() -> PipelineOptions {
        PipelineOptions {
            marker_label: "GO TO MY SEARCHES".into(),
            enrich: true,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 10, 30).unwrap()
    }

    fn message(id: &str, fixture: &str) -> RawMessage {
        RawMessage {
            id: id.into(),
            html: std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap(),
        }
    }

    fn batch() -> Vec<RawMessage> {
        vec![
            message("17c1", "daily_alert"),
            message("17c2", "newsletter"),
            message("17c3", "second_alert"),
        ]
    }

    fn texts(events: &[CompanyEvent]) -> Vec<&str> {
        events.iter().map(|e| e.event.text()).collect()
    }

    #[test]
    fn batch_is_classified_in_arrival_order() {
        let s = process(&batch(), date(), &options());
        assert_eq!(
            texts(&s.fund_raisings),
            vec![
                "Series C - Payfit on Les Echos",
                "Seed - Alan on Maddyness",
                "Series A - Doctolib on TechCrunch",
                "Series D - Qonto on Les Echos",
                "seed round for Mistral",
            ]
        );
        assert_eq!(
            texts(&s.acquisitions),
            vec![
                "Amazon acquired by Google on The NYT",
                "Swile acquired by Spendesk on Sifted",
            ]
        );
        assert!(s.fund_raisings.iter().chain(&s.acquisitions).all(|e| e.event.date == date()));
    }

    #[test]
    fn enrichment_and_malformed_descriptions() {
        let s = process(&batch(), date(), &options());
        assert_eq!(
            s.fund_raisings[0].details,
            Some(EventDetails::FundRaising {
                series: "Series C".into(),
                company: "Payfit".into()
            })
        );
        assert_eq!(
            s.acquisitions[1].details,
            Some(EventDetails::Acquisition {
                acquired_company: "Swile".into(),
                acquiring_company: "Spendesk".into()
            })
        );
        // "seed round for Mistral" has no " - " separator.
        assert!(s.fund_raisings[4].details.is_none());
    }

    #[test]
    fn enrichment_can_be_disabled() {
        let opts = PipelineOptions {
            enrich: false,
            ..options()
        };
        let s = process(&batch(), date(), &opts);
        assert_eq!(s.len(), 7);
        assert!(s.fund_raisings.iter().chain(&s.acquisitions).all(|e| e.details.is_none()));
    }

    #[test]
    fn search_urls_survive_flattening() {
        let s = process(&batch(), date(), &options());
        assert_eq!(
            s.fund_raisings[3].event.event.search_url,
            "https://www.crunchbase.com/lists/ai-europe/search"
        );
        assert_eq!(
            s.fund_raisings[2].event.event.search_url,
            "https://www.crunchbase.com/lists/healthtech-europe/search"
        );
    }

    #[test]
    fn extraction_keeps_message_ids_in_order() {
        let extracted = extract_business_data(&batch(), "GO TO MY SEARCHES");
        let ids: Vec<&str> = extracted.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["17c1", "17c2", "17c3"]);
        assert_eq!(extracted[0].events.len(), 5);
        assert!(extracted[1].events.is_empty());
        assert_eq!(extracted[2].events.len(), 3);
    }

    #[test]
    fn idempotent() {
        let first = process(&batch(), date(), &options());
        let second = process(&batch(), date(), &options());
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_message_does_not_spoil_batch() {
        let mut messages = batch();
        messages.insert(
            1,
            RawMessage {
                id: "broken".into(),
                html: "<a href=\"x\"><a>GO TO MY SEARCHES</a></a><a".into(),
            },
        );
        let s = process(&messages, date(), &options());
        assert_eq!(s.len(), 7);
    }

    #[test]
    fn empty_batch() {
        assert!(process(&[], date(), &options()).is_empty());
    }
}
