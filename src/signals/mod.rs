pub mod classify;
pub mod describe;

use chrono::NaiveDate;
use serde::Serialize;

use crate::parser::origins::AttributedEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    FundRaising,
    Acquisition,
}

/// An attributed event stamped with the date of the run that saw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatedEvent {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub event: AttributedEvent,
}

impl DatedEvent {
    pub fn new(date: NaiveDate, event: AttributedEvent) -> Self {
        DatedEvent { date, event }
    }

    pub fn text(&self) -> &str {
        &self.event.event_text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetails {
    FundRaising {
        series: String,
        company: String,
    },
    Acquisition {
        acquired_company: String,
        acquiring_company: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyEvent {
    #[serde(flatten)]
    pub event: DatedEvent,
    pub details: Option<EventDetails>,
}

impl CompanyEvent {
    /// The record as-is, without split description fields.
    pub fn bare(event: DatedEvent) -> Self {
        CompanyEvent {
            event,
            details: None,
        }
    }
}

/// Final output of one run, one list per tracked category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Signals {
    pub fund_raisings: Vec<CompanyEvent>,
    pub acquisitions: Vec<CompanyEvent>,
}

impl Signals {
    pub fn len(&self) -> usize {
        self.fund_raisings.len() + self.acquisitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
