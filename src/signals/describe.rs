use thiserror::Error;
use tracing::warn;

use super::{CompanyEvent, DatedEvent, EventDetails};

const ROUND_SEPARATOR: &str = " - ";
const ACQUISITION_SEPARATOR: &str = " acquired by ";
const SOURCE_SEPARATOR: &str = " on ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("missing separator {separator:?} in {text:?}")]
    MissingSeparator {
        separator: &'static str,
        text: String,
    },
    #[error("empty {field} in {text:?}")]
    EmptyField { field: &'static str, text: String },
}

/// "Series C - Payfit on Les Echos" → ("Series C", "Payfit").
pub fn split_fund_raising(text: &str) -> Result<EventDetails, DescriptionError> {
    let (series, company) = split_pair(text, ROUND_SEPARATOR)?;
    Ok(EventDetails::FundRaising {
        series: non_empty(series, "series", text)?,
        company: non_empty(company, "company", text)?,
    })
}

/// "Amazon acquired by Google on The NYT" → ("Amazon", "Google").
pub fn split_acquisition(text: &str) -> Result<EventDetails, DescriptionError> {
    let (acquired, acquiring) = split_pair(text, ACQUISITION_SEPARATOR)?;
    Ok(EventDetails::Acquisition {
        acquired_company: non_empty(acquired, "acquired company", text)?,
        acquiring_company: non_empty(acquiring, "acquiring company", text)?,
    })
}

/// Leading part before `separator`, and the part between the first and the
/// second separator cut at the first " on " (the source).
fn split_pair<'a>(
    text: &'a str,
    separator: &'static str,
) -> Result<(&'a str, &'a str), DescriptionError> {
    let mut parts = text.split(separator);
    let head = parts.next().unwrap_or_default();
    let rest = parts.next().ok_or_else(|| DescriptionError::MissingSeparator {
        separator,
        text: text.to_string(),
    })?;
    let subject = rest.split(SOURCE_SEPARATOR).next().unwrap_or_default();
    Ok((head, subject))
}

fn non_empty(value: &str, field: &'static str, text: &str) -> Result<String, DescriptionError> {
    if value.trim().is_empty() {
        Err(DescriptionError::EmptyField {
            field,
            text: text.to_string(),
        })
    } else {
        Ok(value.to_string())
    }
}

pub fn enrich_fund_raising(event: DatedEvent) -> CompanyEvent {
    match split_fund_raising(event.text()) {
        Ok(details) => CompanyEvent {
            event,
            details: Some(details),
        },
        Err(e) => {
            warn!(url = %event.event.event_url, "fund raising left unsplit: {}", e);
            CompanyEvent::bare(event)
        }
    }
}

pub fn enrich_acquisition(event: DatedEvent) -> CompanyEvent {
    match split_acquisition(event.text()) {
        Ok(details) => CompanyEvent {
            event,
            details: Some(details),
        },
        Err(e) => {
            warn!(url = %event.event.event_url, "acquisition left unsplit: {}", e);
            CompanyEvent::bare(event)
        }
    }
}
