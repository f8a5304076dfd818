use std::fmt::Write;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signals::{CompanyEvent, EventDetails};

/// Number of columns produced by [`flat_record`].
pub const RECORD_WIDTH: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SheetError {
    #[error("date format {0:?} cannot render a calendar date")]
    DateFormat(String),
    #[error("{name} {index} is outside the {width}-column record")]
    ColumnOutOfRange {
        name: &'static str,
        index: usize,
        width: usize,
    },
    #[error("url and text columns must differ (both {0})")]
    SameColumn(usize),
}

/// Which columns of the flat record hold the link target and the link text.
#[derive(Debug, Clone, Copy)]
pub struct SheetLayout {
    pub url_column: usize,
    pub text_column: usize,
}

impl SheetLayout {
    pub fn check(&self) -> Result<(), SheetError> {
        if self.url_column == self.text_column {
            return Err(SheetError::SameColumn(self.url_column));
        }
        for (name, index) in [("url column", self.url_column), ("text column", self.text_column)] {
            if index >= RECORD_WIDTH {
                return Err(SheetError::ColumnOutOfRange {
                    name,
                    index,
                    width: RECORD_WIDTH,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Link { text: String, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    /// The hyperlink cell, always last.
    pub fn link(&self) -> Option<(&str, &str)> {
        match self.cells.last() {
            Some(Cell::Link { text, url }) => Some((text.as_str(), url.as_str())),
            _ => None,
        }
    }

    /// Everything before the hyperlink cell.
    pub fn values(&self) -> &[Cell] {
        match self.cells.split_last() {
            Some((Cell::Link { .. }, rest)) => rest,
            _ => &self.cells,
        }
    }
}

/// Render `date` with a strftime pattern. Patterns asking for time or
/// offset fields, or holding unknown specifiers, are errors.
pub fn format_date(date: NaiveDate, date_format: &str) -> Result<String, SheetError> {
    let mut out = String::new();
    write!(out, "{}", date.format(date_format))
        .map_err(|_| SheetError::DateFormat(date_format.to_string()))?;
    Ok(out)
}

/// `[date, search url, event url, event text, detail fields…]`.
///
/// Detail fields are `[company, series]` for fund raisings and
/// `[acquired, acquiring]` for acquisitions; empty strings when the
/// description could not be split.
pub fn flat_record(event: &CompanyEvent, date_format: &str) -> Result<Vec<String>, SheetError> {
    let dated = &event.event;
    let mut record = vec![
        format_date(dated.date, date_format)?,
        dated.event.search_url.clone(),
        dated.event.event_url.clone(),
        dated.event.event_text.clone(),
    ];
    match &event.details {
        Some(EventDetails::FundRaising { series, company }) => {
            record.push(company.clone());
            record.push(series.clone());
        }
        Some(EventDetails::Acquisition {
            acquired_company,
            acquiring_company,
        }) => {
            record.push(acquired_company.clone());
            record.push(acquiring_company.clone());
        }
        None => {
            record.push(String::new());
            record.push(String::new());
        }
    }
    Ok(record)
}

/// Drop the url and text columns and append them back as one link cell.
pub fn to_row(record: Vec<String>, layout: SheetLayout) -> Result<Row, SheetError> {
    layout.check()?;
    let width = record.len();
    let column = |name: &'static str, index: usize| {
        record
            .get(index)
            .cloned()
            .ok_or(SheetError::ColumnOutOfRange { name, index, width })
    };
    let text = column("text column", layout.text_column)?;
    let url = column("url column", layout.url_column)?;

    let mut cells: Vec<Cell> = record
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != layout.text_column && *i != layout.url_column)
        .map(|(_, v)| Cell::Text(v))
        .collect();
    cells.push(Cell::Link { text, url });
    Ok(Row { cells })
}

pub fn build_rows(
    events: &[CompanyEvent],
    layout: SheetLayout,
    date_format: &str,
) -> Result<Vec<Row>, SheetError> {
    events
        .iter()
        .map(|e| to_row(flat_record(e, date_format)?, layout))
        .collect()
}
