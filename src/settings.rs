use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::pipeline::PipelineOptions;
use crate::sheet::{self, SheetLayout, RECORD_WIDTH};

const DEFAULT_SETTINGS_FILE: &str = "crunch_signals";
const ENV_PREFIX: &str = "CRUNCH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: PathBuf,
    pub search_marker_label: String,
    pub fund_raisings_sheet: String,
    pub acquisitions_sheet: String,
    pub event_url_column: usize,
    pub event_description_column: usize,
    pub date_format: String,
    pub enrich: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: PathBuf::from("data/signals.sqlite"),
            search_marker_label: "GO TO MY SEARCHES".into(),
            fund_raisings_sheet: "Fund Raisings".into(),
            acquisitions_sheet: "Acquisitions".into(),
            event_url_column: 2,
            event_description_column: 3,
            date_format: "%d/%m/%Y".into(),
            enrich: true,
        }
    }
}

impl Settings {
    /// Defaults, then the config file (optional unless given explicitly), then
    /// `CRUNCH_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };
        let settings: Settings = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        self.layout().check().with_context(|| {
            format!(
                "Invalid columns: event_url_column = {}, event_description_column = {} (record has {} columns)",
                self.event_url_column, self.event_description_column, RECORD_WIDTH
            )
        })?;
        let sample = chrono::NaiveDate::from_ymd_opt(2021, 10, 30).unwrap_or(chrono::NaiveDate::MIN);
        sheet::format_date(sample, &self.date_format).context("Invalid date_format")?;
        if self.search_marker_label.trim().is_empty() {
            bail!("search_marker_label must not be empty");
        }
        Ok(())
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            marker_label: self.search_marker_label.clone(),
            enrich: self.enrich,
        }
    }

    pub fn layout(&self) -> SheetLayout {
        SheetLayout {
            url_column: self.event_url_column,
            text_column: self.event_description_column,
        }
    }
}
