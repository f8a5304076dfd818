use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crunch_signals::settings::Settings;
use crunch_signals::sheet::{self, Cell};
use crunch_signals::{db, inbox, pipeline, PipelineOptions, RawMessage, Signals};

const CHUNK_SIZE: usize = 500;

#[derive(Parser)]
#[command(name = "crunch_signals", about = "Fund raising and acquisition signals from search alert emails")]
struct Cli {
    /// Settings file (default: ./crunch_signals.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load alert emails saved as .html files into the mailbox
    Import {
        /// Directory holding the .html files
        dir: PathBuf,
    },
    /// Extract signals from unread alerts, append them to the sheets, mark alerts read
    Process {
        /// Max messages to process (default: all unread)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Date stamped on every signal (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Keep descriptions whole instead of splitting them into fields
        #[arg(long)]
        no_enrich: bool,
        /// Run the pipeline without writing rows or marking messages read
        #[arg(long)]
        dry_run: bool,
        /// Print the extracted signals as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show mailbox and sheet counts
    Stats,
    /// Latest rows of a sheet
    Overview {
        #[arg(short, long, value_enum, default_value = "fund-raisings")]
        sheet: SheetKind,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SheetKind {
    FundRaisings,
    Acquisitions,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    info!(db = ?settings.db_path, "settings loaded");

    let result = match cli.command {
        Commands::Import { dir } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let messages = inbox::load_dir(&dir)?;
            let inserted = db::insert_messages(&conn, &messages)?;
            println!(
                "Imported {} new messages ({} files found)",
                inserted,
                messages.len()
            );
            Ok(())
        }
        Commands::Process {
            limit,
            date,
            no_enrich,
            dry_run,
            json,
        } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let messages = db::fetch_unread(&conn, limit)?;
            if messages.is_empty() {
                println!("No unread messages. Run 'import' first or all alerts are processed.");
                return Ok(());
            }

            let run_date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let mut options = settings.pipeline_options();
            if no_enrich {
                options.enrich = false;
            }

            println!("Processing {} messages for {}...", messages.len(), run_date);
            let signals = run_pipeline(&messages, run_date, &options)?;
            println!(
                "Found {} fund raisings, {} acquisitions.",
                signals.fund_raisings.len(),
                signals.acquisitions.len()
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&signals)?);
            }
            if dry_run {
                println!("Dry run: nothing written, messages left unread.");
                return Ok(());
            }

            let layout = settings.layout();
            let fund_rows = sheet::build_rows(&signals.fund_raisings, layout, &settings.date_format)?;
            let acq_rows = sheet::build_rows(&signals.acquisitions, layout, &settings.date_format)?;
            let n_fund = db::append_rows(&conn, &settings.fund_raisings_sheet, &fund_rows)?;
            let n_acq = db::append_rows(&conn, &settings.acquisitions_sheet, &acq_rows)?;

            // Mark read only once both sheets are written.
            let ids: Vec<String> = messages.iter().map(|m| m.id.clone()).collect();
            let marked = db::mark_read(&conn, &ids)?;
            println!(
                "Appended {} rows to '{}', {} rows to '{}'; marked {} messages read.",
                n_fund, settings.fund_raisings_sheet, n_acq, settings.acquisitions_sheet, marked
            );
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(
                &conn,
                &[settings.fund_raisings_sheet.as_str(), settings.acquisitions_sheet.as_str()],
            )?;
            println!("Messages:  {}", s.messages);
            println!("Read:      {}", s.read);
            println!("Unread:    {}", s.unread);
            for (name, rows) in &s.sheets {
                println!("{:<10} {}", format!("{}:", name), rows);
            }
            Ok(())
        }
        Commands::Overview { sheet, limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let name = match sheet {
                SheetKind::FundRaisings => &settings.fund_raisings_sheet,
                SheetKind::Acquisitions => &settings.acquisitions_sheet,
            };
            let rows = db::fetch_sheet(&conn, name, limit)?;
            if rows.is_empty() {
                println!("No rows in '{}'.", name);
                return Ok(());
            }

            println!(
                "{:>5} | {:<48} | {:<40} | {:<30}",
                "Row", "Event", "Fields", "Link"
            );
            println!("{}", "-".repeat(133));
            for r in &rows {
                let fields = r
                    .values
                    .iter()
                    .map(|c| match c {
                        Cell::Text(t) => t.as_str(),
                        Cell::Link { text, .. } => text.as_str(),
                    })
                    .filter(|t| !t.is_empty() && !t.starts_with("http"))
                    .collect::<Vec<_>>()
                    .join(" / ");
                println!(
                    "{:>5} | {:<48} | {:<40} | {:<30}",
                    r.row_index,
                    truncate(&r.link_text, 48),
                    truncate(&fields, 40),
                    truncate(&r.link_url, 30)
                );
            }
            println!("\n{} rows from '{}'", rows.len(), name);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Extraction in chunks behind a progress bar, then one classification pass
/// over the whole batch.
fn run_pipeline(
    messages: &[RawMessage],
    run_date: NaiveDate,
    options: &PipelineOptions,
) -> Result<Signals> {
    let pb = ProgressBar::new(messages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut extracted = Vec::with_capacity(messages.len());
    for chunk in messages.chunks(CHUNK_SIZE) {
        extracted.extend(pipeline::extract_business_data(chunk, &options.marker_label));
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    Ok(pipeline::compute_signals(extracted, run_date, options.enrich))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
