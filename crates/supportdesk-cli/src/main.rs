//! `supportdesk`: triage a support inbox from the command line.
//!
//! Every subcommand opens the store, does one thing and exits.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use supportdesk::config::{load_config, AppConfig};
use supportdesk::db::{email_repo, stats_repo, Database, EmailFilter};
use supportdesk::email::{EmailRecord, EmlDirectory, Priority, Status};
use supportdesk::logging::{self, LogFormat};
use supportdesk::pipeline::{IngestReport, Pipeline};
use supportdesk::{classifier, export, reply};

#[derive(Parser, Debug)]
#[command(name = "supportdesk", version, about = "Support inbox triage")]
struct Cli {
    /// JSON config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enrich a CSV export and merge it into the store.
    Ingest {
        csv: PathBuf,
        /// Also write the processed CSV to the configured export path.
        #[arg(long)]
        export: bool,
    },
    /// Import `.eml` files, or directories of them.
    ImportEml {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Only messages sent within this many days (directories only).
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show the queue, urgent first.
    List {
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        urgent: bool,
        #[arg(long)]
        limit: Option<u64>,
    },
    Show {
        id: i64,
    },
    /// Draft a reply and store it.
    Reply {
        id: i64,
    },
    /// Store an edited reply.
    SaveReply {
        id: i64,
        text: String,
    },
    Resolve {
        id: i64,
    },
    /// Redraft replies for every email, or only those with `--status`.
    Regenerate {
        #[arg(long)]
        status: Option<Status>,
    },
    Stats,
    /// Write the whole store to a CSV file.
    Export {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Human
    };
    logging::init(format).context("failed to initialise logging")?;

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    let db_path = match cli.db.clone().or_else(|| config.database.resolved_path()) {
        Some(path) => path,
        None => bail!("cannot determine database path, pass --db"),
    };
    let db = supportdesk::ensure_store(&db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;

    let pipeline = Pipeline::new(db, reply::from_config(&config.reply));

    run(cli.command, &pipeline, &config)
}

fn run(command: Command, pipeline: &Pipeline, config: &AppConfig) -> Result<()> {
    let db = pipeline.database();

    match command {
        Command::Ingest { csv, export } => {
            let report = pipeline.ingest_csv(&csv)?;
            print_report(&report);
            if export {
                export_store(db, &config.export.path)?;
            }
        }
        Command::ImportEml { paths, days } => {
            let mut files = Vec::new();
            let mut total = IngestReport::default();
            for path in paths {
                if path.is_dir() {
                    let mut source = EmlDirectory::new(&path);
                    let report = pipeline.ingest_source(&mut source, days)?;
                    accumulate(&mut total, &report);
                } else {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    files.push(bytes);
                }
            }
            if !files.is_empty() {
                let report = pipeline.ingest_messages(&files)?;
                accumulate(&mut total, &report);
            }
            print_report(&total);
        }
        Command::List {
            status,
            urgent,
            limit,
        } => {
            let filter = EmailFilter {
                status,
                priority: urgent.then_some(Priority::Urgent),
                limit,
            };
            for record in email_repo::list(db, &filter)? {
                print_row(&record);
            }
        }
        Command::Show { id } => {
            let record = email_repo::find_by_id(db, id)?
                .with_context(|| format!("no email with id {}", id))?;
            print_detail(&record);
        }
        Command::Reply { id } => {
            let text = pipeline.generate_reply(id)?;
            println!("{}", text);
        }
        Command::SaveReply { id, text } => {
            pipeline.save_reply(id, &text)?;
            println!("Saved reply for #{}", id);
        }
        Command::Resolve { id } => {
            pipeline.resolve(id)?;
            println!("Marked #{} as Resolved", id);
        }
        Command::Regenerate { status } => {
            let summary = pipeline.regenerate_all(status)?;
            println!("Regenerated {} replies", summary.updated);
        }
        Command::Stats => {
            let stats = stats_repo::queue_stats(db)?;
            let timeline = stats_repo::daily_timeline(db)?;
            let output = serde_json::json!({ "queue": stats, "timeline": timeline });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Export { path } => {
            export_store(db, &path)?;
        }
    }

    Ok(())
}

fn export_store(db: &Database, path: &Path) -> Result<()> {
    let records = email_repo::load_all(db)?;
    export::write_csv_path(path, &records)
        .with_context(|| format!("failed to export to {}", path.display()))?;
    info!("Exported {} emails to {}", records.len(), path.display());
    Ok(())
}

fn accumulate(total: &mut IngestReport, report: &IngestReport) {
    total.read += report.read;
    total.admitted += report.admitted;
    total.inserted += report.inserted;
    total.updated += report.updated;
}

fn print_report(report: &IngestReport) {
    println!(
        "read {}, admitted {}, inserted {}, updated {}",
        report.read, report.admitted, report.inserted, report.updated
    );
}

fn print_row(record: &EmailRecord) {
    let sent = record
        .sent_date
        .as_ref()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "#{:<5} {:<10} {:<8} {:<25} {} | {}",
        record.id, record.priority, record.status, sent, record.sender, record.subject
    );
}

fn print_detail(record: &EmailRecord) {
    let join = |list: &Option<Vec<String>>| {
        list.as_ref()
            .map(|items| items.join(", "))
            .unwrap_or_else(|| "-".to_string())
    };

    println!("#{} {}", record.id, record.subject);
    println!("From:      {}", record.sender);
    if let Some(date) = &record.sent_date {
        println!("Sent:      {}", date);
    }
    println!("Priority:  {}", record.priority);
    println!("Sentiment: {}", record.sentiment);
    println!("Status:    {}", record.status);
    println!("Topics:    {}", join(&record.topics));
    println!("Emails:    {}", join(&record.extracted_emails));
    println!("Phones:    {}", join(&record.extracted_phones));
    println!("Updated:   {}", record.updated_at.to_rfc3339());
    println!();
    println!(
        "{}",
        classifier::summarize(&record.body, classifier::SUMMARY_WORDS)
    );
    if let Some(reply) = &record.ai_reply {
        println!();
        println!("--- Reply ---");
        println!("{}", reply);
    }
}
