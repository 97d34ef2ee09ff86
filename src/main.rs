use clap::{Args, Parser, Subcommand};
use hiring_tracker::config::AppConfig;
use hiring_tracker::error::AppError;
use hiring_tracker::telemetry;
use hiring_tracker::workflows::hiring::{
    Action, ApplicationId, ApplicationKind, ApplicationManager, Command as ReviewCommand,
    Resolution,
};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "hiring-tracker",
    about = "Track job applications through the review workflow",
    version
)]
struct Cli {
    /// Application list to operate on (overrides APP_DATA_FILE)
    #[arg(long, global = true)]
    file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List applications, optionally only those of one kind
    List {
        /// Application kind to show (New or Old)
        #[arg(long)]
        kind: Option<String>,
    },
    /// Show every field and note of one application
    Show {
        id: u32,
        /// Print the application as JSON
        #[arg(long)]
        json: bool,
    },
    /// Submit a new application
    Add(AddArgs),
    /// Move an application through the workflow
    Apply(ApplyArgs),
    /// Delete an application from the list
    Remove { id: u32 },
    /// Write the application table as CSV
    ExportCsv {
        /// Only export applications of this kind
        #[arg(long)]
        kind: Option<String>,
        /// Destination file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    /// New or Old
    #[arg(long, value_parser = parse_kind)]
    kind: ApplicationKind,
    #[arg(long)]
    summary: String,
    #[arg(long)]
    note: String,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    id: u32,
    /// accept, reject, standby or reopen
    #[arg(long, value_parser = parse_action)]
    action: Action,
    /// Reviewer id (required to accept)
    #[arg(long)]
    reviewer: Option<String>,
    /// ReviewCompleted, InterviewCompleted, ReferenceCheckCompleted or OfferCompleted
    #[arg(long, value_parser = parse_resolution)]
    resolution: Option<Resolution>,
    #[arg(long)]
    note: String,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(file) = cli.file {
        config.storage.data_file = file;
    }

    telemetry::init(&config.telemetry)?;
    info!(
        ?config.environment,
        data_file = %config.storage.data_file.display(),
        "hiring tracker starting"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli.command, &config.storage.data_file, &mut out)
}

fn parse_kind(raw: &str) -> Result<ApplicationKind, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn parse_action(raw: &str) -> Result<Action, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn parse_resolution(raw: &str) -> Result<Resolution, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn open_manager(data_file: &Path) -> Result<ApplicationManager, AppError> {
    let mut manager = ApplicationManager::new();
    if data_file.exists() {
        manager.load_from_file(data_file)?;
    }
    Ok(manager)
}

fn execute<W: Write>(command: Command, data_file: &Path, out: &mut W) -> Result<(), AppError> {
    let mut manager = open_manager(data_file)?;

    match command {
        Command::List { kind } => {
            let rows = match kind.as_deref() {
                Some(kind) => manager.rows_by_kind(kind),
                None => manager.rows(),
            };
            if rows.is_empty() {
                writeln!(out, "No applications")?;
            }
            for row in rows {
                writeln!(
                    out,
                    "{:>4}  {:<9}  {:<3}  {}",
                    row.id.0, row.state, row.kind, row.summary
                )?;
            }
        }
        Command::Show { id, json } => {
            let id = ApplicationId(id);
            let application = manager.get(id).ok_or(AppError::NotFound(id))?;
            let view = application.to_view();
            if json {
                let rendered = serde_json::to_string_pretty(&view).map_err(io::Error::other)?;
                writeln!(out, "{rendered}")?;
            } else {
                writeln!(out, "Application #{} ({})", view.id, view.kind_label)?;
                writeln!(out, "State: {}", view.state_label)?;
                writeln!(out, "Summary: {}", view.summary)?;
                writeln!(
                    out,
                    "Reviewer: {}",
                    view.reviewer.as_deref().unwrap_or("(unassigned)")
                )?;
                writeln!(
                    out,
                    "Paperwork processed: {}",
                    if view.paperwork_processed { "yes" } else { "no" }
                )?;
                writeln!(
                    out,
                    "Resolution: {}",
                    view.resolution
                        .map(|resolution| resolution.token())
                        .unwrap_or("(none)")
                )?;
                writeln!(out, "Notes:")?;
                for note in &view.notes {
                    writeln!(out, "- {note}")?;
                }
            }
        }
        Command::Add(args) => {
            let id = manager.add(args.kind, &args.summary, &args.note)?;
            manager.save_to_file(data_file)?;
            writeln!(out, "Added application #{id}")?;
        }
        Command::Apply(args) => {
            let id = ApplicationId(args.id);
            if manager.get(id).is_none() {
                return Err(AppError::NotFound(id));
            }
            let command =
                ReviewCommand::new(args.action, args.reviewer, args.resolution, args.note)?;
            if let Some(state) = manager.apply(id, &command)? {
                manager.save_to_file(data_file)?;
                writeln!(out, "Application #{id} is now in {state}")?;
            }
        }
        Command::Remove { id } => {
            let id = ApplicationId(id);
            if manager.remove(id) {
                manager.save_to_file(data_file)?;
                writeln!(out, "Removed application #{id}")?;
            } else {
                writeln!(out, "No application #{id}; nothing removed")?;
            }
        }
        Command::ExportCsv { kind, output } => {
            let count = match output {
                Some(path) => {
                    let file = File::create(&path)?;
                    manager.export_rows_csv(file, kind.as_deref())?
                }
                None => manager.export_rows_csv(&mut *out, kind.as_deref())?,
            };
            info!(rows = count, "exported application table");
        }
    }

    Ok(())
}
