use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use cnd_audit::{
    batch::{spawn_batch, BatchEvent, BatchRequest, BatchStatus},
    build_report_with,
    journal::Journal,
    render, telemetry, AuditConfig, ReportLayout, ReportTable, VerificationMode,
};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "cnd_audit",
    version,
    about = "Audit company folders of clearance certificates"
)]
struct Cli {
    /// Folder holding one subfolder per company; defaults to the last audited folder
    root: Option<PathBuf>,
    #[arg(long, default_value = "cnd_config.json")]
    config: PathBuf,
    #[arg(long, value_enum)]
    mode: Option<Mode>,
    /// Phrase marking a certificate as positive
    #[arg(long)]
    target: Option<String>,
    /// Expected certificate label, repeat for each type
    #[arg(long = "expected")]
    expected: Vec<String>,
    /// Report file, stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
    /// Add a column listing the missing certificates
    #[arg(long, default_value_t = false)]
    missing_column: bool,
    /// Directory for the adverse finding and missing file logs
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Write the effective settings back to the config file
    #[arg(long, default_value_t = false)]
    save_config: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Positive,
    Expiry,
}

impl From<Mode> for VerificationMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Positive => VerificationMode::PositiveDebtCheck,
            Mode::Expiry => VerificationMode::ExpiryCheck,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    let mut config = AuditConfig::load(&cli.config)?;
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }
    if let Some(target) = cli.target.as_deref() {
        config = config.with_target_line(target);
    }
    if !cli.expected.is_empty() {
        config = config.with_expected_files(&cli.expected);
    }
    let Some(root) = cli.root.clone().or_else(|| config.last_folder.clone()) else {
        bail!("no root folder given and none remembered in {}", cli.config.display());
    };
    config.validate()?;
    if cli.save_config {
        config.last_folder = Some(root.clone());
        config.save(&cli.config)?;
    }

    let journal = match cli.log_dir.as_deref() {
        Some(dir) => Some(
            Journal::new(dir).with_context(|| format!("unable to create {}", dir.display()))?,
        ),
        None => None,
    };

    let handle = spawn_batch(BatchRequest::new(&root, &config));
    for event in handle.events().iter() {
        match event {
            BatchEvent::Started { total } => {
                eprintln!("{} companies under {}", total, root.display())
            }
            BatchEvent::Progress(p) => {
                eprintln!("[{:>3.0}%] {}", p.fraction() * 100.0, p.company)
            }
            BatchEvent::Audit(event) => {
                if let Some(journal) = journal.as_ref() {
                    if let Err(err) = journal.record(&event) {
                        warn!(error = %err, "unable to write audit log");
                    }
                }
            }
            BatchEvent::Finished(BatchStatus::NothingToDo) => {
                eprintln!("no company folders found")
            }
            BatchEvent::Finished(BatchStatus::Cancelled) => eprintln!("cancelled"),
            BatchEvent::Finished(BatchStatus::Completed) => eprintln!("done"),
        }
    }
    let outcome = handle.join()?;
    if outcome.report.is_empty() {
        return Ok(());
    }

    let table = build_report_with(
        &outcome.report,
        ReportLayout {
            include_missing_column: cli.missing_column,
        },
    );
    match cli.output.as_ref() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("unable to create {}", path.display()))?;
            write_table(&table, cli.format, BufWriter::new(file))?;
            eprintln!("report written to {}", path.display());
        }
        None => write_table(&table, cli.format, io::stdout().lock())?,
    }
    Ok(())
}

fn write_table<W: Write>(table: &ReportTable, format: Format, mut writer: W) -> anyhow::Result<()> {
    match format {
        Format::Csv => render::write_csv(table, &mut writer)?,
        Format::Json => render::write_json(table, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}
