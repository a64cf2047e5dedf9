use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use resume_matcher::core::result_state::{CustomSlot, DatasetSlot};
use resume_matcher::core::{MatchingClient, Notice, Orchestrator, ResumeFile, WorkflowOutcome};
use resume_matcher::{report, EnvironmentConfig};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(about = "Match a resume against job postings through the matching service")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    /// Print settled results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Args)]
struct JobText {
    /// Job description text
    #[arg(long, conflicts_with = "job_file")]
    job_text: Option<String>,

    /// Read the job description from a file
    #[arg(long)]
    job_file: Option<PathBuf>,
}

impl JobText {
    async fn read(&self) -> Result<String> {
        match (&self.job_text, &self.job_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read job description: {}", path.display())),
            (None, None) => Ok(String::new()),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Rank the resume against the service's posting dataset
    Dataset {
        #[arg(long)]
        resume: PathBuf,
    },
    /// Compare the resume with a single job description
    Custom {
        #[arg(long)]
        resume: PathBuf,
        #[command(flatten)]
        job: JobText,
    },
    /// Run both workflows concurrently
    Both {
        #[arg(long)]
        resume: PathBuf,
        #[command(flatten)]
        job: JobText,
    },
}

#[derive(Serialize)]
struct JsonReport<'a> {
    dataset: &'a DatasetSlot,
    custom: &'a CustomSlot,
    notices: &'a [Notice],
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(json_layer)
        .init();
    Ok(())
}

async fn select_resume(orchestrator: &Orchestrator, path: &Path) -> Result<()> {
    let file = ResumeFile::from_path(path).await?;
    orchestrator.select_file(file);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (config, load_notes) = EnvironmentConfig::load(&cli.config)?;
    init_logging(config.log_file.as_deref())?;
    load_notes.log();

    let base_url = config.base_url()?;
    info!("Matching service: {}", base_url.as_str());
    info!("Consistency policy: {:?}", config.consistency);

    let client = MatchingClient::over_http(base_url, config.timeout())?;
    let (orchestrator, mut notice_rx) = Orchestrator::new(client, config.consistency);

    let outcomes: Vec<WorkflowOutcome> = match &cli.command {
        Command::Dataset { resume } => {
            select_resume(&orchestrator, resume).await?;
            vec![orchestrator.submit_dataset().await]
        }
        Command::Custom { resume, job } => {
            select_resume(&orchestrator, resume).await?;
            orchestrator.set_job_description(job.read().await?);
            vec![orchestrator.submit_custom().await]
        }
        Command::Both { resume, job } => {
            select_resume(&orchestrator, resume).await?;
            orchestrator.set_job_description(job.read().await?);
            let (dataset, custom) =
                tokio::join!(orchestrator.submit_dataset(), orchestrator.submit_custom());
            vec![dataset, custom]
        }
    };

    let mut notices = Vec::new();
    while let Ok(notice) = notice_rx.try_recv() {
        notices.push(notice);
    }

    let dataset = orchestrator.results().snapshot_dataset();
    let custom = orchestrator.results().snapshot_custom();

    if cli.json {
        let json = JsonReport {
            dataset: &dataset,
            custom: &custom,
            notices: &notices,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to serialize results")?
        );
    } else {
        for notice in &notices {
            eprintln!("❌ [{}] {}", notice.workflow, notice.message);
        }
        print!("{}", report::render_dataset_slot(&dataset));
        print!("{}", report::render_custom_slot(&custom));
    }

    if outcomes.iter().all(WorkflowOutcome::is_ok) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
