mod api;
mod config;
mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use granteval_core::{CapabilityGate, Evaluation, EvaluationEngine, EvaluationSource};
use granteval_evaluator::{EvaluationRequest, EvaluationResult};
use granteval_logging::{LogFormat, Logger};

use config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "granteval",
    about = "AI-assisted grant proposal evaluation",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Model to use for the generative backend
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Tracing level filter (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Directory containing granteval.toml (default: current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Also write structured events to this JSONL file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a proposal across the standard categories
    Evaluate {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Requested amount
        #[arg(long)]
        amount: f64,

        /// Output the result as JSON
        #[arg(long)]
        json_output: bool,
    },
    /// Expand a free-text idea into a structured proposal draft
    Draft {
        #[arg(long)]
        idea: String,

        /// Output the result as JSON
        #[arg(long)]
        json_output: bool,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let project_config = ProjectConfig::load(&working_dir)?.unwrap_or_default();

    let log_format: LogFormat = cli.log_format.into();
    granteval_logging::init_tracing(&cli.log_level, log_format);

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let gate = CapabilityGate::from_env(project_config.env_settings(cli.model.as_deref()));
    let engine = Arc::new(EvaluationEngine::new(gate).with_logger(Arc::new(logger)));

    match cli.command {
        Commands::Evaluate {
            title,
            description,
            amount,
            json_output,
        } => {
            let request = EvaluationRequest::proposal(title, description, amount);
            run_once(&engine, request, json_output).await
        }
        Commands::Draft { idea, json_output } => {
            let request = EvaluationRequest::idea(idea);
            run_once(&engine, request, json_output).await
        }
        Commands::Serve { host, port } => {
            let host = project_config.host(host.as_deref());
            let port = project_config.port(port);
            serve::handle_serve_command(engine, &host, port).await
        }
    }
}

async fn run_once(
    engine: &EvaluationEngine,
    request: EvaluationRequest,
    json_output: bool,
) -> Result<()> {
    if let Err(e) = request.validate() {
        anyhow::bail!("Invalid {} request: {}", request.kind(), e);
    }

    let evaluation = engine.evaluate_detailed(&request).await;

    if json_output {
        let json = serde_json::to_string_pretty(&evaluation.result)?;
        println!("{}", json);
    } else {
        print_evaluation(&evaluation);
    }

    Ok(())
}

fn print_evaluation(evaluation: &Evaluation) {
    let result = &evaluation.result;

    eprintln!();
    match evaluation.source {
        EvaluationSource::Backend { ref model, .. } => {
            eprintln!("=== {} ===", "EVALUATED".green().bold());
            eprintln!("Model: {}", model);
        }
        EvaluationSource::Fallback { reason, ref error } => {
            eprintln!("=== {} ===", "DEFAULT".yellow().bold());
            eprintln!("Reason: {} ({})", reason, error.dimmed());
        }
    }
    eprintln!("Duration: {:.1}s", evaluation.total_duration_secs);

    if let EvaluationResult::IdeaDraft(ref draft) = result {
        eprintln!("Title: {}", draft.title.bold());
        eprintln!("Suggested amount: {}", draft.amount_suggestion);
        for milestone in &draft.milestones {
            eprintln!("  {} {}", "-".dimmed(), milestone.title);
        }
        for item in &draft.budget {
            eprintln!("  {} {}: {}", "$".dimmed(), item.item, item.cost);
        }
    }

    eprintln!("Summary: {}", result.summary());
    eprintln!("Recommendations: {}", result.recommendations());
    eprintln!("Scores:");
    for score in result.scores() {
        eprintln!("  {:<22} {}", score.category, score.score.to_string().cyan());
    }
}
