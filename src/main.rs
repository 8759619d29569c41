//! Plotline CLI - premise to screenplay

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;

use plotline::config::{mask_api_key, PlotlineConfig};
use plotline::error::{FixSuggestion, PlotlineError};
use plotline::provider::create_provider;
use plotline::runtime::{Pipeline, PipelineFile, RunOutput, Runner};
use plotline::screenplay::{screenplay_pipeline, StoryBundle};
use plotline::store::RunInputs;
use plotline::{schema, EventLog};

#[derive(Parser)]
#[command(name = "plotline")]
#[command(about = "Plotline - turn a premise into a screenplay with chained LLM tasks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline on a premise
    Run {
        /// Story premise (becomes args[0] and input.premise)
        premise: String,

        /// Custom pipeline YAML (default: the screenplay pipeline)
        #[arg(long)]
        pipeline: Option<PathBuf>,

        /// Override default provider (openai, mock)
        #[arg(short, long)]
        provider: Option<String>,

        /// Override default model
        #[arg(short, long)]
        model: Option<String>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the event trace as JSON
        #[arg(long)]
        trace: Option<PathBuf>,
    },

    /// Validate a pipeline and print its execution order
    Check {
        /// Custom pipeline YAML (default: the screenplay pipeline)
        #[arg(long)]
        pipeline: Option<PathBuf>,
    },

    /// Print a published record schema as JSON Schema
    Schema {
        /// Schema name, e.g. outline or character_list
        name: String,
    },
}

fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries the result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            premise,
            pipeline,
            provider,
            model,
            output,
            trace,
        } => run_pipeline(RunArgs {
            premise,
            pipeline,
            provider,
            model,
            output,
            trace,
        }),
        Commands::Check { pipeline } => check_pipeline(pipeline.as_deref()),
        Commands::Schema { name } => print_schema(&name),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

struct RunArgs {
    premise: String,
    pipeline: Option<PathBuf>,
    provider: Option<String>,
    model: Option<String>,
    output: Option<PathBuf>,
    trace: Option<PathBuf>,
}

fn run_pipeline(args: RunArgs) -> Result<(), PlotlineError> {
    // Reject a blank premise before touching config or network
    let inputs = RunInputs::premise(&args.premise)?;

    let mut config = PlotlineConfig::load()?.with_env();
    if let Some(m) = args.model {
        config.defaults.model = Some(m);
    }

    let custom = args.pipeline.is_some();
    let pipeline = load_pipeline(args.pipeline.as_deref(), &config)?;
    let provider_name = args
        .provider
        .unwrap_or_else(|| config.provider().to_string());
    let provider = create_provider(&provider_name, &config)?;

    let key = match (provider_name.as_str(), config.openai_key()) {
        ("openai", Some(key)) => format!(" | key: {}", mask_api_key(key, 6)),
        _ => String::new(),
    };
    eprintln!(
        "{} Using provider: {} | model: {}{}",
        "→".cyan(),
        provider_name.cyan().bold(),
        config.model().cyan(),
        key
    );

    let event_log = EventLog::new();
    let runner = Runner::new(pipeline, provider).with_event_log(event_log.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_signal.cancel();
            }
        });

        runner.with_cancellation(cancel).run(inputs).await
    });

    // The trace is written whether the run succeeded or not
    if let Some(path) = &args.trace {
        std::fs::write(path, serde_json::to_string_pretty(&event_log.to_json())?)?;
    }

    let output = outcome?;
    let json = if custom {
        serde_json::to_string_pretty(&output)?
    } else {
        story_json(&output)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("{} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn story_json(output: &RunOutput) -> Result<String, PlotlineError> {
    let bundle = StoryBundle::from_context(&output.context)?;
    Ok(serde_json::to_string_pretty(&bundle)?)
}

fn load_pipeline(path: Option<&Path>, config: &PlotlineConfig) -> Result<Pipeline, PlotlineError> {
    match path {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)?;
            PipelineFile::from_yaml(&yaml)?.into_pipeline(&config.sampling())
        }
        None => screenplay_pipeline(config),
    }
}

fn check_pipeline(path: Option<&Path>) -> Result<(), PlotlineError> {
    let config = PlotlineConfig::load()?.with_env();
    let pipeline = load_pipeline(path, &config)?;

    let label = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "screenplay".to_string());
    println!("{} Pipeline '{}' is valid", "✓".green(), label);
    println!("  Tasks: {}", pipeline.len());
    println!("  Terminal: {}", pipeline.terminal().id());
    println!("  Order:");
    for (i, task) in pipeline.execution_order().enumerate() {
        let deps = task.dependencies();
        if deps.is_empty() {
            println!("    {}. {}", i + 1, task.id());
        } else {
            println!("    {}. {} ← {}", i + 1, task.id(), deps.join(", "));
        }
    }
    Ok(())
}

fn print_schema(name: &str) -> Result<(), PlotlineError> {
    let schema = schema::lookup(name)?;
    println!("{}", serde_json::to_string_pretty(&schema.to_json_schema())?);
    Ok(())
}
