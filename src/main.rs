use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod model;
mod service;

use app::AppState;
use model::{BugReport, Config, LlmBackend, LogEntry};
use service::evaluation::{load_labeled_bugs, run_classification_experiment, save_experiment};
use service::interpretation::generate_report;
use service::MetricsCollector;

#[derive(Parser)]
#[command(name = "cognitest")]
#[command(about = "LLM-assisted bug triage, log interpretation and test generation")]
#[command(version)]
struct Cli {
    /// Text generation backend (overrides LLM_BACKEND)
    #[arg(long, global = true, value_enum)]
    backend: Option<LlmBackend>,

    /// Model identifier (overrides LLM_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the severity of a single failed test
    Classify {
        #[arg(long)]
        error_message: String,
        #[arg(long, default_value = "")]
        test_context: String,
        #[arg(long)]
        endpoint: String,
    },
    /// Classify a JSON array of bug reports
    ClassifyBatch {
        /// File containing `[{"error_message", "test_context", "endpoint", ...}]`
        file: PathBuf,
    },
    /// Explain an error log
    Interpret {
        #[arg(long)]
        service: String,
        /// Log text; read from --file when omitted
        #[arg(long, conflicts_with = "file")]
        log: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Print the structured interpretation instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Interpret a JSON array of `{"error_log", "service_name", ...}` entries
    InterpretBatch { file: PathBuf },
    /// Generate a pytest module for one requirement
    Generate {
        #[arg(long)]
        requirement: String,
        #[arg(long)]
        endpoint: String,
        #[arg(long, default_value = model::DEFAULT_HTTP_METHOD)]
        method: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate pytest modules for every block of a requirements file
    GenerateFile {
        requirements: PathBuf,
        #[arg(long, default_value = "data/generated_tests")]
        output_dir: PathBuf,
    },
    /// Suggest edge cases for a function specification
    EdgeCases { function_spec: String },
    /// Show the configured backend, model and sampling parameters
    ModelInfo,
    /// Measure classification accuracy against labelled bugs
    Experiment {
        #[arg(long, default_value = "data/ground_truth_bugs.json")]
        dataset: PathBuf,
        /// Defaults to RESULTS_DIR
        #[arg(long)]
        results_dir: Option<PathBuf>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing; stdout is reserved for results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    let state = AppState::new(config)?;

    match cli.command {
        Commands::ModelInfo => print_json(&state.model_info())?,
        Commands::Classify {
            error_message,
            test_context,
            endpoint,
        } => {
            let mut classifier = state.classifier();
            let result = classifier
                .classify(&error_message, &test_context, &endpoint)
                .await?;
            print_json(&result)?;
        }
        Commands::ClassifyBatch { file } => {
            let contents = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let bugs: Vec<BugReport> = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid bug reports in {}", file.display()))?;

            let mut classifier = state.classifier();
            let classified = classifier.classify_batch(bugs).await?;

            let stats = classifier.statistics();
            tracing::info!(
                total = stats.total_classifications,
                average_weighted_score = stats.average_weighted_score,
                "Batch classification completed"
            );
            print_json(&classified)?;
        }
        Commands::Interpret {
            service,
            log,
            file,
            json,
        } => {
            let error_log = match (log, file) {
                (Some(log), _) => log,
                (None, Some(file)) => tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?,
                (None, None) => anyhow::bail!("either --log or --file is required"),
            };

            let mut interpreter = state.interpreter();
            let interpretation = interpreter.interpret(&error_log, &service).await?;
            if json {
                print_json(&interpretation)?;
            } else {
                println!("{}", generate_report(&interpretation));
            }
        }
        Commands::InterpretBatch { file } => {
            let contents = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let entries: Vec<LogEntry> = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid log entries in {}", file.display()))?;

            let mut interpreter = state.interpreter();
            let interpreted = interpreter.interpret_batch(entries).await?;

            let stats = interpreter.statistics();
            tracing::info!(
                total = stats.total_interpretations,
                unique_services = stats.unique_services,
                "Batch interpretation completed"
            );
            print_json(&interpreted)?;
        }
        Commands::Generate {
            requirement,
            endpoint,
            method,
            output,
        } => {
            let mut generator = state.test_generator();
            let code = generator
                .generate_from_requirement(&requirement, &endpoint, &method, output.as_deref())
                .await?;
            if output.is_none() {
                println!("{code}");
            }
        }
        Commands::GenerateFile {
            requirements,
            output_dir,
        } => {
            let mut generator = state.test_generator();
            let mut metrics = MetricsCollector::new();

            metrics.start_timer("test_generation");
            let files = generator
                .generate_from_requirements_file(&requirements, &output_dir)
                .await?;
            let elapsed = metrics.stop_timer();

            let stats = generator.statistics();
            metrics.record_generation(
                files.len(),
                stats.total_tests,
                elapsed,
                stats.total_lines,
                generator.syntax_errors(),
            );

            for file in &files {
                println!("{}", file.display());
            }
            eprintln!("{}", metrics.generate_report());
        }
        Commands::EdgeCases { function_spec } => {
            let generator = state.test_generator();
            println!("{}", generator.suggest_edge_cases(&function_spec).await?);
        }
        Commands::Experiment {
            dataset,
            results_dir,
        } => {
            let bugs = load_labeled_bugs(&dataset).await?;
            let results_dir = results_dir.unwrap_or_else(|| state.config.results_dir.clone());

            let mut classifier = state.classifier();
            let mut metrics = MetricsCollector::new();
            let report = run_classification_experiment(&mut classifier, &bugs, &mut metrics).await;

            let (experiment_path, _) = save_experiment(&report, &metrics, &results_dir).await?;
            tracing::info!(path = %experiment_path.display(), "Experiment complete");
            print_json(&report)?;
        }
    }

    Ok(())
}
