// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use hiring_assistant::utils::logging::{format_error, format_info, format_success, format_warning};
use hiring_assistant::{
    Config, FileScanner, HealthStatus, HiringAssistant, ProgressTracker, SearchOutcome,
    SearchQuery, SearchReport, SearchReportExporter, UploadedFile, Validator,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DESCRIPTION_PREVIEW_CHARS: usize = 300;

#[derive(Parser)]
#[command(name = "hiring_assistant")]
#[command(author = "cipher")]
#[command(version)]
#[command(about = "Resume screening with vector search and on-demand summaries", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "HIRING_ASSISTANT_CONFIG",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, annotate and store resumes (files or directories of PDFs)
    Upload {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },

    /// Find stored resumes relevant to a job description
    Search {
        #[arg(short = 'j', long, conflicts_with = "job_file")]
        job_description: Option<String>,

        /// Read the job description from a text file
        #[arg(long, value_name = "FILE")]
        job_file: Option<PathBuf>,

        /// Comma-separated key skills
        #[arg(short, long)]
        skills: Option<String>,

        #[arg(short, long, value_name = "K")]
        limit: Option<usize>,

        /// Summarize match N (1-based); repeatable
        #[arg(short, long, value_name = "N")]
        expand: Vec<usize>,

        /// Write the matches as JSON to FILE
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,

        #[arg(short, long)]
        pretty: bool,
    },

    /// Check the vector store and embedding service
    Verify {
        #[arg(long)]
        create_collection: bool,
    },

    /// Show how many resumes are stored
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    hiring_assistant::utils::logging::init_logger(cli.color, cli.verbose);
    if !cli.color {
        colored::control::set_override(false);
    }

    info!("Hiring Assistant");

    let config_path = if cli.config.exists() {
        info!("Loading configuration from: {}", cli.config.display());
        Some(cli.config.as_path())
    } else {
        warn!(
            "Config file {} not found, using built-in defaults and environment",
            cli.config.display()
        );
        None
    };
    let config = Config::load(config_path).context("Failed to load configuration")?;

    let assistant =
        HiringAssistant::from_config(&config).context("Failed to initialize services")?;

    match cli.command {
        Commands::Upload { paths } => {
            cmd_upload(&assistant, &config, &paths, cli.color).await?;
        }
        Commands::Search {
            job_description,
            job_file,
            skills,
            limit,
            expand,
            export,
            pretty,
        } => {
            let job_description = match job_file {
                Some(path) => read_job_file(&path)?,
                None => job_description.unwrap_or_default(),
            };
            let query = SearchQuery::new(job_description, skills.unwrap_or_default());
            let options = SearchOptions {
                limit: limit.unwrap_or(config.search.top_k),
                expand,
                export,
                pretty,
            };
            cmd_search(&assistant, &query, &options).await?;
        }
        Commands::Verify { create_collection } => {
            cmd_verify(&assistant, create_collection).await?;
        }
        Commands::Stats => {
            cmd_stats(&assistant, &config).await?;
        }
    }

    Ok(())
}

struct SearchOptions {
    limit: usize,
    expand: Vec<usize>,
    export: Option<PathBuf>,
    pretty: bool,
}

fn read_job_file(path: &Path) -> Result<String> {
    Validator::validate_file_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job description from {}", path.display()))?;
    Validator::validate_content_not_empty(&content)
        .with_context(|| format!("Job description file {} is empty", path.display()))?;
    Ok(content)
}

async fn cmd_upload(
    assistant: &HiringAssistant,
    config: &Config,
    paths: &[PathBuf],
    colored: bool,
) -> Result<()> {
    let scanner = FileScanner::new(config.pipeline.clone());
    let scanned = scanner.collect(paths).context("Failed to resolve upload paths")?;

    if scanned.is_empty() {
        return Err(anyhow::anyhow!("No PDF files found in the given paths"));
    }

    let mut files = Vec::with_capacity(scanned.len());
    for file in &scanned {
        match UploadedFile::read(&file.path).await {
            Ok(upload) => files.push(upload),
            Err(e) => println!("{}", format_error(&e.to_string())),
        }
    }

    if files.is_empty() {
        return Err(anyhow::anyhow!("None of the selected files could be read"));
    }

    info!("Uploading {} files", files.len());
    let progress = ProgressTracker::new(files.len(), colored);
    let report = assistant
        .upload_with_progress(files, &progress)
        .await
        .context("Upload failed")?;
    progress.finish();
    let stats = progress.stats();

    println!();
    println!("{}", format_info(&format!("Session: {}", report.session_id)));
    println!(
        "{}",
        format_success(&format!(
            "Uploaded {} resume(s) ({} KB read) in {:.1}s",
            report.uploaded(),
            stats.bytes_read / 1024,
            stats.elapsed.as_secs_f64()
        ))
    );
    if !report.is_complete() {
        println!(
            "{}",
            format_warning(&format!("{} file(s) were not stored:", report.failures.len()))
        );
        for failure in &report.failures {
            println!(
                "{}",
                format_error(&format!("{}: {}", failure.name, failure.error))
            );
        }
    }

    Ok(())
}

async fn cmd_search(
    assistant: &HiringAssistant,
    query: &SearchQuery,
    options: &SearchOptions,
) -> Result<()> {
    info!("Searching with limit {}", options.limit);

    let outcome = assistant
        .search_with_limit(query, options.limit)
        .await
        .context("Search failed")?;

    if let SearchOutcome::NoMatches {
        threshold,
        candidates_considered,
    } = &outcome
    {
        println!(
            "{}",
            format_warning(&format!(
                "No relevant resumes found: none of {} candidate(s) scored above {:.2}",
                candidates_considered, threshold
            ))
        );
    }
    let matches = outcome.matches();

    for rank in options.expand.iter().filter(|&&n| n == 0 || n > matches.len()) {
        warn!("Ignoring --expand {}: no such match", rank);
    }

    let mut summaries = HashMap::new();
    println!();
    for (index, result) in matches.iter().enumerate() {
        let rank = index + 1;
        let metadata = &result.document.metadata;

        println!("Match {}: {}", rank, metadata.name);
        println!("Score: {:.2}", result.score);
        println!("Years of Experience: {}", metadata.years_of_experience);
        println!("Key Skills: {}", metadata.key_skills);
        println!(
            "Description: {}",
            Validator::truncate_text(&metadata.description, DESCRIPTION_PREVIEW_CHARS)
        );

        if options.expand.contains(&rank) {
            match assistant.summarize(&result.document).await {
                Ok(summary) => {
                    println!("Summary: {}", summary);
                    summaries.insert(rank, summary);
                }
                Err(e) => println!("{}", format_error(&format!("Summary unavailable: {}", e))),
            }
        }
        println!("{}", "-".repeat(80));
    }

    if let Some(path) = &options.export {
        let report = SearchReport::new(
            &query.text(),
            assistant.score_threshold(),
            matches,
            &summaries,
        );
        let exporter = SearchReportExporter::new(path)?;
        exporter
            .export(&report, options.pretty)
            .context("Failed to export search report")?;
        println!(
            "{}",
            format_success(&format!("Report written to {}", exporter.output_path().display()))
        );
    }

    Ok(())
}

async fn cmd_verify(assistant: &HiringAssistant, create_collection: bool) -> Result<()> {
    info!("Verifying external services");

    let report = assistant.verify(create_collection).await;
    println!("{}", report.format());

    if report.overall_status() == HealthStatus::Unhealthy {
        if !create_collection {
            println!(
                "{}",
                format_info("Use --create-collection to create a missing collection")
            );
        }
        return Err(anyhow::anyhow!("Service verification failed"));
    }

    Ok(())
}

async fn cmd_stats(assistant: &HiringAssistant, config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let count = assistant
        .document_count()
        .await
        .context("Failed to count documents")?;

    println!(
        "{}",
        format_info(&format!(
            "Collection {}.{} holds {} resume(s)",
            config.vector_store.keyspace, config.vector_store.collection_name, count
        ))
    );

    Ok(())
}
