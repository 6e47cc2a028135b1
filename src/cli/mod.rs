//! Command-line front end: collect, analyze, name, confirm, rename.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use walkdir::WalkDir;

use crate::ai::{OpenAiNamingEngine, DEFAULT_MODEL};
use crate::analysis::{Analyzer, FileAnalysis};
use crate::config::{Config, DEFAULT_CONFIG_FILE, ENV_CONFIG_FILE};
use crate::naming::{name_files_concurrently, CaseFormat, NamingEngine, NamingRequest, NamingResult};
use crate::safety::SafetyChecker;

/// Content-aware file renaming with LLM suggestions
#[derive(Parser, Debug)]
#[command(name = "rename-with-llm", version, about)]
pub struct Cli {
    /// Files or directories (walked recursively)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Number of filename suggestions per file
    #[arg(short, long)]
    pub count: Option<usize>,

    /// Case format for suggested filenames
    #[arg(long, value_parser = PossibleValuesParser::new(CaseFormat::ALL.map(|f| f.as_str())))]
    pub case: Option<String>,

    /// Ask for a short summary of each file
    #[arg(short, long)]
    pub summary: bool,

    /// Show suggestions without renaming anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// OpenAI model
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Prefix new names with today's date (YYYY-MM-DD_)
    #[arg(long)]
    pub date_prefix: bool,

    /// Configuration file
    #[arg(long, env = ENV_CONFIG_FILE, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Skip prompts and take the first suggestion for every file
    #[arg(short, long)]
    pub yes: bool,
}

impl Cli {
    pub fn naming_request(&self, config: &Config) -> NamingRequest {
        let mut request = NamingRequest::from_config(&config.naming);
        if let Some(count) = self.count {
            request.count = count.max(1);
        }
        if let Some(case) = &self.case {
            request.case_format = CaseFormat::parse(case);
        }
        request.include_summary = self.summary;
        request
    }
}

/// One analyzed file and its suggestions
pub struct Outcome {
    pub analysis: FileAnalysis,
    pub naming: NamingResult,
}

/// Regular files named on the command line, plus every file under named directories
pub fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Skipping unreadable entry: {}", e),
                }
            }
        } else {
            tracing::warn!("Skipping {}: not a file or directory", input.display());
        }
    }

    files
}

/// New filename for `original`: optional date prefix, suggestion, original extension
pub fn target_name(suggestion: &str, original: &Path, date: Option<NaiveDate>) -> String {
    let ext = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    match date {
        Some(date) => format!("{}_{}{}", date.format("%Y-%m-%d"), suggestion, ext),
        None => format!("{}{}", suggestion, ext),
    }
}

pub async fn execute(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(&cli.config);
    let request = cli.naming_request(&config);

    let files = collect_files(&cli.files);
    if files.is_empty() {
        println!("{}", style("No files found to process").red());
        return Ok(());
    }

    let engine: Arc<dyn NamingEngine> = Arc::new(
        OpenAiNamingEngine::from_env(cli.model.clone()).context("Cannot create naming engine")?,
    );

    let analyzer = Analyzer::new(&config);
    let mut analyses = Vec::with_capacity(files.len());
    for path in &files {
        match analyzer.analyze(path) {
            Ok(analysis) => analyses.push(analysis),
            Err(e) => println!(
                "{}",
                style(format!("Error processing {}: {}", path.display(), e)).red()
            ),
        }
    }

    tracing::info!(
        "Naming {} files with {} ({} concurrent)",
        analyses.len(),
        cli.model,
        config.naming.max_concurrent
    );
    let results =
        name_files_concurrently(engine, &analyses, &request, config.naming.max_concurrent).await;

    let outcomes: Vec<Outcome> = analyses
        .into_iter()
        .zip(results)
        .map(|(analysis, naming)| Outcome { analysis, naming })
        .collect();

    display_results(&outcomes, request.include_summary, &config);

    if !cli.dry_run {
        handle_renaming(&outcomes, &config, &cli)?;
    }

    Ok(())
}

fn display_results(outcomes: &[Outcome], include_summary: bool, config: &Config) {
    for outcome in outcomes {
        println!();
        println!("{}", style(format!("File: {}", outcome.analysis.file_name())).bold());
        println!("Suggestions:");
        for (i, suggestion) in outcome.naming.suggestions.iter().enumerate() {
            println!("  {}. {}", i + 1, suggestion);
        }

        if include_summary {
            if let Some(summary) = &outcome.naming.summary {
                println!("{}", style(format!("Summary: {}", summary)).dim());
            }
        }

        if outcome.naming.cost > 0.0 {
            println!("{}", style(format!("Cost: ${:.6}", outcome.naming.cost)).dim());
        }
        if outcome.naming.cost > config.cost_management.target_cost_per_file {
            println!(
                "{}",
                style(format!(
                    "Cost exceeds target of ${:.4} per file",
                    config.cost_management.target_cost_per_file
                ))
                .yellow()
            );
        }
    }
}

fn handle_renaming(outcomes: &[Outcome], config: &Config, cli: &Cli) -> Result<()> {
    let renamable: Vec<&Outcome> = outcomes
        .iter()
        .filter(|o| !o.naming.suggestions.is_empty())
        .collect();
    if renamable.is_empty() {
        println!("{}", style("No files to rename").red());
        return Ok(());
    }

    let total_cost: f64 = renamable.iter().map(|o| o.naming.cost).sum();
    println!();
    println!("{}", style(format!("Total estimated cost: ${:.6}", total_cost)).bold());

    let interactive = config.safety.confirm_renames && !cli.yes;
    let theme = ColorfulTheme::default();

    if interactive
        && !Confirm::with_theme(&theme)
            .with_prompt("Proceed with renaming?")
            .default(false)
            .interact()?
    {
        println!("Operation cancelled");
        return Ok(());
    }

    let checker = SafetyChecker::new(&config.safety);
    let date = cli.date_prefix.then(|| Local::now().date_naive());

    for outcome in renamable {
        let source = &outcome.analysis.path;
        let suggestions = &outcome.naming.suggestions;

        let choice = if interactive {
            let mut items: Vec<&str> = suggestions.iter().map(String::as_str).collect();
            items.push("Skip");
            let idx = Select::with_theme(&theme)
                .with_prompt(format!("Choose filename for {}", outcome.analysis.file_name()))
                .items(&items)
                .default(0)
                .interact()?;
            suggestions.get(idx)
        } else {
            suggestions.first()
        };

        let Some(suggestion) = choice else {
            continue;
        };

        if let Err(e) = rename_one(&checker, config, source, suggestion, date) {
            println!(
                "{}",
                style(format!("Cannot rename {}: {}", outcome.analysis.file_name(), e)).red()
            );
        }
    }

    Ok(())
}

/// Validate, resolve collisions, safety-check, then rename a single file
fn rename_one(
    checker: &SafetyChecker,
    config: &Config,
    source: &Path,
    suggestion: &str,
    date: Option<NaiveDate>,
) -> Result<PathBuf> {
    let new_name = target_name(suggestion, source, date);

    let validation = SafetyChecker::validate_filename(&new_name);
    if !validation.valid {
        anyhow::bail!(validation.errors.join("; "));
    }
    for warning in &validation.warnings {
        println!("{}", style(warning).yellow());
    }

    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    let mut target = parent.join(&new_name);
    if target.exists() && config.safety.prevent_overwrites && !is_same_path(source, &target) {
        target = checker.suggest_alternative_name(&target);
        println!(
            "{}",
            style(format!("Name taken, using {}", target.display())).yellow()
        );
    }

    let disk = checker.check_disk_space(source, parent);
    for warning in &disk.warnings {
        println!("{}", style(warning).yellow());
    }

    let report = checker.check_rename_safety(source, &target);
    if !report.safe {
        anyhow::bail!(report.errors.first().cloned().unwrap_or_default());
    }
    for warning in &report.warnings {
        println!("{}", style(warning).yellow());
    }

    fs::rename(source, &target)
        .with_context(|| format!("Failed to rename {}", source.display()))?;

    let shown = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(new_name);
    println!(
        "{}",
        style(format!(
            "Renamed: {} → {}",
            source.file_name().unwrap_or_default().to_string_lossy(),
            shown
        ))
        .green()
    );
    tracing::info!("Renamed {} to {}", source.display(), target.display());

    Ok(target)
}

fn is_same_path(a: &Path, b: &Path) -> bool {
    matches!((fs::canonicalize(a), fs::canonicalize(b)), (Ok(x), Ok(y)) if x == y)
}
