//! tfremap CLI entrypoint.
//!
//! Orchestration only: parse flags, fetch one plan per module concurrently,
//! run the engine, and hand the resulting moves to the serializer.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tfremap::cli::{Cli, OutputFormat, Summarizer, styled_num_moves};
use tfremap::engine::{self, Rule, RuleDiffer};
use tfremap::error::{OutputError, Result, TerraformError};
use tfremap::terraform::{self, PlanProvider, PlanSettings, TerraformRunner};

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_logging(cli.quiet);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system. Logs go to standard error; standard
/// output is reserved for serialized moves.
fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    // Catch unworkable flag combinations before spending time on plans.
    if cli.output == OutputFormat::Blocks && cli.modules.len() > 1 {
        return Err(OutputError::MultipleModules {
            count: cli.modules.len(),
        }
        .into());
    }

    let mut rules = Vec::with_capacity(cli.ignore.len());
    for raw in &cli.ignore {
        rules.push(Rule::parse(raw)?);
    }

    let modules = if cli.modules.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.modules.clone()
    };

    let settings = PlanSettings {
        terraform_bin: cli.terraform_bin.clone(),
        skip_init: cli.skip_init,
        skip_refresh: cli.skip_refresh,
    };
    let runner = Arc::new(TerraformRunner::new(settings)?);

    let plans = fetch_plans(runner, &modules).await?;

    let differ = RuleDiffer::new(rules);
    let comparisons = engine::compare_plans(&plans, &differ);
    let moves = engine::determine_moves(&comparisons);

    if !cli.quiet {
        let summary = Summarizer::new(&moves, &comparisons, cli.verbose).summary();
        eprintln!("\n{summary}\n");
    }

    if moves.is_empty() {
        return Ok(());
    }

    let terraform_moves: Vec<terraform::Move> =
        moves.iter().cloned().map(terraform::Move::from).collect();

    match cli.output {
        OutputFormat::Blocks => {
            let moves_file_path = modules[0].join("moves.tf");
            let mut moves_file = std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(&moves_file_path)?;

            terraform::write_moved_blocks(&mut moves_file, &terraform_moves)?;

            if !cli.quiet {
                eprintln!(
                    "{} written to {}",
                    styled_num_moves(moves.len()),
                    moves_file_path.display()
                );
            }
        }
        OutputFormat::Commands => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();

            terraform::write_move_commands(&mut lock, &terraform_moves)?;

            if !cli.quiet {
                eprintln!(
                    "{} written to standard output",
                    styled_num_moves(moves.len())
                );
            }
        }
    }

    Ok(())
}

/// Fetches and summarizes every module's plan concurrently.
///
/// Results land in index-addressed slots, so the returned plans are in
/// module-argument order regardless of completion order. Failures do not
/// short-circuit: every module's error is collected so the caller sees all
/// of them at once.
async fn fetch_plans<P>(provider: Arc<P>, modules: &[PathBuf]) -> Result<Vec<engine::Plan>>
where
    P: PlanProvider + 'static,
{
    let module_ids: Vec<String> = modules.iter().map(|m| m.display().to_string()).collect();

    let mut handles = Vec::with_capacity(modules.len());
    for (module, module_id) in modules.iter().zip(&module_ids) {
        let provider = Arc::clone(&provider);
        let module = module.clone();
        let module_id = module_id.clone();

        handles.push(tokio::spawn(async move {
            let json = provider
                .obtain_plan(&module)
                .await
                .map_err(|e| format!("failed to get plan for module {module_id:?}: {e}"))?;

            debug!("summarizing plan for module {module_id:?}");
            engine::summarize_plan(&module_id, &json)
                .map_err(|e| format!("failed to summarize plan for module {module_id:?}: {e}"))
        }));
    }

    let mut plans: Vec<Option<engine::Plan>> = modules.iter().map(|_| None).collect();
    let mut errors = Vec::new();

    for (i, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok(plan)) => plans[i] = Some(plan),
            Ok(Err(message)) => errors.push(message),
            Err(e) => errors.push(format!(
                "failed to get plan for module {:?}: {e}",
                module_ids[i]
            )),
        }
    }

    if !errors.is_empty() {
        return Err(TerraformError::PlanCollection { errors }.into());
    }

    Ok(plans.into_iter().flatten().collect())
}
