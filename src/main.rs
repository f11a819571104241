mod cli_args;
mod config;
mod error;
mod git;
mod llm;
mod logging;
mod pipeline;
mod setup;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::ProgressBar;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use cli_args::Cli;
use config::{BackendConfig, ProcessEnv};
use llm::prompts::TemplateStore;
use pipeline::Pipeline;

/// Read the diff from `--diff-file` or ask git for it.
fn load_diff(cli: &Cli, target: &str, source: &str) -> Result<String> {
    match cli.diff_file.as_deref() {
        Some(path) if path == Path::new("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read diff from stdin")?;
            Ok(buf)
        }
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read diff file {:?}", path)),
        None => git::diff_between(target, source),
    }
}

fn render_markdown(source: &str, target: &str, description: &str) -> String {
    format!("# Merge {source} into {target}\n\n{description}\n")
}

/// Write to `--output`, or to a temp file that outlives the process.
fn persist(markdown: &str, output: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = output {
        fs::write(path, markdown)
            .with_context(|| format!("failed to write PR description to {:?}", path))?;
        return Ok(path.to_path_buf());
    }

    let mut file = tempfile::Builder::new()
        .prefix("pr_result_")
        .suffix(".md")
        .tempfile()
        .context("failed to create temporary file")?;
    file.write_all(markdown.as_bytes())
        .context("failed to write temporary file")?;
    let (_, path) = file.keep().context("failed to keep temporary file")?;
    Ok(path)
}

fn run(cli: &Cli) -> Result<()> {
    // Bundled templates are part of the binary; failing here is a packaging bug.
    let templates =
        TemplateStore::bundled().context("failed to load bundled prompt templates")?;
    log::debug!("Prompt templates: {:?}", templates.names());

    let source = match &cli.source {
        Some(name) => name.clone(),
        None => git::current_branch().context("failed to determine current branch")?,
    };
    let target = cli.target.as_str();

    let diff = load_diff(cli, target, &source)?;
    if diff.trim().is_empty() {
        println!("No changes found between {target} and {source}.");
        return Ok(());
    }
    log::info!("Diff between {target} and {source}: {} bytes", diff.len());

    if cli.print_prompt {
        let prompt = pipeline::render_prompt(&templates, &diff)?;
        println!("{prompt}");
        return Ok(());
    }

    let store = setup::build_store(cli)?;
    let env = ProcessEnv;
    let backend_config = BackendConfig::new(&store, &env);

    let client = setup::build_llm_client(&backend_config)?;
    let pipeline = Pipeline::new(&templates, backend_config, client);

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Generating PR description...");
    let result = pipeline.generate_description(&diff);
    spinner.finish_and_clear();

    let description =
        result.inspect_err(|err| log::debug!("Pipeline stopped at stage: {}", err.stage()))?;
    let markdown = render_markdown(&source, target, &description);
    let path = persist(&markdown, cli.output.as_deref())?;

    println!("PR description written to: {}", path.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
