mod cli;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};

use voom::config::{self, AppConfig, OutputFormat};
use voom::context::expand_files;
use voom::diff::parse_diff;
use voom::error::VoomError;
use voom::highlight::{HighlightOptions, annotate};
use voom::model::{HunkExpansions, LineComment};
use voom::output::{generate_prompt, render_files};
use voom::vcs::{DiffSource, GitBackend};

use cli::CliArgs;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::parse_cli_args();

    let output = match run(&args) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}

fn load_app_config() -> AppConfig {
    match config::load_config() {
        Ok(outcome) => {
            for warning in &outcome.warnings {
                warn!("{warning}");
            }
            outcome.config.unwrap_or_default()
        }
        Err(err) => {
            warn!(
                "Could not load config from {}: {err:#}; using defaults",
                config::config_path_hint()
            );
            AppConfig::default()
        }
    }
}

fn run(args: &CliArgs) -> Result<String> {
    let config = load_app_config();
    let format = args.format.unwrap_or(config.format());
    let window = args.context_lines.unwrap_or(config.context_lines());
    let options = HighlightOptions {
        word_diff_max_line_length: config.word_diff_max_line_length(),
    };

    let (diff_text, backend) = match &args.diff_file {
        Some(path) => (read_diff_file(path)?, None),
        None => {
            let dir = args.directory.clone().unwrap_or_else(|| PathBuf::from("."));
            let backend = GitBackend::discover(&dir)?;
            let snapshot = backend.snapshot()?;
            debug!(
                "diff snapshot of {} (hash {})",
                snapshot.directory.display(),
                snapshot.hash
            );
            (snapshot.diff, Some(backend))
        }
    };

    let files = annotate(parse_diff(&diff_text), &options);
    // One store per file section; the same path may appear more than once.
    let expansions: Vec<HunkExpansions> = match (&backend, args.expand) {
        (Some(backend), true) => expand_files(backend, &files, window),
        (None, true) => {
            warn!("--expand needs a git repository; ignoring it for --diff-file input");
            Vec::new()
        }
        (_, false) => Vec::new(),
    };

    if let Some(path) = &args.comments {
        let comments = read_comments(path)?;
        return Ok(generate_prompt(&comments, &files, &expansions)?);
    }

    if files.is_empty() {
        return Err(VoomError::NoChanges.into());
    }

    match format {
        OutputFormat::Text => Ok(render_files(&files, &expansions)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&files)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn read_diff_file(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read diff from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read diff file {}", path.display()))
}

fn read_comments(path: &Path) -> Result<Vec<LineComment>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read comments file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid comments JSON in {}", path.display()))
}
