use std::path::PathBuf;

use voom::config::{OutputFormat, config_path_hint};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub directory: Option<PathBuf>,
    /// `-` reads the diff from stdin.
    pub diff_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub comments: Option<PathBuf>,
    pub context_lines: Option<u32>,
    pub expand: bool,
}

/// Print help message and exit
fn print_help() -> ! {
    let name = std::env::args()
        .next()
        .and_then(|p| {
            std::path::Path::new(&p)
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "voom".to_string());
    let config_path = config_path_hint();
    println!(
        "voom - Review uncommitted changes and turn comments into an agent prompt

Usage: {name} [OPTIONS] [DIR]

Arguments:
  [DIR]                  Repository to review [default: current directory]

Options:
  --diff-file <PATH>     Read unified diff text from PATH (`-` for stdin) instead of git
  --format <FORMAT>      Output format: text or json [default: text]
  --comments <PATH>      JSON array of review comments; prints the agent prompt
  --context <N>          Lines revealed per expansion [default: 20]
  --expand               Reveal <N> extra lines around every hunk (git mode only)
  -h, --help             Print this help message

Config file: {config_path}
Command-line options take precedence over the config file."
    );
    std::process::exit(0);
}

/// Parse CLI arguments from command line
pub fn parse_cli_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    parse_cli_args_from(&args).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(2);
    })
}

/// Value of `--flag value` or `--flag=value`, advancing `i` past a separate value.
fn flag_value<'a>(
    args: &'a [String],
    i: &mut usize,
    flag: &str,
) -> Result<Option<&'a str>, String> {
    let arg = &args[*i];
    if let Some(value) = arg.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
        if value.is_empty() {
            return Err(format!("{flag} requires a value"));
        }
        return Ok(Some(value));
    }
    if arg != flag {
        return Ok(None);
    }
    match args.get(*i + 1) {
        // A lone `-` is a value (stdin), not a flag.
        Some(value) if value == "-" || !value.starts_with('-') => {
            *i += 1;
            Ok(Some(value))
        }
        _ => Err(format!("{flag} requires a value")),
    }
}

fn parse_cli_args_from(args: &[String]) -> Result<CliArgs, String> {
    let mut cli_args = CliArgs::default();
    let mut i = 1;

    while i < args.len() {
        let arg = args[i].as_str();

        if arg == "--help" || arg == "-h" {
            print_help();
        }

        if arg == "--expand" {
            cli_args.expand = true;
        } else if let Some(value) = flag_value(args, &mut i, "--diff-file")? {
            cli_args.diff_file = Some(PathBuf::from(value));
        } else if let Some(value) = flag_value(args, &mut i, "--format")? {
            cli_args.format = Some(OutputFormat::parse(value).ok_or_else(|| {
                format!("Unknown format '{value}'. Valid options: text, json")
            })?);
        } else if let Some(value) = flag_value(args, &mut i, "--comments")? {
            cli_args.comments = Some(PathBuf::from(value));
        } else if let Some(value) = flag_value(args, &mut i, "--context")? {
            let lines = value
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| format!("--context must be a positive integer, got '{value}'"))?;
            cli_args.context_lines = Some(lines);
        } else if arg.starts_with('-') {
            return Err(format!("Unknown option '{arg}'"));
        } else if cli_args.directory.is_none() {
            cli_args.directory = Some(PathBuf::from(arg));
        } else {
            return Err(format!("Unexpected argument '{arg}'"));
        }

        i += 1;
    }

    Ok(cli_args)
}
