use std::path::PathBuf;
use std::process;

use buildfile_core::Context;
use clap::{Parser, Subcommand};

pub mod lint;

use lint::formatter::Format;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Validate parsed buildfiles
    #[clap(name = "lint", bin_name = "lint")]
    Lint(LintCommand),
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct LintCommand {
    /// Parsed buildfile documents (JSON, as emitted by the parser)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Custom validator library to load
    #[arg(long = "custom-validator", short = 'c')]
    pub custom_validator: Option<PathBuf>,

    /// Exit with failure when warnings are found
    #[arg(long = "fail-on-warning", short = 'W')]
    pub fail_on_warning: bool,

    /// Report unresolved variables as errors
    #[arg(long = "strict-vars")]
    pub strict_variables: bool,

    /// Variable overrides, e.g. `-e QNX_TARGET=/opt/qnx/target,ARCH=aarch64le`
    #[arg(long = "env", short = 'e', value_delimiter = ',', value_parser = parse_variable)]
    pub variables: Vec<(String, String)>,

    /// Output format
    #[arg(long = "format", value_enum)]
    pub format: Option<Format>,

    /// Path to a .buildfilelint.yml configuration file
    #[arg(long = "config")]
    pub config_path: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(long = "report", short = 'r')]
    pub report_path: Option<PathBuf>,

    /// Only print findings
    #[arg(long = "quiet", short = 'q')]
    pub quiet: bool,
}

fn parse_variable(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", input)),
    }
}

pub fn main() {
    let logger = hiro_system_kit::log::setup_logger();
    let _guard = hiro_system_kit::log::setup_global_logger(logger.clone());
    let ctx = Context::new(logger.clone());

    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            println!("{}", e);
            process::exit(1);
        }
    };

    match handle_command(opts, &ctx) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!(logger, "{e}");
            std::thread::sleep(std::time::Duration::from_millis(500));
            process::exit(1);
        }
    }
}

/// Returns whether the command succeeded.
fn handle_command(opts: Opts, ctx: &Context) -> Result<bool, lint::LintError> {
    match opts.command {
        Command::Lint(cmd) => lint::run_lint(&cmd, ctx).map(|outcome| !outcome.failed),
    }
}
