//! The `lint` command: loads parsed documents, analyzes them and reports.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use buildfile_core::validation::FixedCustomValidator;
use buildfile_core::{
    analyze_document, AnalysisOptions, Context, DocumentReport, PluginLoader,
    ValidationOrchestrator, VariableMap,
};
use buildfile_kit::types::ParsedDocument;

pub mod config;
pub mod error;
pub mod formatter;

pub use config::ConfigFile;
pub use error::LintError;
pub use formatter::{get_formatter, Format, OutputFormatter};

use super::LintCommand;

/// Settings for one lint run after merging CLI flags, config file and environment
#[derive(Debug, Clone, PartialEq)]
pub struct LintSettings {
    pub custom_validator: Option<PathBuf>,
    pub variables: VariableMap,
    pub strict_variables: bool,
    pub fail_on_warning: bool,
    pub format: Format,
    pub report_path: Option<PathBuf>,
    pub quiet: bool,
}

impl LintSettings {
    /// CLI flags win over the config file, which wins over defaults.
    ///
    /// Variables are layered: `environment`, then the config file's
    /// `variables`, then `-e` overrides in the order given.
    pub fn resolve(
        cmd: &LintCommand,
        config: Option<ConfigFile>,
        environment: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let config = config.unwrap_or_default();

        let mut variables: VariableMap = environment.into_iter().collect();
        variables.extend(config.variables);
        variables.extend(cmd.variables.iter().cloned());

        LintSettings {
            custom_validator: cmd.custom_validator.clone().or(config.custom_validator),
            variables,
            strict_variables: cmd.strict_variables || config.strict_variables.unwrap_or(false),
            fail_on_warning: cmd.fail_on_warning || config.fail_on_warning.unwrap_or(false),
            format: cmd.format.or(config.format).unwrap_or_default(),
            report_path: cmd.report_path.clone(),
            quiet: cmd.quiet,
        }
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            variables: self.variables.clone(),
            strict_variables: self.strict_variables,
        }
    }
}

#[derive(Debug)]
pub struct LintOutcome {
    pub reports: Vec<DocumentReport>,
    pub failed: bool,
}

/// Reads a parsed document; documents without a file name are named after `path`.
pub fn load_document(path: &Path) -> Result<ParsedDocument, LintError> {
    let content = fs::read_to_string(path).map_err(|e| LintError::DocumentLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut document = ParsedDocument::from_json_str(&content).map_err(|e| {
        LintError::DocumentLoad { path: path.to_path_buf(), message: e.to_string() }
    })?;
    if document.file.is_none() {
        document.file = Some(path.display().to_string());
    }
    Ok(document)
}

/// Main entry point for the lint command
pub fn run_lint(cmd: &LintCommand, ctx: &Context) -> Result<LintOutcome, LintError> {
    let config = ConfigFile::load(cmd.config_path.as_deref())?;
    let settings = LintSettings::resolve(cmd, config, env::vars());
    let outcome = lint_files(&cmd.files, &settings, ctx)?;

    let formatter = get_formatter(settings.format, settings.quiet);
    match &settings.report_path {
        Some(path) => {
            colored::control::set_override(false);
            fs::write(path, formatter.render(&outcome.reports))?;
            if !settings.quiet {
                eprintln!("Report written to: {}", path.display());
            }
        }
        None => print!("{}", formatter.render(&outcome.reports)),
    }
    Ok(outcome)
}

/// Analyzes every file with the resolved settings, without printing anything.
pub fn lint_files(
    files: &[PathBuf],
    settings: &LintSettings,
    ctx: &Context,
) -> Result<LintOutcome, LintError> {
    let mut orchestrator = ValidationOrchestrator::with_loader(Arc::new(PluginLoader::new()));
    if let Some(path) = &settings.custom_validator {
        if !path.exists() {
            return Err(LintError::CustomValidatorNotFound(path.clone()));
        }
        if !settings.quiet {
            eprintln!("Using custom validator: {}", path.display());
        }
        orchestrator = orchestrator.with_provider(FixedCustomValidator(path.clone()));
    }

    let options = settings.analysis_options();
    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let document = load_document(file)?;
        reports.push(analyze_document(document, &options, &orchestrator, ctx));
    }

    let failed = reports.iter().any(|report| report.exit_failure(settings.fail_on_warning));
    Ok(LintOutcome { reports, failed })
}
