//! Output formatting for lint reports

use std::fmt::Write;

use buildfile_core::validation::DirectoryDeployment;
use buildfile_core::DocumentReport;
use buildfile_kit::types::{Diagnostic, DiagnosticLevel};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Output format for lint results
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,  // For CLI argument parsing
    AsRefStr,         // Provides as_ref() -> &str
    Display,          // Provides to_string()
    EnumString,       // Provides from_str()
    IntoStaticStr,    // Provides into() -> &'static str
    EnumIter,         // Provides iter() over all variants
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    /// Stylish format (default, human-readable, grouped per file)
    #[default]
    Stylish,
    /// Compact format (one line per issue)
    Compact,
    /// JSON format (machine-readable)
    Json,
}

pub trait OutputFormatter {
    fn render(&self, reports: &[DocumentReport]) -> String;
}

/// `quiet` drops the stylish per-file headers, counts and summary.
pub fn get_formatter(format: Format, quiet: bool) -> Box<dyn OutputFormatter> {
    match format {
        Format::Stylish => Box::new(StylishFormatter { quiet }),
        Format::Compact => Box::new(CompactFormatter),
        Format::Json => Box::new(JsonFormatter),
    }
}

const NO_SUGGESTION: &str = "(source directory not found or empty on this host)";

fn total_counts(reports: &[DocumentReport]) -> (usize, usize) {
    reports.iter().fold((0, 0), |(errors, warnings), report| {
        (errors + report.error_count(), warnings + report.warning_count())
    })
}

fn display_file(report: &DocumentReport) -> &str {
    report.file.as_deref().unwrap_or("<unknown>")
}

struct StylishFormatter {
    quiet: bool,
}

impl StylishFormatter {
    fn diagnostic_line(out: &mut String, diagnostic: &Diagnostic) {
        let label = match (diagnostic.level, diagnostic.code.as_deref()) {
            (DiagnosticLevel::Error, Some(code)) => format!("error[{}]", code).red().bold(),
            (DiagnosticLevel::Error, None) => "error".red().bold(),
            (DiagnosticLevel::Warning, Some(code)) => format!("warning[{}]", code).yellow().bold(),
            (DiagnosticLevel::Warning, None) => "warning".yellow().bold(),
        };
        let location = match (diagnostic.line, diagnostic.column) {
            (Some(line), Some(column)) => format!("{}:{}", line, column),
            (Some(line), None) => line.to_string(),
            _ => String::new(),
        };
        let _ = writeln!(out, "  {} {} {}", location.dimmed(), label, diagnostic.message);
        if let Some(context) = &diagnostic.context {
            let _ = writeln!(out, "      {}", context.dimmed());
        }
        if let Some(suggestion) = &diagnostic.suggestion {
            let _ = writeln!(out, "      {}", suggestion.cyan());
        }
    }

    fn directory_deployment(out: &mut String, deployment: &DirectoryDeployment) {
        Self::diagnostic_line(out, &deployment.warning);
        match &deployment.suggestions {
            Some(lines) if !lines.is_empty() => {
                let _ = writeln!(out, "      Suggestion: replace with individual file deployments:");
                for line in lines {
                    let _ = writeln!(out, "        {}", line.green());
                }
            }
            _ => {
                let _ = writeln!(out, "      {}", NO_SUGGESTION.dimmed());
            }
        }
    }
}

impl OutputFormatter for StylishFormatter {
    fn render(&self, reports: &[DocumentReport]) -> String {
        let mut out = String::new();
        for report in reports {
            if !self.quiet {
                let _ = writeln!(out, "{}", format!("* {} *", display_file(report)).bold());
            }
            for diagnostic in &report.diagnostics.diagnostics {
                Self::diagnostic_line(&mut out, diagnostic);
            }
            for deployment in &report.directory_deployments {
                Self::directory_deployment(&mut out, deployment);
            }
            if self.quiet {
                continue;
            }
            let _ = writeln!(
                out,
                "  {} error(s), {} warning(s)",
                report.error_count(),
                report.warning_count()
            );
        }

        if self.quiet {
            return out;
        }
        let (errors, warnings) = total_counts(reports);
        let summary = format!("Summary: {} error(s), {} warning(s)", errors, warnings);
        let summary = if errors > 0 {
            summary.red().bold()
        } else if warnings > 0 {
            summary.yellow().bold()
        } else {
            summary.green()
        };
        let _ = writeln!(out, "\n{}", summary);
        out
    }
}

struct CompactFormatter;

impl CompactFormatter {
    fn line(out: &mut String, file: &str, diagnostic: &Diagnostic) {
        let label = match &diagnostic.code {
            Some(code) => format!("{}[{}]", diagnostic.level, code),
            None => diagnostic.level.to_string(),
        };
        let _ = writeln!(
            out,
            "{}:{}:{}: {}: {}",
            diagnostic.file.as_deref().unwrap_or(file),
            diagnostic.line.unwrap_or(1),
            diagnostic.column.unwrap_or(1),
            label,
            diagnostic.message
        );
    }
}

impl OutputFormatter for CompactFormatter {
    fn render(&self, reports: &[DocumentReport]) -> String {
        let mut out = String::new();
        for report in reports {
            let file = display_file(report);
            for diagnostic in &report.diagnostics.diagnostics {
                Self::line(&mut out, file, diagnostic);
            }
            for deployment in &report.directory_deployments {
                Self::line(&mut out, file, &deployment.warning);
            }
        }
        out
    }
}

struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn render(&self, reports: &[DocumentReport]) -> String {
        let (errors, warnings) = total_counts(reports);
        let output = serde_json::json!({
            "files": reports.iter().map(|report| {
                serde_json::json!({
                    "file": report.file,
                    "errors": report.error_count(),
                    "warnings": report.warning_count(),
                    "diagnostics": report.diagnostics,
                    "directory_deployments": report.directory_deployments,
                })
            }).collect::<Vec<_>>(),
            "summary": { "errors": errors, "warnings": warnings },
        });
        format!("{:#}\n", output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildfile_core::validation::CoreRuleId;
    use buildfile_core::ValidationResult;
    use std::str::FromStr;

    fn report() -> DocumentReport {
        let diagnostics = ValidationResult::from(vec![
            CoreRuleId::InvalidUid
                .diagnostic("Wrong format \"root\" for uid (decimal id or *)")
                .with_file("ifs.build")
                .with_line(2)
                .with_column(1),
            Diagnostic::warning("plain").with_file("ifs.build"),
        ]);
        let warning = CoreRuleId::DirectoryDeployment
            .diagnostic("Directory deployment: /opt/app = src")
            .with_file("ifs.build")
            .with_line(4)
            .with_column(1);
        DocumentReport {
            file: Some("ifs.build".into()),
            diagnostics,
            directory_deployments: vec![
                DirectoryDeployment {
                    target_path: "/opt/app".into(),
                    source_path: "src".into(),
                    location: None,
                    warning: warning.clone(),
                    suggestions: Some(vec!["/opt/app/a.txt = src/a.txt".into()]),
                },
                DirectoryDeployment {
                    target_path: "/opt/lib".into(),
                    source_path: "lib".into(),
                    location: None,
                    warning,
                    suggestions: None,
                },
            ],
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(Format::from_str("stylish").unwrap(), Format::Stylish);
        assert_eq!(Format::from_str("compact").unwrap(), Format::Compact);
        assert_eq!(Format::from_str("json").unwrap(), Format::Json);
        assert!(Format::from_str("quickfix").is_err());
        assert_eq!(Format::default().as_ref(), "stylish");
    }

    #[test]
    fn test_stylish_groups_per_file_with_summary() {
        colored::control::set_override(false);
        let output = get_formatter(Format::Stylish, false).render(&[report()]);

        assert!(output.starts_with("* ifs.build *\n"));
        assert!(output.contains("  2:1 error[invalidUid] Wrong format \"root\" for uid"));
        assert!(output.contains("Suggestion: replace with individual file deployments:"));
        assert!(output.contains("        /opt/app/a.txt = src/a.txt\n"));
        assert!(output.contains(NO_SUGGESTION));
        assert!(output.contains("  1 error(s), 3 warning(s)\n"));
        assert!(output.ends_with("Summary: 1 error(s), 3 warning(s)\n"));
    }

    #[test]
    fn test_compact_one_line_per_finding() {
        let output = get_formatter(Format::Compact, false).render(&[report()]);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "ifs.build:2:1: error[invalidUid]: Wrong format \"root\" for uid (decimal id or *)",
                "ifs.build:1:1: warning: plain",
                "ifs.build:4:1: warning[directoryDeployment]: Directory deployment: /opt/app = src",
                "ifs.build:4:1: warning[directoryDeployment]: Directory deployment: /opt/app = src",
            ]
        );
    }

    #[test]
    fn test_json_output_shape() {
        let output = get_formatter(Format::Json, false).render(&[report()]);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["summary"]["warnings"], 3);
        let file = &value["files"][0];
        assert_eq!(file["file"], "ifs.build");
        assert_eq!(file["diagnostics"][0]["code"], "invalidUid");
        assert_eq!(file["diagnostics"][0]["level"], "error");
        assert_eq!(file["directory_deployments"][0]["suggestions"][0], "/opt/app/a.txt = src/a.txt");
        assert!(file["directory_deployments"][1]["suggestions"].is_null());
    }

    #[test]
    fn test_empty_run_summary() {
        colored::control::set_override(false);
        let output = get_formatter(Format::Stylish, false).render(&[]);
        assert_eq!(output, "\nSummary: 0 error(s), 0 warning(s)\n");
        assert_eq!(get_formatter(Format::Compact, false).render(&[]), "");
    }

    #[test]
    fn test_quiet_stylish_keeps_only_findings() {
        colored::control::set_override(false);
        let output = get_formatter(Format::Stylish, true).render(&[report()]);

        assert!(!output.contains("* ifs.build *"));
        assert!(!output.contains("error(s)"));
        assert!(output.starts_with("  2:1 error[invalidUid] Wrong format \"root\" for uid"));
        assert!(output.contains("Suggestion: replace with individual file deployments:"));
        assert!(output.contains(NO_SUGGESTION));
        assert_eq!(get_formatter(Format::Stylish, true).render(&[]), "");
    }
}
