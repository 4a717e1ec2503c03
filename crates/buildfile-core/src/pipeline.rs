//! End-to-end analysis of one parsed document: variable substitution,
//! unresolved-variable scan, validation and directory deployment analysis.

use buildfile_kit::types::ParsedDocument;
use serde::Serialize;

use crate::context::Context;
use crate::plugin::ArtifactOpener;
use crate::validation::{
    find_directory_deployments, DirectoryDeployment, ValidationOrchestrator, ValidationResult,
};
use crate::variables::{find_unresolved_variables, substitute, VariableMap};

#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Final variable mapping, already merged by the caller
    pub variables: VariableMap,
    /// Report unresolved variables as errors rather than warnings
    pub strict_variables: bool,
}

/// Everything found in one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentReport {
    pub file: Option<String>,
    pub diagnostics: ValidationResult,
    pub directory_deployments: Vec<DirectoryDeployment>,
}

impl DocumentReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    /// Validation warnings plus one per directory deployment
    pub fn warning_count(&self) -> usize {
        self.diagnostics.warning_count() + self.directory_deployments.len()
    }

    pub fn exit_failure(&self, fail_on_warning: bool) -> bool {
        self.error_count() > 0 || (fail_on_warning && self.warning_count() > 0)
    }
}

/// Runs the full analysis over `document`.
///
/// A document carrying syntax diagnostics is reported as-is: no
/// substitution, no semantic checks, no directory analysis.
pub fn analyze_document<O: ArtifactOpener>(
    mut document: ParsedDocument,
    options: &AnalysisOptions,
    orchestrator: &ValidationOrchestrator<O>,
    ctx: &Context,
) -> DocumentReport {
    if !document.syntax_diagnostics.is_empty() {
        return DocumentReport {
            diagnostics: orchestrator.validate_document(&document, ctx),
            file: document.file,
            directory_deployments: vec![],
        };
    }

    substitute(&mut document.model, &options.variables);

    let file = document.file.as_deref();
    let mut diagnostics = ValidationResult::from(find_unresolved_variables(
        &document.model,
        options.strict_variables,
        file,
    ));
    diagnostics.extend(orchestrator.validate_document(&document, ctx).into_diagnostics());
    let directory_deployments = find_directory_deployments(&document.model, file);

    DocumentReport { file: document.file, diagnostics, directory_deployments }
}
