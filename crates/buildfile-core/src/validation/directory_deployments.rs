//! Detection of deployments that copy a whole host directory, with
//! suggested per-file replacements.
//!
//! This pass is advisory: its warnings are kept apart from validation
//! diagnostics and it is the only part of the engine that reads the host
//! filesystem.

use std::path::Path;

use buildfile_kit::types::{Content, DeploymentStatement, Diagnostic, Model, SourceLocation};
use buildfile_kit::visit::{walk, Visit};
use serde::Serialize;
use walkdir::WalkDir;

use super::rule_id::CoreRuleId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryDeployment {
    pub target_path: String,
    pub source_path: String,
    pub location: Option<SourceLocation>,
    pub warning: Diagnostic,
    /// Replacement lines, `None` when the source is not a directory on this host
    pub suggestions: Option<Vec<String>>,
}

impl DirectoryDeployment {
    pub fn has_suggestions(&self) -> bool {
        self.suggestions.as_ref().is_some_and(|lines| !lines.is_empty())
    }
}

struct DirectoryDeploymentFinder<'a> {
    file: Option<&'a str>,
    found: Vec<DirectoryDeployment>,
}

impl<'ast> Visit<'ast> for DirectoryDeploymentFinder<'_> {
    fn visit_deployment_statement(&mut self, statement: &'ast DeploymentStatement) {
        let Some(Content::Path(source)) = &statement.content else {
            return;
        };
        if !is_directory_deployment(statement, Path::new(&source.value)) {
            return;
        }

        let mut warning = CoreRuleId::DirectoryDeployment
            .diagnostic(format!("Directory deployment: {} = {}", statement.path, source.value))
            .with_location(statement.location.as_ref());
        if let Some(file) = self.file {
            warning = warning.with_file(file);
        }

        self.found.push(DirectoryDeployment {
            target_path: statement.path.clone(),
            source_path: source.value.clone(),
            location: statement.location,
            warning,
            suggestions: suggest_file_deployments(&statement.path, Path::new(&source.value)),
        });
    }
}

/// An existing host directory, or a missing source declared `type=dir`.
fn is_directory_deployment(statement: &DeploymentStatement, source: &Path) -> bool {
    if source.exists() {
        return source.is_dir();
    }
    statement.has_valued_attribute("type", "dir")
}

/// One `target/relative = source/relative` line per regular file under
/// `source`, sorted by host path. Symlinks to regular files count as files.
pub fn suggest_file_deployments(target: &str, source: &Path) -> Option<Vec<String>> {
    if !source.is_dir() {
        return None;
    }

    let mut files = WalkDir::new(source)
        .into_iter()
        .collect::<Result<Vec<_>, walkdir::Error>>()
        .ok()?
        .into_iter()
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let separator = if target.ends_with('/') { "" } else { "/" };
    let lines = files
        .iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(source).ok()?;
            let relative = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some(format!("{}{}{} = {}", target, separator, relative, file.display()))
        })
        .collect();
    Some(lines)
}

/// Finds every directory deployment of the model, in document order.
pub fn find_directory_deployments(model: &Model, file: Option<&str>) -> Vec<DirectoryDeployment> {
    let mut finder = DirectoryDeploymentFinder { file, found: vec![] };
    walk(model, &mut finder);
    finder.found
}
