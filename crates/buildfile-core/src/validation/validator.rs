//! High-level validation API for parsed documents

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use buildfile_kit::plugin::{collect_nodes, DiagnosticSink};
use buildfile_kit::types::{Diagnostic, Model, ParsedDocument};

use super::attribute_rules::AttributeRules;
use super::duplicate_paths::find_duplicate_paths;
use super::path_provider::{CustomValidatorPathProvider, NoCustomValidator};
use super::rule_id::CoreRuleId;
use super::types::ValidationResult;
use crate::context::Context;
use crate::plugin::{ArtifactOpener, LoadedPlugin, NativeOpener, PluginLoader};

/// Runs built-in checks and the configured custom validator over a document.
///
/// One orchestrator can serve many documents; the custom validator path is
/// asked of the provider on every pass.
pub struct ValidationOrchestrator<O: ArtifactOpener = NativeOpener> {
    rules: AttributeRules,
    provider: Box<dyn CustomValidatorPathProvider>,
    loader: Arc<PluginLoader<O>>,
    active_path: Mutex<Option<PathBuf>>,
}

impl ValidationOrchestrator<NativeOpener> {
    /// Orchestrator backed by the process-wide plugin loader
    pub fn new() -> Self {
        Self::with_loader(PluginLoader::shared())
    }
}

impl Default for ValidationOrchestrator<NativeOpener> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ArtifactOpener> ValidationOrchestrator<O> {
    pub fn with_loader(loader: Arc<PluginLoader<O>>) -> Self {
        Self {
            rules: AttributeRules::default(),
            provider: Box::new(NoCustomValidator),
            loader,
            active_path: Mutex::new(None),
        }
    }

    pub fn with_provider(mut self, provider: impl CustomValidatorPathProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    pub fn with_rules(mut self, rules: AttributeRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &AttributeRules {
        &self.rules
    }

    /// Validates a document, passing syntax diagnostics through untouched.
    ///
    /// A document with syntax diagnostics gets no semantic validation.
    pub fn validate_document(&self, document: &ParsedDocument, ctx: &Context) -> ValidationResult {
        if !document.syntax_diagnostics.is_empty() {
            let mut result = ValidationResult::from(document.syntax_diagnostics.clone());
            attribute_to_file(&mut result, document.file.as_deref());
            return result;
        }
        self.validate_model(&document.model, document.file.as_deref(), ctx)
    }

    /// Attribute rules, duplicate paths, then the custom validator, in that order.
    pub fn validate_model(&self, model: &Model, file: Option<&str>, ctx: &Context) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.extend(self.rules.check_model(model));
        result.extend(find_duplicate_paths(model));

        if let Some(path) = self.current_validator_path(ctx) {
            match self.loader.load(&path, ctx) {
                Ok(plugin) => result.extend(run_custom_checks(&plugin, model, file, ctx)),
                Err(e) => {
                    ctx.try_warn(format!("Custom validator skipped: {}", e));
                    result.push(
                        CoreRuleId::CustomValidatorLoad
                            .diagnostic(format!("Unable to load custom validator: {}", e)),
                    );
                }
            }
        }

        attribute_to_file(&mut result, file);
        result
    }

    /// Asks the provider for the validator path, forgetting the previous
    /// path's cache entry when it changed.
    fn current_validator_path(&self, ctx: &Context) -> Option<PathBuf> {
        let path = self.provider.validator_path();
        let mut active = self.active_path.lock().unwrap_or_else(PoisonError::into_inner);
        if *active != path {
            if let Some(previous) = active.as_deref() {
                if self.loader.forget(previous) {
                    ctx.try_info(format!(
                        "Custom validator path changed, released {}",
                        previous.display()
                    ));
                }
            }
            *active = path.clone();
        }
        path
    }
}

/// Runs every applicable check against every node in walk order.
///
/// A failing or panicking check is logged and skipped; what it reported
/// before failing is kept. Panics are caught inside the artifact by the
/// check's runner and arrive here as errors.
fn run_custom_checks(
    plugin: &LoadedPlugin,
    model: &Model,
    file: Option<&str>,
    ctx: &Context,
) -> Vec<Diagnostic> {
    let mut sink = DiagnosticSink::new(file.map(str::to_string));
    for node in collect_nodes(model) {
        for check in plugin.checks().iter().filter(|check| check.applies_to(&node)) {
            let start = sink.len();
            let outcome = check.run(node, &mut sink);
            sink.fill_missing_locations(start, node.location());

            let Err(cause) = outcome else {
                continue;
            };
            ctx.try_error(format!(
                "Custom validator {} check '{}' failed on {}: {}",
                plugin.entry_point(),
                check.name,
                node.kind(),
                cause
            ));
        }
    }
    sink.into_diagnostics()
}

fn attribute_to_file(result: &mut ValidationResult, file: Option<&str>) {
    let Some(file) = file else {
        return;
    };
    for diagnostic in result.diagnostics.iter_mut().filter(|d| d.file.is_none()) {
        diagnostic.file = Some(file.to_string());
    }
}
