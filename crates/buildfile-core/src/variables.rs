//! `${NAME}` substitution and the companion unresolved-reference scan.
//!
//! Both passes touch the same three strings: a deployment's target path, a
//! path content's host source, and a valued attribute's value. Inline content
//! blocks are never rewritten.

use std::borrow::Cow;
use std::collections::HashMap;

use buildfile_kit::types::{
    DeploymentStatement, Diagnostic, DiagnosticLevel, Model, PathContent, SourceLocation,
    ValuedAttribute,
};
use buildfile_kit::visit::{walk, walk_mut, Visit, VisitMut};
use regex::{Captures, Regex};

use crate::validation::CoreRuleId;

/// Variable name to value. Later inserts win.
pub type VariableMap = HashMap<String, String>;

lazy_static! {
    static ref VARIABLE_REFERENCE: Regex = Regex::new(r"\$\{([^}]+)\}").unwrap();
}

/// Replaces every `${NAME}` whose name is in `variables`.
///
/// Unknown references are left as written and replacement values are not
/// rescanned.
pub fn substitute_str<'a>(input: &'a str, variables: &VariableMap) -> Cow<'a, str> {
    VARIABLE_REFERENCE.replace_all(input, |captures: &Captures| match variables.get(&captures[1]) {
        Some(value) => value.clone(),
        None => captures[0].to_string(),
    })
}

/// Names of the `${...}` references still present in `input`, in order.
pub fn variable_references(input: &str) -> Vec<&str> {
    VARIABLE_REFERENCE
        .captures_iter(input)
        .filter_map(|captures| captures.get(1).map(|name| name.as_str()))
        .collect()
}

struct Substitutor<'a> {
    variables: &'a VariableMap,
}

impl Substitutor<'_> {
    fn rewrite(&self, value: &mut String) {
        let rewritten = match substitute_str(value, self.variables) {
            Cow::Borrowed(_) => return,
            Cow::Owned(rewritten) => rewritten,
        };
        *value = rewritten;
    }
}

impl VisitMut for Substitutor<'_> {
    fn visit_deployment_statement_mut(&mut self, statement: &mut DeploymentStatement) {
        self.rewrite(&mut statement.path);
    }

    fn visit_valued_attribute_mut(&mut self, attribute: &mut ValuedAttribute) {
        self.rewrite(&mut attribute.value);
    }

    fn visit_path_mut(&mut self, path: &mut PathContent) {
        self.rewrite(&mut path.value);
    }
}

/// Rewrites the model in place.
pub fn substitute(model: &mut Model, variables: &VariableMap) {
    if variables.is_empty() {
        return;
    }
    walk_mut(model, &mut Substitutor { variables });
}

struct UnresolvedScanner<'a> {
    level: DiagnosticLevel,
    file: Option<&'a str>,
    diagnostics: Vec<Diagnostic>,
}

impl UnresolvedScanner<'_> {
    fn scan(&mut self, value: &str, location: Option<&SourceLocation>, describe: impl Fn(&str) -> String) {
        for name in variable_references(value) {
            let mut diagnostic = Diagnostic::new(self.level, describe(name))
                .with_code(CoreRuleId::UnresolvedVariable)
                .with_location(location);
            if let Some(file) = self.file {
                diagnostic = diagnostic.with_file(file);
            }
            self.diagnostics.push(diagnostic);
        }
    }
}

impl<'ast> Visit<'ast> for UnresolvedScanner<'_> {
    fn visit_deployment_statement(&mut self, statement: &'ast DeploymentStatement) {
        self.scan(&statement.path, statement.location.as_ref(), |name| {
            format!("Unresolved variable ${{{}}} in path '{}'", name, statement.path)
        });
    }

    fn visit_valued_attribute(&mut self, attribute: &'ast ValuedAttribute) {
        self.scan(&attribute.value, attribute.location.as_ref(), |name| {
            format!(
                "Unresolved variable ${{{}}} in attribute {}={}",
                name, attribute.name, attribute.value
            )
        });
    }

    fn visit_path(&mut self, path: &'ast PathContent) {
        self.scan(&path.value, path.location.as_ref(), |name| {
            format!("Unresolved variable ${{{}}} in content '{}'", name, path.value)
        });
    }
}

/// Reports every `${...}` reference left after substitution, one diagnostic per occurrence.
///
/// `strict` turns the findings into errors; otherwise they are warnings.
pub fn find_unresolved_variables(model: &Model, strict: bool, file: Option<&str>) -> Vec<Diagnostic> {
    let level = if strict { DiagnosticLevel::Error } else { DiagnosticLevel::Warning };
    let mut scanner = UnresolvedScanner { level, file, diagnostics: vec![] };
    walk(model, &mut scanner);
    scanner.diagnostics
}
