use buildfile_kit::types::{DeploymentStatement, Diagnostic, Model};
use buildfile_kit::visit::{walk, Visit};
use indexmap::IndexMap;

use super::rule_id::CoreRuleId;

#[derive(Default)]
struct PathGroups<'ast> {
    groups: IndexMap<&'ast str, Vec<&'ast DeploymentStatement>>,
}

impl<'ast> Visit<'ast> for PathGroups<'ast> {
    fn visit_deployment_statement(&mut self, statement: &'ast DeploymentStatement) {
        self.groups.entry(statement.path.as_str()).or_default().push(statement);
    }
}

/// Warns about every deployment whose target path is used more than once.
///
/// All members of a group are flagged, not only the repeats. Groups come out in
/// order of their first occurrence, members in document order. Assignment and
/// bare deployments are grouped together.
pub fn find_duplicate_paths(model: &Model) -> Vec<Diagnostic> {
    let mut visitor = PathGroups::default();
    walk(model, &mut visitor);

    let mut diagnostics = vec![];
    for (path, statements) in visitor.groups.iter().filter(|(_, members)| members.len() > 1) {
        for statement in statements {
            diagnostics.push(
                CoreRuleId::DuplicatePath
                    .diagnostic(format!("Duplicate path {}", path))
                    .with_location(statement.location.as_ref())
                    .with_context(format!("{} deployments target {}", statements.len(), path)),
            );
        }
    }
    diagnostics
}
