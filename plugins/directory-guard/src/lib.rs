//! Example custom validator.
//!
//! Build with `cargo build -p directory-guard` and pass the resulting
//! library to `buildfile lint --custom-validator`.

use buildfile_kit::plugin::{CheckSpecification, CustomValidator};
use buildfile_kit::types::{Content, DeploymentStatement, Diagnostic};
use buildfile_kit::export_validator;

pub const COPIED_PATH: &str = "copiedPath";

/// Flags deployments that copy a host directory declared with `type=dir`.
#[derive(Debug, Default)]
pub struct DirectoryGuard;

impl CustomValidator for DirectoryGuard {
    fn name(&self) -> &str {
        "directory-guard"
    }

    fn checks(&self) -> Vec<CheckSpecification> {
        vec![CheckSpecification::typed(COPIED_PATH, |statement: &DeploymentStatement, sink| {
            let copies_path = matches!(statement.content, Some(Content::Path(_)));
            if copies_path && statement.has_valued_attribute("type", "dir") {
                sink.report(
                    Diagnostic::warning(
                        "Copying whole directories from host is considered harmful",
                    )
                    .with_code(COPIED_PATH)
                    .with_location(statement.location.as_ref()),
                );
            }
            Ok(())
        })]
    }
}

export_validator!(DirectoryGuard);

#[cfg(test)]
mod tests {
    use super::*;
    use buildfile_kit::plugin::{collect_nodes, DiagnosticSink, NodeKind};
    use buildfile_kit::KIT_VERSION;
    use buildfile_test_utils::ModelBuilder;

    fn run(model: &buildfile_kit::types::Model) -> Vec<Diagnostic> {
        let checks = DirectoryGuard.checks();
        let mut sink = DiagnosticSink::new(Some("ifs.build".into()));
        for node in collect_nodes(model) {
            for check in checks.iter().filter(|check| check.applies_to(&node)) {
                check.run(node, &mut sink).unwrap();
            }
        }
        sink.into_diagnostics()
    }

    #[test]
    fn test_directory_copy_is_flagged() {
        let model = ModelBuilder::new()
            .assign("/opt/app", "build/app")
            .valued("type", "dir")
            .assign("/opt/app/config", "build/config")
            .inline("/etc/motd", "hello")
            .valued("type", "dir")
            .deploy("/var/log")
            .valued("type", "dir")
            .build();

        let diagnostics = run(&model);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert!(diagnostic.is_warning());
        assert!(diagnostic.has_code("copiedPath"));
        assert_eq!(diagnostic.message, "Copying whole directories from host is considered harmful");
        assert_eq!(diagnostic.line, Some(1));
        assert_eq!(diagnostic.file.as_deref(), Some("ifs.build"));
    }

    #[test]
    fn test_manifest_describes_the_validator() {
        assert_eq!(BUILDFILE_VALIDATOR_MANIFEST.kit_version, KIT_VERSION);
        assert!(BUILDFILE_VALIDATOR_MANIFEST.entry_point.ends_with("::DirectoryGuard"));

        let constructed = (BUILDFILE_VALIDATOR_MANIFEST.construct)().unwrap();
        assert_eq!(constructed.name, "directory-guard");
        let checks = constructed.checks;
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].name, COPIED_PATH);
        assert_eq!(checks[0].accepts, NodeKind::DeploymentStatement);
    }
}
