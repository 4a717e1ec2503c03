//! Reports every deployment it sees and panics on `/panic`.

use buildfile_kit::export_validator;
use buildfile_kit::plugin::{CheckSpecification, CustomValidator};
use buildfile_kit::types::{DeploymentStatement, Diagnostic};

#[derive(Debug, Default)]
pub struct FaultyValidator;

impl CustomValidator for FaultyValidator {
    fn name(&self) -> &str {
        "faulty-validator"
    }

    fn checks(&self) -> Vec<CheckSpecification> {
        vec![CheckSpecification::typed("seen", |statement: &DeploymentStatement, sink| {
            if statement.path == "/panic" {
                panic!("refusing to inspect {}", statement.path);
            }
            sink.report(Diagnostic::warning(format!("seen {}", statement.path)).with_code("seen"));
            Ok(())
        })]
    }
}

export_validator!(FaultyValidator);
