//! Semantic validation of buildfile documents
//!
//! Built-in checks (attribute rules, duplicate paths) and the custom
//! validator dispatch are composed by [`ValidationOrchestrator`]. Directory
//! deployment analysis lives here too but is run separately by the document
//! pipeline since its findings are advisory.

pub mod attribute_rules;
pub mod directory_deployments;
pub mod duplicate_paths;
pub mod keywords;
pub mod path_provider;
pub mod rule_id;
pub mod suggestions;
pub mod types;
pub mod validator;

pub use attribute_rules::{AttributeRules, AttributeValueRule};
pub use directory_deployments::{
    find_directory_deployments, suggest_file_deployments, DirectoryDeployment,
};
pub use duplicate_paths::find_duplicate_paths;
pub use keywords::{is_boolean_keyword, is_valued_keyword};
pub use path_provider::{
    CustomValidatorPathProvider, EnvCustomValidator, FixedCustomValidator, NoCustomValidator,
    CUSTOM_VALIDATOR_ENV,
};
pub use rule_id::{CoreRuleId, RuleIdentifier};
pub use types::ValidationResult;
pub use validator::ValidationOrchestrator;
