pub mod diagnostics;
pub mod model;

pub use diagnostics::{Diagnostic, DiagnosticLevel};
pub use model::{
    Attribute, AttributeSection, AttributeStatement, BooleanAttribute, Content, ContentBlock,
    DeploymentStatement, Model, ParsedDocument, PathContent, SourceLocation, Statement,
    ValuedAttribute,
};
