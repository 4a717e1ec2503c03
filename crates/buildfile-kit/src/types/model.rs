//! In-memory representation of a parsed buildfile.
//!
//! The tree is produced by an external parser and handed over either directly
//! or as JSON. Apart from variable substitution, which rewrites string fields
//! in place, every consumer treats it as read-only.

use serde::{Deserialize, Serialize};

use super::diagnostics::{Diagnostic, DiagnosticLevel};

/// 1-based position of a node in the original buildfile
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Root of a buildfile: its statements in document order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl Model {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn deployments(&self) -> impl Iterator<Item = &DeploymentStatement> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Deployment(deployment) => Some(deployment),
            Statement::Attribute(_) => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// A standalone `[...]` block
    Attribute(AttributeStatement),
    /// `target = source`, `target = { ... }` or a bare `target`
    Deployment(DeploymentStatement),
}

impl Statement {
    pub fn attribute_section(&self) -> Option<&AttributeSection> {
        match self {
            Statement::Attribute(statement) => statement.attribute_section.as_ref(),
            Statement::Deployment(statement) => statement.attribute_section.as_ref(),
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Statement::Attribute(statement) => statement.location.as_ref(),
            Statement::Deployment(statement) => statement.location.as_ref(),
        }
    }
}

impl From<AttributeStatement> for Statement {
    fn from(statement: AttributeStatement) -> Self {
        Statement::Attribute(statement)
    }
}

impl From<DeploymentStatement> for Statement {
    fn from(statement: DeploymentStatement) -> Self {
        Statement::Deployment(statement)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeStatement {
    #[serde(default)]
    pub attribute_section: Option<AttributeSection>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl AttributeStatement {
    pub fn new(attribute_section: AttributeSection) -> Self {
        Self { attribute_section: Some(attribute_section), location: None }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatement {
    /// Target path inside the image
    pub path: String,
    #[serde(default)]
    pub is_assignment: bool,
    #[serde(default)]
    pub attribute_section: Option<AttributeSection>,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl DeploymentStatement {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Host source path, when the content is a path rather than an inline block
    pub fn source_path(&self) -> Option<&str> {
        match &self.content {
            Some(Content::Path(path)) => Some(path.value.as_str()),
            _ => None,
        }
    }

    /// Looks up a valued attribute declared on this statement's own section.
    pub fn valued_attribute(&self, name: &str) -> Option<&ValuedAttribute> {
        self.attribute_section.as_ref()?.attributes.iter().find_map(|attribute| match attribute {
            Attribute::Valued(valued) if valued.name == name => Some(valued),
            _ => None,
        })
    }

    /// Whether any valued attribute of the section is `name=value`.
    pub fn has_valued_attribute(&self, name: &str, value: &str) -> bool {
        self.attribute_section.as_ref().is_some_and(|section| {
            section.attributes.iter().any(|attribute| {
                matches!(attribute, Attribute::Valued(valued) if valued.name == name && valued.value == value)
            })
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    Path(PathContent),
    Block(ContentBlock),
}

/// Host path the deployed file is read from
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathContent {
    pub value: String,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl PathContent {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), location: None }
    }
}

/// Inline `{ ... }` content. Opaque: never substituted or inspected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSection {
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl AttributeSection {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes, location: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attribute {
    /// `+name` / `-name`
    Boolean(BooleanAttribute),
    /// `name=value`
    Valued(ValuedAttribute),
}

impl Attribute {
    pub fn name(&self) -> &str {
        match self {
            Attribute::Boolean(attribute) => &attribute.name,
            Attribute::Valued(attribute) => &attribute.name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanAttribute {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

fn default_enabled() -> bool {
    true
}

impl BooleanAttribute {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self { name: name.into(), enabled, location: None }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuedAttribute {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl ValuedAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), location: None }
    }
}

/// What the external parser hands over for one buildfile
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub model: Model,
    #[serde(default)]
    pub syntax_diagnostics: Vec<Diagnostic>,
}

impl ParsedDocument {
    pub fn new(file: impl Into<String>, model: Model) -> Self {
        Self { file: Some(file.into()), model, syntax_diagnostics: vec![] }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn has_errors(&self) -> bool {
        self.syntax_diagnostics.iter().any(|diag| diag.level == DiagnosticLevel::Error)
    }

    pub fn no_errors(&self) -> bool {
        !self.has_errors()
    }
}
