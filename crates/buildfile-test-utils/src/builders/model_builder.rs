use buildfile_kit::types::{
    Attribute, AttributeSection, AttributeStatement, BooleanAttribute, Content, ContentBlock,
    DeploymentStatement, Diagnostic, Model, ParsedDocument, PathContent, SourceLocation,
    Statement, ValuedAttribute,
};

/// Builder for document models used in tests
///
/// Statements are numbered as if each one sat on its own line, starting at 1,
/// so diagnostics produced from a built model carry predictable locations.
/// Attributes and content share the line of their statement.
///
/// # Example
///
/// ```rust
/// use buildfile_test_utils::ModelBuilder;
///
/// let model = ModelBuilder::new()
///     .attribute_statement()
///         .valued("uid", "0")
///     .assign("/bin/sh", "${QNX_TARGET}/bin/ksh")
///         .valued("perms", "0755")
///         .boolean("optional", false)
///     .inline("/etc/motd", "hello")
///     .build();
///
/// assert_eq!(model.statements.len(), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ModelBuilder {
    statements: Vec<Statement>,
    syntax_diagnostics: Vec<Diagnostic>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_location(&self) -> Option<SourceLocation> {
        Some(SourceLocation::new(self.statements.len() + 1, 1))
    }

    /// Starts a standalone `[...]` statement
    pub fn attribute_statement(mut self) -> Self {
        let location = self.next_location();
        self.statements.push(Statement::Attribute(AttributeStatement {
            attribute_section: Some(AttributeSection { attributes: vec![], location }),
            location,
        }));
        self
    }

    /// Starts a bare deployment (`target` without `=`)
    pub fn deploy(mut self, target: &str) -> Self {
        let location = self.next_location();
        let mut statement = DeploymentStatement::new(target);
        statement.location = location;
        self.statements.push(Statement::Deployment(statement));
        self
    }

    /// Starts a `target = source` deployment
    pub fn assign(self, target: &str, source: &str) -> Self {
        self.deploy(target).source(source)
    }

    /// Starts a `target = { text }` deployment
    pub fn inline(self, target: &str, text: &str) -> Self {
        let mut builder = self.deploy(target);
        if let Some(statement) = builder.current_deployment() {
            statement.is_assignment = true;
            statement.content = Some(Content::Block(ContentBlock {
                text: text.to_string(),
                location: statement.location,
            }));
        }
        builder
    }

    /// Sets the host source path of the current deployment
    pub fn source(mut self, source: &str) -> Self {
        if let Some(statement) = self.current_deployment() {
            statement.is_assignment = true;
            statement.content = Some(Content::Path(PathContent {
                value: source.to_string(),
                location: statement.location,
            }));
        }
        self
    }

    pub fn boolean(self, name: &str, enabled: bool) -> Self {
        self.attribute(|location| {
            Attribute::Boolean(BooleanAttribute { name: name.to_string(), enabled, location })
        })
    }

    pub fn valued(self, name: &str, value: &str) -> Self {
        self.attribute(|location| {
            Attribute::Valued(ValuedAttribute {
                name: name.to_string(),
                value: value.to_string(),
                location,
            })
        })
    }

    /// Adds a syntax diagnostic to the document produced by [`ModelBuilder::document`]
    pub fn syntax_error(mut self, message: &str) -> Self {
        let line = self.statements.len().max(1);
        self.syntax_diagnostics.push(Diagnostic::error(message).with_line(line).with_column(1));
        self
    }

    fn attribute(mut self, make: impl FnOnce(Option<SourceLocation>) -> Attribute) -> Self {
        let Some(statement) = self.statements.last_mut() else {
            panic!("attributes must follow a statement");
        };
        let (section, location) = match statement {
            Statement::Attribute(statement) => (&mut statement.attribute_section, statement.location),
            Statement::Deployment(statement) => (&mut statement.attribute_section, statement.location),
        };
        section
            .get_or_insert_with(|| AttributeSection { attributes: vec![], location })
            .attributes
            .push(make(location));
        self
    }

    fn current_deployment(&mut self) -> Option<&mut DeploymentStatement> {
        match self.statements.last_mut() {
            Some(Statement::Deployment(statement)) => Some(statement),
            _ => None,
        }
    }

    pub fn build(self) -> Model {
        Model::new(self.statements)
    }

    pub fn document(self, file: &str) -> ParsedDocument {
        ParsedDocument {
            file: Some(file.to_string()),
            model: Model::new(self.statements),
            syntax_diagnostics: self.syntax_diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_follow_statement_order() {
        let model = ModelBuilder::new()
            .deploy("/tmp")
            .assign("/bin/sh", "ksh")
            .valued("uid", "0")
            .build();

        let shell = model.deployments().nth(1).unwrap();
        assert_eq!(shell.location, Some(SourceLocation::new(2, 1)));
        assert!(shell.is_assignment);
        assert_eq!(shell.source_path(), Some("ksh"));
        assert_eq!(shell.valued_attribute("uid").unwrap().location, Some(SourceLocation::new(2, 1)));
    }

    #[test]
    fn test_document_carries_syntax_errors() {
        let document = ModelBuilder::new().deploy("/tmp").syntax_error("unexpected '}'").document("a.build");
        assert!(document.has_errors());
        assert_eq!(document.file.as_deref(), Some("a.build"));
    }
}
