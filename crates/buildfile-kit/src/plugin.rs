//! Interface between the validation engine and custom validator plugins.
//!
//! A plugin is a `cdylib` that depends on this crate, implements
//! [`CustomValidator`] for a `Default` type and exports it with
//! [`export_validator!`](crate::export_validator). The engine reads the
//! exported [`PluginManifest`], checks that both sides were built against the
//! same kit version, and constructs the validator once per load.
//!
//! An artifact carries its own copy of std, so a panic must never unwind
//! into the engine. Constructors and check runners built through this module
//! catch panics on the artifact's side and hand them back as errors.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::types::{
    AttributeSection, AttributeStatement, BooleanAttribute, ContentBlock, DeploymentStatement,
    Diagnostic, Model, PathContent, SourceLocation, ValuedAttribute,
};
use crate::visit::{walk, Visit};

/// Name of the static every plugin artifact exports.
pub const MANIFEST_SYMBOL: &[u8] = b"BUILDFILE_VALIDATOR_MANIFEST\0";

/// Node types a check can declare as its single parameter
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, IntoStaticStr, EnumIter,
)]
pub enum NodeKind {
    Model,
    AttributeStatement,
    DeploymentStatement,
    AttributeSection,
    BooleanAttribute,
    ValuedAttribute,
    ContentBlock,
    Path,
}

/// A borrowed view of one model node, as handed to plugin checks
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Model(&'a Model),
    AttributeStatement(&'a AttributeStatement),
    DeploymentStatement(&'a DeploymentStatement),
    AttributeSection(&'a AttributeSection),
    BooleanAttribute(&'a BooleanAttribute),
    ValuedAttribute(&'a ValuedAttribute),
    ContentBlock(&'a ContentBlock),
    Path(&'a PathContent),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Model(_) => NodeKind::Model,
            Node::AttributeStatement(_) => NodeKind::AttributeStatement,
            Node::DeploymentStatement(_) => NodeKind::DeploymentStatement,
            Node::AttributeSection(_) => NodeKind::AttributeSection,
            Node::BooleanAttribute(_) => NodeKind::BooleanAttribute,
            Node::ValuedAttribute(_) => NodeKind::ValuedAttribute,
            Node::ContentBlock(_) => NodeKind::ContentBlock,
            Node::Path(_) => NodeKind::Path,
        }
    }

    pub fn location(&self) -> Option<&'a SourceLocation> {
        match self {
            Node::Model(_) => None,
            Node::AttributeStatement(node) => node.location.as_ref(),
            Node::DeploymentStatement(node) => node.location.as_ref(),
            Node::AttributeSection(node) => node.location.as_ref(),
            Node::BooleanAttribute(node) => node.location.as_ref(),
            Node::ValuedAttribute(node) => node.location.as_ref(),
            Node::ContentBlock(node) => node.location.as_ref(),
            Node::Path(node) => node.location.as_ref(),
        }
    }
}

/// Every node of `model`, in walk order.
pub fn collect_nodes(model: &Model) -> Vec<Node<'_>> {
    struct Collector<'ast>(Vec<Node<'ast>>);

    impl<'ast> Visit<'ast> for Collector<'ast> {
        fn visit_model(&mut self, model: &'ast Model) {
            self.0.push(Node::Model(model));
        }
        fn visit_attribute_statement(&mut self, statement: &'ast AttributeStatement) {
            self.0.push(Node::AttributeStatement(statement));
        }
        fn visit_deployment_statement(&mut self, statement: &'ast DeploymentStatement) {
            self.0.push(Node::DeploymentStatement(statement));
        }
        fn visit_attribute_section(&mut self, section: &'ast AttributeSection) {
            self.0.push(Node::AttributeSection(section));
        }
        fn visit_boolean_attribute(&mut self, attribute: &'ast BooleanAttribute) {
            self.0.push(Node::BooleanAttribute(attribute));
        }
        fn visit_valued_attribute(&mut self, attribute: &'ast ValuedAttribute) {
            self.0.push(Node::ValuedAttribute(attribute));
        }
        fn visit_content_block(&mut self, block: &'ast ContentBlock) {
            self.0.push(Node::ContentBlock(block));
        }
        fn visit_path(&mut self, path: &'ast PathContent) {
            self.0.push(Node::Path(path));
        }
    }

    let mut collector = Collector(vec![]);
    walk(model, &mut collector);
    collector.0
}

/// Model types a typed check can be declared over.
pub trait NodeType {
    const KIND: NodeKind;
    fn from_node<'a>(node: Node<'a>) -> Option<&'a Self>;
}

macro_rules! node_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl NodeType for $ty {
                const KIND: NodeKind = NodeKind::$variant;
                fn from_node<'a>(node: Node<'a>) -> Option<&'a Self> {
                    match node {
                        Node::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

node_type! {
    Model => Model,
    AttributeStatement => AttributeStatement,
    DeploymentStatement => DeploymentStatement,
    AttributeSection => AttributeSection,
    BooleanAttribute => BooleanAttribute,
    ValuedAttribute => ValuedAttribute,
    ContentBlock => ContentBlock,
    PathContent => Path,
}

/// Collects the diagnostics a check reports for one document.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    file: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(file: Option<String>) -> Self {
        Self { file, diagnostics: vec![] }
    }

    /// Records a diagnostic, attributing it to the sink's file when it names none.
    pub fn report(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.file.is_none() {
            diagnostic.file = self.file.clone();
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Gives diagnostics reported since `start` the node's position when they
    /// carry no line of their own.
    pub fn fill_missing_locations(&mut self, start: usize, location: Option<&SourceLocation>) {
        let Some(location) = location else {
            return;
        };
        for diagnostic in self.diagnostics.iter_mut().skip(start) {
            if diagnostic.line.is_none() {
                diagnostic.line = Some(location.line);
                diagnostic.column = Some(location.column);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("{0}")]
    Message(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("panicked: {0}")]
    Panicked(String),
}

impl CheckError {
    pub fn msg(message: impl fmt::Display) -> Self {
        CheckError::Message(message.to_string())
    }
}

pub type CheckRunner =
    Arc<dyn Fn(Node<'_>, &mut DiagnosticSink) -> Result<(), CheckError> + Send + Sync>;

/// A named check over exactly one node type.
#[derive(Clone)]
pub struct CheckSpecification {
    pub name: String,
    pub accepts: NodeKind,
    runner: CheckRunner,
}

impl CheckSpecification {
    pub fn new<F>(name: impl Into<String>, accepts: NodeKind, runner: F) -> Self
    where
        F: Fn(Node<'_>, &mut DiagnosticSink) -> Result<(), CheckError> + Send + Sync + 'static,
    {
        let guarded = move |node: Node<'_>, sink: &mut DiagnosticSink| {
            panic::catch_unwind(AssertUnwindSafe(|| runner(node, sink)))
                .unwrap_or_else(|payload| Err(CheckError::Panicked(panic_message(payload.as_ref()))))
        };
        Self { name: name.into(), accepts, runner: Arc::new(guarded) }
    }

    /// Declares a check over a concrete node type.
    ///
    /// ```
    /// use buildfile_kit::plugin::CheckSpecification;
    /// use buildfile_kit::types::{DeploymentStatement, Diagnostic};
    ///
    /// let check = CheckSpecification::typed("noTmp", |statement: &DeploymentStatement, sink| {
    ///     if statement.path.starts_with("/tmp") {
    ///         sink.report(Diagnostic::warning("deploying into /tmp").with_code("noTmp"));
    ///     }
    ///     Ok(())
    /// });
    /// assert_eq!(check.accepts.as_ref(), "DeploymentStatement");
    /// ```
    pub fn typed<T, F>(name: impl Into<String>, check: F) -> Self
    where
        T: NodeType + 'static,
        F: Fn(&T, &mut DiagnosticSink) -> Result<(), CheckError> + Send + Sync + 'static,
    {
        Self::new(name, T::KIND, move |node, sink| match T::from_node(node) {
            Some(inner) => check(inner, sink),
            None => Ok(()),
        })
    }

    pub fn applies_to(&self, node: &Node<'_>) -> bool {
        self.accepts == node.kind()
    }

    /// Runs the check. A panic inside the check comes back as [`CheckError::Panicked`].
    pub fn run(&self, node: Node<'_>, sink: &mut DiagnosticSink) -> Result<(), CheckError> {
        (self.runner)(node, sink)
    }
}

impl fmt::Debug for CheckSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckSpecification")
            .field("name", &self.name)
            .field("accepts", &self.accepts)
            .finish_non_exhaustive()
    }
}

/// Capability a plugin's entry-point type provides
pub trait CustomValidator: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn checks(&self) -> Vec<CheckSpecification>;
}

/// A validator built inside its artifact, with the names and checks the
/// engine needs already collected.
pub struct ConstructedValidator {
    pub name: String,
    pub checks: Vec<CheckSpecification>,
    pub validator: Box<dyn CustomValidator>,
}

/// Metadata exported by a plugin artifact under [`MANIFEST_SYMBOL`]
#[derive(Clone, Copy)]
pub struct PluginManifest {
    pub kit_version: &'static str,
    /// Fully qualified name of the entry-point type
    pub entry_point: &'static str,
    /// Builds the validator; a panic comes back as its message
    pub construct: fn() -> Result<ConstructedValidator, String>,
}

impl fmt::Debug for PluginManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginManifest")
            .field("kit_version", &self.kit_version)
            .field("entry_point", &self.entry_point)
            .finish_non_exhaustive()
    }
}

/// Builds `T` and collects its checks, catching panics from either step.
///
/// Monomorphized in the crate that calls `export_validator!`, so the panic
/// is caught by the artifact's own runtime.
pub fn construct<T: CustomValidator + Default + 'static>() -> Result<ConstructedValidator, String> {
    panic::catch_unwind(|| {
        let validator = T::default();
        ConstructedValidator {
            name: validator.name().to_string(),
            checks: validator.checks(),
            validator: Box::new(validator),
        }
    })
    .map_err(|payload| panic_message(payload.as_ref()))
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

/// Exports `$validator` as the entry point of a plugin artifact.
#[macro_export]
macro_rules! export_validator {
    ($validator:ty) => {
        #[no_mangle]
        pub static BUILDFILE_VALIDATOR_MANIFEST: $crate::plugin::PluginManifest =
            $crate::plugin::PluginManifest {
                kit_version: $crate::KIT_VERSION,
                entry_point: concat!(module_path!(), "::", stringify!($validator)),
                construct: $crate::plugin::construct::<$validator>,
            };
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attribute, Content};

    fn model() -> Model {
        let mut statement = DeploymentStatement::new("/opt/app");
        statement.attribute_section = Some(AttributeSection::new(vec![Attribute::Valued(
            ValuedAttribute::new("type", "dir"),
        )]));
        statement.content = Some(Content::Path(PathContent::new("/home/me/app")));
        statement.location = Some(SourceLocation::new(7, 1));
        Model::new(vec![statement.into()])
    }

    #[test]
    fn test_collect_nodes_in_walk_order() {
        let model = model();
        let kinds: Vec<NodeKind> = collect_nodes(&model).iter().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Model,
                NodeKind::DeploymentStatement,
                NodeKind::AttributeSection,
                NodeKind::ValuedAttribute,
                NodeKind::Path,
            ]
        );
    }

    #[test]
    fn test_typed_check_only_sees_its_node_type() {
        let check = CheckSpecification::typed("paths", |path: &PathContent, sink| {
            sink.report(Diagnostic::warning(format!("source {}", path.value)));
            Ok(())
        });
        assert_eq!(check.accepts, NodeKind::Path);

        let model = model();
        let nodes = collect_nodes(&model);
        assert_eq!(nodes.iter().filter(|node| check.applies_to(node)).count(), 1);

        // mismatched nodes are skipped by the typed wrapper
        let mut sink = DiagnosticSink::new(Some("ifs.build".into()));
        for node in nodes {
            check.run(node, &mut sink).unwrap();
        }

        let diagnostics = sink.into_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "source /home/me/app");
        assert_eq!(diagnostics[0].file.as_deref(), Some("ifs.build"));
    }

    #[test]
    fn test_node_location() {
        let model = model();
        let nodes = collect_nodes(&model);
        assert_eq!(nodes[0].location(), None);
        assert_eq!(nodes[1].location(), Some(&SourceLocation::new(7, 1)));
    }

    #[test]
    fn test_check_error_propagates() {
        let check = CheckSpecification::new("fails", NodeKind::Model, |_, _| {
            Err(CheckError::msg("boom"))
        });
        let model = Model::default();
        let mut sink = DiagnosticSink::default();
        let err = check.run(Node::Model(&model), &mut sink).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_fill_missing_locations_leaves_explicit_lines() {
        let mut sink = DiagnosticSink::default();
        sink.report(Diagnostic::warning("earlier"));
        sink.report(Diagnostic::warning("own line").with_line(3));
        sink.report(Diagnostic::warning("no line"));
        sink.fill_missing_locations(1, Some(&SourceLocation::new(9, 2)));

        let lines: Vec<_> = sink.diagnostics().iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![None, Some(3), Some(9)]);
        assert_eq!(sink.diagnostics()[2].column, Some(2));
    }

    #[derive(Default)]
    struct Probe;

    impl CustomValidator for Probe {
        fn checks(&self) -> Vec<CheckSpecification> {
            vec![CheckSpecification::new("probe", NodeKind::Model, |_, _| Ok(()))]
        }
    }

    #[test]
    fn test_construct_builds_default_instance() {
        let manifest = PluginManifest {
            kit_version: crate::KIT_VERSION,
            entry_point: "tests::Probe",
            construct: construct::<Probe>,
        };
        let constructed = (manifest.construct)().unwrap();
        assert_eq!(constructed.checks.len(), 1);
        assert!(constructed.name.ends_with("Probe"));
        assert_eq!(constructed.validator.checks().len(), 1);
    }

    struct Unbuildable;

    impl Default for Unbuildable {
        fn default() -> Self {
            panic!("missing configuration")
        }
    }

    impl CustomValidator for Unbuildable {
        fn checks(&self) -> Vec<CheckSpecification> {
            vec![]
        }
    }

    #[derive(Default)]
    struct BrokenChecks;

    impl CustomValidator for BrokenChecks {
        fn checks(&self) -> Vec<CheckSpecification> {
            panic!("checks unavailable: {}", 42)
        }
    }

    #[test]
    fn test_construct_reports_panics_as_errors() {
        assert_eq!(construct::<Unbuildable>().err().as_deref(), Some("missing configuration"));
        assert_eq!(construct::<BrokenChecks>().err().as_deref(), Some("checks unavailable: 42"));
    }

    #[test]
    fn test_panicking_check_returns_error_and_keeps_findings() {
        let check = CheckSpecification::typed("explodes", |statement: &DeploymentStatement, sink| {
            sink.report(Diagnostic::warning(format!("seen {}", statement.path)));
            if statement.path == "/opt/app" {
                panic!("cannot inspect {}", statement.path);
            }
            Ok(())
        });
        let model = model();
        let mut sink = DiagnosticSink::default();
        let errors: Vec<String> = collect_nodes(&model)
            .into_iter()
            .filter(|node| check.applies_to(node))
            .filter_map(|node| check.run(node, &mut sink).err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(errors, vec!["panicked: cannot inspect /opt/app"]);
        assert_eq!(sink.diagnostics()[0].message, "seen /opt/app");

        // the check stays usable after a panic
        let healthy = Model::new(vec![DeploymentStatement::new("/bin/sh").into()]);
        let nodes = collect_nodes(&healthy);
        assert!(check.run(nodes[1], &mut sink).is_ok());
        assert_eq!(sink.len(), 2);
    }
}
