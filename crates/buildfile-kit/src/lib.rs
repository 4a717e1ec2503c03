//! Primitives shared by the buildfile validation engine and its plugins:
//! the document model, diagnostics, the tree walker and the custom validator
//! interface.

pub mod plugin;
pub mod types;
pub mod visit;

pub use plugin::{CheckSpecification, CustomValidator, DiagnosticSink, Node, NodeKind};
pub use visit::{walk, walk_mut, Visit, VisitMut};

/// Version plugins and the engine must agree on.
pub const KIT_VERSION: &str = env!("CARGO_PKG_VERSION");
