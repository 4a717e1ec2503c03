#[macro_use]
extern crate hiro_system_kit;

#[macro_use]
extern crate lazy_static;

pub extern crate buildfile_kit as kit;

pub mod context;
pub mod pipeline;
pub mod plugin;
pub mod validation;
pub mod variables;

pub use context::Context;
pub use pipeline::{analyze_document, AnalysisOptions, DocumentReport};
pub use plugin::{PluginError, PluginLoader};
pub use validation::{ValidationOrchestrator, ValidationResult};
pub use variables::VariableMap;
