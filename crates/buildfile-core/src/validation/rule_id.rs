//! Stable identifiers carried in the `code` field of every diagnostic.
//!
//! Downstream tooling (quickfixes, suppressions, CI filters) matches on these
//! strings, so a variant's serialized form must never change.

use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use buildfile_kit::types::{Diagnostic, DiagnosticLevel};

/// Built-in validation rules
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,      // Provides as_ref() -> &str
    Display,       // Provides to_string()
    EnumString,    // Provides from_str()
    IntoStaticStr, // Provides into() -> &'static str
    EnumIter,      // Provides iter() over all variants
)]
#[strum(serialize_all = "camelCase")]
pub enum CoreRuleId {
    // Attribute rules
    InvalidName,
    InvalidUid,
    InvalidGid,
    InvalidAutoso,
    InvalidCompress,
    InvalidType,
    InvalidPerms,
    InvalidDperms,

    // Model-wide rules
    DuplicatePath,
    UnresolvedVariable,
    DirectoryDeployment,

    // Plugin infrastructure
    CustomValidatorLoad,
}

impl CoreRuleId {
    /// Severity a finding of this rule is reported with.
    ///
    /// Unresolved variables are the exception: their severity is chosen by the
    /// caller, this is only the lenient default.
    pub const fn default_level(&self) -> DiagnosticLevel {
        use CoreRuleId::*;
        match self {
            InvalidName | InvalidUid | InvalidGid | InvalidAutoso | InvalidCompress
            | InvalidType | InvalidPerms | InvalidDperms => DiagnosticLevel::Error,
            DuplicatePath | UnresolvedVariable | DirectoryDeployment | CustomValidatorLoad => {
                DiagnosticLevel::Warning
            }
        }
    }

    /// A diagnostic for this rule at its default severity
    pub fn diagnostic(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(self.default_level(), message).with_code(self)
    }

    /// Get a human-readable description of what the rule validates
    pub const fn description(&self) -> &'static str {
        use CoreRuleId::*;
        match self {
            InvalidName => "Attribute names must be known mkifs or mkqnx6fs keywords",
            InvalidUid => "uid must be '*' or a number between 0 and 2147483647",
            InvalidGid => "gid must be '*' or a number between 0 and 2147483647",
            InvalidAutoso => "autoso must be one of n, none, l, list, a, add",
            InvalidCompress => "compress must be 1, 2 or 3",
            InvalidType => "type must be one of link, fifo, file, dir",
            InvalidPerms => "perms must be '*', an octal mode or symbolic clauses",
            InvalidDperms => "dperms must be '*', an octal mode or symbolic clauses",
            DuplicatePath => "Flags deployments sharing the same target path",
            UnresolvedVariable => "Flags ${...} references with no value",
            DirectoryDeployment => "Flags deployments copying a whole host directory",
            CustomValidatorLoad => "Reports a custom validator that could not be loaded",
        }
    }
}

/// Identifier for validation rules, supporting both built-in and plugin rules
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleIdentifier {
    /// Rule built into the engine
    Core(CoreRuleId),
    /// Rule reported by a custom validator plugin
    External(String),
}

impl RuleIdentifier {
    /// Resolves a diagnostic code, falling back to an external rule
    pub fn from_code(code: &str) -> Self {
        match code.parse::<CoreRuleId>() {
            Ok(id) => RuleIdentifier::Core(id),
            Err(_) => RuleIdentifier::External(code.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RuleIdentifier::Core(id) => id.as_ref(),
            RuleIdentifier::External(name) => name.as_str(),
        }
    }

    pub fn is_core(&self) -> bool {
        matches!(self, RuleIdentifier::Core(_))
    }

    pub fn is_external(&self) -> bool {
        matches!(self, RuleIdentifier::External(_))
    }
}

impl fmt::Display for RuleIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CoreRuleId> for RuleIdentifier {
    fn from(id: CoreRuleId) -> Self {
        RuleIdentifier::Core(id)
    }
}

impl AsRef<str> for RuleIdentifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
