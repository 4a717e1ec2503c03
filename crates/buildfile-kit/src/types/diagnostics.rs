use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::model::SourceLocation;

/// Severity level for diagnostics
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

impl Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    /// Stable machine-readable identifier, e.g. `invalidUid`
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<usize>,
    #[serde(default)]
    pub column: Option<usize>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    fn with_level(level: DiagnosticLevel, message: String) -> Diagnostic {
        Diagnostic {
            level,
            message,
            code: None,
            file: None,
            line: None,
            column: None,
            context: None,
            suggestion: None,
        }
    }

    // Builder methods
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(DiagnosticLevel::Error, message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(DiagnosticLevel::Warning, message.into())
    }

    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self::with_level(level, message.into())
    }

    pub fn with_code(mut self, code: impl AsRef<str>) -> Self {
        self.code = Some(code.as_ref().to_string());
        self
    }

    pub fn with_file(mut self, file: impl AsRef<str>) -> Self {
        self.file = Some(file.as_ref().to_string());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Copies line and column from a model node, if it has a location
    pub fn with_location(mut self, location: Option<&SourceLocation>) -> Self {
        if let Some(location) = location {
            self.line = Some(location.line);
            self.column = Some(location.column);
        }
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.level, DiagnosticLevel::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.level, DiagnosticLevel::Warning)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level_with_code = match &self.code {
            Some(code) => format!("{}[{}]", self.level, code),
            None => format!("{}", self.level),
        };

        let location = match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(column)) => format!(" at {}:{}:{}", file, line, column),
            (Some(file), Some(line), None) => format!(" at {}:{}", file, line),
            (Some(file), None, _) => format!(" at {}", file),
            (None, Some(line), Some(column)) => format!(" at {}:{}", line, column),
            (None, Some(line), None) => format!(" at line {}", line),
            (None, None, _) => String::new(),
        };

        write!(f, "{}{}: {}", level_with_code, location, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_full_location() {
        let diag = Diagnostic::error("Wrong format \"abc\" for uid")
            .with_code("invalidUid")
            .with_file("ifs.build")
            .with_location(Some(&SourceLocation::new(12, 8)));

        assert_eq!(diag.to_string(), "error[invalidUid] at ifs.build:12:8: Wrong format \"abc\" for uid");
    }

    #[test]
    fn test_display_without_location() {
        let diag = Diagnostic::warning("Duplicate path /bin/sh");
        assert_eq!(diag.to_string(), "warning: Duplicate path /bin/sh");
    }

    #[test]
    fn test_missing_location_keeps_previous_position() {
        let diag = Diagnostic::warning("x").with_line(4).with_location(None);
        assert_eq!(diag.line, Some(4));
        assert!(diag.is_warning());
        assert!(!diag.is_error());
    }
}
