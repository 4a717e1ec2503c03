//! Common assertion macros for buildfile validation tests

/// Assert that a list of diagnostics contains one with the given code
#[macro_export]
macro_rules! assert_diagnostic_code {
    ($diagnostics:expr, $code:expr) => {
        let code: &str = $code;
        let found = $diagnostics.iter().any(|d| d.code.as_deref() == Some(code));
        if !found {
            let listed = $diagnostics
                .iter()
                .map(|d| format!("  - {}", d))
                .collect::<Vec<_>>()
                .join("\n");
            panic!(
                "Expected diagnostic with code '{}', but got:\n{}",
                code,
                if listed.is_empty() { "  (no diagnostics)".to_string() } else { listed }
            );
        }
    };
}

/// Assert that no diagnostic in the list carries the given code
#[macro_export]
macro_rules! assert_no_diagnostic_code {
    ($diagnostics:expr, $code:expr) => {
        let code: &str = $code;
        if let Some(d) = $diagnostics.iter().find(|d| d.code.as_deref() == Some(code)) {
            panic!("Expected no diagnostic with code '{}', but got: {}", code, d);
        }
    };
}

/// Assert that a list of diagnostics is empty
#[macro_export]
macro_rules! assert_no_diagnostics {
    ($diagnostics:expr) => {
        let listed =
            $diagnostics.iter().map(|d| format!("  - {}", d)).collect::<Vec<_>>().join("\n");
        assert!(listed.is_empty(), "Expected no diagnostics, but got:\n{}", listed);
    };
}
