//! Attribute name and value checks.
//!
//! Value validation is table driven: each valued keyword with a constrained
//! format maps to an [`AttributeValueRule`]. Supporting a new attribute means
//! adding an entry, the dispatch in [`AttributeRules::check_valued`] never
//! looks at names.

use std::collections::HashMap;

use buildfile_kit::types::{BooleanAttribute, Diagnostic, Model, ValuedAttribute};
use buildfile_kit::visit::{walk, Visit};
use regex::Regex;

use super::keywords::{is_boolean_keyword, is_valued_keyword, BOOLEAN_KEYWORDS, VALUED_KEYWORDS};
use super::rule_id::CoreRuleId;
use super::suggestions::did_you_mean;

/// Validates the value of one attribute keyword
#[derive(Clone, Copy, Debug)]
pub struct AttributeValueRule {
    pub rule: CoreRuleId,
    /// Human readable format, quoted in the diagnostic
    pub expected: &'static str,
    pub is_valid: fn(&str) -> bool,
}

impl AttributeValueRule {
    pub const fn new(rule: CoreRuleId, expected: &'static str, is_valid: fn(&str) -> bool) -> Self {
        Self { rule, expected, is_valid }
    }
}

lazy_static! {
    static ref PERMS_FORMAT: Regex =
        Regex::new(r"^(\*|0?[0-7]{3}|[ugoa]*[-+=][rwxst]+(,[ugoa]*[-+=][rwxst]+)*)$").unwrap();

    static ref BUILTIN_VALUE_RULES: HashMap<&'static str, AttributeValueRule> = HashMap::from([
        ("uid", AttributeValueRule::new(CoreRuleId::InvalidUid, "*|0..2147483647", is_valid_id)),
        ("gid", AttributeValueRule::new(CoreRuleId::InvalidGid, "*|0..2147483647", is_valid_id)),
        ("autoso", AttributeValueRule::new(CoreRuleId::InvalidAutoso, "n[one]|l[ist]|a[dd]", is_valid_autoso)),
        ("compress", AttributeValueRule::new(CoreRuleId::InvalidCompress, "1|2|3", is_valid_compress)),
        ("type", AttributeValueRule::new(CoreRuleId::InvalidType, "link|fifo|file|dir", is_valid_type)),
        ("perms", AttributeValueRule::new(CoreRuleId::InvalidPerms, "*|[0]NNN|[ugoa]*[+-=][rwxst]+,...", is_valid_perms)),
        ("dperms", AttributeValueRule::new(CoreRuleId::InvalidDperms, "*|[0]NNN|[ugoa]*[+-=][rwxst]+,...", is_valid_perms)),
    ]);
}

/// `*` or a decimal id no larger than `i32::MAX`
pub fn is_valid_id(value: &str) -> bool {
    if value == "*" {
        return true;
    }
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    value.parse::<u64>().map(|id| id <= i32::MAX as u64).unwrap_or(false)
}

pub fn is_valid_autoso(value: &str) -> bool {
    matches!(value, "n" | "none" | "l" | "list" | "a" | "add")
}

pub fn is_valid_compress(value: &str) -> bool {
    matches!(value, "1" | "2" | "3")
}

pub fn is_valid_type(value: &str) -> bool {
    matches!(value, "link" | "fifo" | "file" | "dir")
}

/// `*`, an optional leading `0` plus three octal digits, or symbolic clauses
pub fn is_valid_perms(value: &str) -> bool {
    PERMS_FORMAT.is_match(value)
}

/// Registry of value rules, keyed by attribute name.
#[derive(Clone, Debug)]
pub struct AttributeRules {
    rules: HashMap<&'static str, AttributeValueRule>,
}

impl Default for AttributeRules {
    fn default() -> Self {
        Self { rules: BUILTIN_VALUE_RULES.clone() }
    }
}

impl AttributeRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rule for `name`
    pub fn insert(&mut self, name: &'static str, rule: AttributeValueRule) {
        self.rules.insert(name, rule);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValueRule> {
        self.rules.get(name)
    }

    pub fn check_boolean(&self, attribute: &BooleanAttribute) -> Option<Diagnostic> {
        if is_boolean_keyword(&attribute.name) {
            return None;
        }
        let diagnostic = CoreRuleId::InvalidName
            .diagnostic(format!("Unknown BooleanAttribute \"{}\"", attribute.name))
            .with_location(attribute.location.as_ref());
        Some(with_name_suggestion(diagnostic, &attribute.name, BOOLEAN_KEYWORDS.iter().copied()))
    }

    pub fn check_valued(&self, attribute: &ValuedAttribute) -> Option<Diagnostic> {
        if !is_valued_keyword(&attribute.name) {
            let diagnostic = CoreRuleId::InvalidName
                .diagnostic(format!("Unknown ValuedAttribute \"{}\"", attribute.name))
                .with_location(attribute.location.as_ref());
            return Some(with_name_suggestion(
                diagnostic,
                &attribute.name,
                VALUED_KEYWORDS.iter().copied(),
            ));
        }

        let rule = self.rules.get(attribute.name.as_str())?;
        if (rule.is_valid)(&attribute.value) {
            return None;
        }
        Some(
            rule.rule
                .diagnostic(format!(
                    "Wrong format \"{}\" for {} ({})",
                    attribute.value, attribute.name, rule.expected
                ))
                .with_location(attribute.location.as_ref())
                .with_context(format!("{}={}", attribute.name, attribute.value)),
        )
    }

    /// Checks every attribute of the model, in walk order.
    pub fn check_model(&self, model: &Model) -> Vec<Diagnostic> {
        let mut visitor = AttributeRuleVisitor { rules: self, diagnostics: vec![] };
        walk(model, &mut visitor);
        visitor.diagnostics
    }
}

fn with_name_suggestion<'a>(
    diagnostic: Diagnostic,
    name: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Diagnostic {
    let suggestions = did_you_mean(name, candidates);
    if suggestions.is_empty() {
        return diagnostic;
    }
    diagnostic.with_suggestion(format!("did you mean {}?", suggestions.join(", ")))
}

struct AttributeRuleVisitor<'r> {
    rules: &'r AttributeRules,
    diagnostics: Vec<Diagnostic>,
}

impl<'ast> Visit<'ast> for AttributeRuleVisitor<'_> {
    fn visit_boolean_attribute(&mut self, attribute: &'ast BooleanAttribute) {
        self.diagnostics.extend(self.rules.check_boolean(attribute));
    }

    fn visit_valued_attribute(&mut self, attribute: &'ast ValuedAttribute) {
        self.diagnostics.extend(self.rules.check_valued(attribute));
    }
}
