//! Depth-first traversal over a [`Model`].
//!
//! Order is fixed and follows the document: the model, then each statement in
//! sequence, then the statement's attribute section and each of its attributes,
//! then (for deployments) the content node. Absent sections and content are
//! skipped.

use crate::types::{
    Attribute, AttributeSection, AttributeStatement, BooleanAttribute, Content, ContentBlock,
    DeploymentStatement, Model, PathContent, Statement, ValuedAttribute,
};

/// Read-only visitor. Every callback defaults to a no-op.
pub trait Visit<'ast> {
    fn visit_model(&mut self, _model: &'ast Model) {}
    fn visit_attribute_statement(&mut self, _statement: &'ast AttributeStatement) {}
    fn visit_deployment_statement(&mut self, _statement: &'ast DeploymentStatement) {}
    fn visit_attribute_section(&mut self, _section: &'ast AttributeSection) {}
    fn visit_boolean_attribute(&mut self, _attribute: &'ast BooleanAttribute) {}
    fn visit_valued_attribute(&mut self, _attribute: &'ast ValuedAttribute) {}
    fn visit_content_block(&mut self, _block: &'ast ContentBlock) {}
    fn visit_path(&mut self, _path: &'ast PathContent) {}
}

pub fn walk<'ast, V: Visit<'ast> + ?Sized>(model: &'ast Model, visitor: &mut V) {
    visitor.visit_model(model);
    for statement in &model.statements {
        match statement {
            Statement::Attribute(attribute_statement) => {
                visitor.visit_attribute_statement(attribute_statement);
                if let Some(section) = &attribute_statement.attribute_section {
                    walk_attribute_section(section, visitor);
                }
            }
            Statement::Deployment(deployment) => {
                visitor.visit_deployment_statement(deployment);
                if let Some(section) = &deployment.attribute_section {
                    walk_attribute_section(section, visitor);
                }
                match &deployment.content {
                    Some(Content::Path(path)) => visitor.visit_path(path),
                    Some(Content::Block(block)) => visitor.visit_content_block(block),
                    None => {}
                }
            }
        }
    }
}

fn walk_attribute_section<'ast, V: Visit<'ast> + ?Sized>(
    section: &'ast AttributeSection,
    visitor: &mut V,
) {
    visitor.visit_attribute_section(section);
    for attribute in &section.attributes {
        match attribute {
            Attribute::Boolean(boolean) => visitor.visit_boolean_attribute(boolean),
            Attribute::Valued(valued) => visitor.visit_valued_attribute(valued),
        }
    }
}

/// Mutable counterpart of [`Visit`], used to rewrite strings in place.
///
/// Only the nodes carrying rewritable strings get a callback.
pub trait VisitMut {
    fn visit_deployment_statement_mut(&mut self, _statement: &mut DeploymentStatement) {}
    fn visit_valued_attribute_mut(&mut self, _attribute: &mut ValuedAttribute) {}
    fn visit_path_mut(&mut self, _path: &mut PathContent) {}
}

pub fn walk_mut<V: VisitMut + ?Sized>(model: &mut Model, visitor: &mut V) {
    for statement in model.statements.iter_mut() {
        match statement {
            Statement::Attribute(attribute_statement) => {
                if let Some(section) = attribute_statement.attribute_section.as_mut() {
                    walk_attribute_section_mut(section, visitor);
                }
            }
            Statement::Deployment(deployment) => {
                visitor.visit_deployment_statement_mut(deployment);
                if let Some(section) = deployment.attribute_section.as_mut() {
                    walk_attribute_section_mut(section, visitor);
                }
                if let Some(Content::Path(path)) = deployment.content.as_mut() {
                    visitor.visit_path_mut(path);
                }
            }
        }
    }
}

fn walk_attribute_section_mut<V: VisitMut + ?Sized>(section: &mut AttributeSection, visitor: &mut V) {
    for attribute in section.attributes.iter_mut() {
        if let Attribute::Valued(valued) = attribute {
            visitor.visit_valued_attribute_mut(valued);
        }
    }
}
