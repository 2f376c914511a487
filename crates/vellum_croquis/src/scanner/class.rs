//! Class and annotated declaration finder.
//!
//! Recognizes class declarations and expressions, `const X = class {}` and
//! `NS.X = class {}`, and plain functions or variables tagged
//! `@customElement` / `@polymerElement` with no class syntax at all.

use oxc_ast::ast::{ArrayExpressionElement, Class, Expression, FunctionType};
use oxc_span::{GetSpan, Span};
use vellum_carton::{CompactString, FxHashSet};
use vellum_relief::{
    Annotation, EntityKind, ReferenceKind, ScannedEntity, ScannedReference, SyntaxNodeId, Warning,
    WarningCode,
};

use super::{node_id, ScanContext, Scanner, ScannerOutput};
use crate::error::{ScanError, ScanResult};
use crate::helpers::{assignment_target_name, binding_name, dotted_name, is_function, last_segment};
use crate::members::{apply_entity_tags, extract_class_members};
use crate::walker::{Node, Visitor, WalkAction, WalkPath};

/// Tags that make a declaration an element without any class syntax.
const ELEMENT_TAGS: [&str; 2] = ["customElement", "polymerElement"];

/// Tags that hand a declaration to another scanner.
const FOREIGN_TAGS: [&str; 2] = ["mixinFunction", "polymerBehavior"];

fn is_tagged_element(annotation: &Annotation) -> bool {
    ELEMENT_TAGS.iter().any(|tag| annotation.has_tag(tag))
        && !FOREIGN_TAGS.iter().any(|tag| annotation.has_tag(tag))
}

pub struct ClassFinder<'c, 's> {
    ctx: &'c ScanContext<'s>,
    /// Class nodes already recorded through their declarator or assignment.
    matched: FxHashSet<SyntaxNodeId>,
    out: ScannerOutput,
}

impl<'c, 's> ClassFinder<'c, 's> {
    pub fn new(ctx: &'c ScanContext<'s>) -> Self {
        Self {
            ctx,
            matched: FxHashSet::default(),
            out: ScannerOutput::default(),
        }
    }

    fn push_class(
        &mut self,
        class: &Class<'_>,
        name: Option<&str>,
        annotation: Option<Annotation>,
        span: Span,
    ) -> ScanResult<()> {
        let ctx = self.ctx;
        let class_id = node_id(class.span);
        self.matched.insert(class_id);

        let mut entity = ctx.entity(EntityKind::Class, name, annotation, span);
        entity.class_node = Some(class_id);
        if let Some(superclass) = &class.super_class {
            read_heritage(ctx, superclass, &mut entity);
        }
        extract_class_members(ctx, class, &mut entity)?;
        apply_declaration_tags(ctx, span, &mut entity)?;
        self.out.entities.push(entity);
        Ok(())
    }

    /// A declaration whose only claim to being an element is its doc tag.
    fn push_tagged(&mut self, name: Option<&str>, annotation: Annotation, span: Span) -> ScanResult<()> {
        let mut entity = self.ctx.entity(EntityKind::Class, name, Some(annotation), span);
        apply_declaration_tags(self.ctx, span, &mut entity)?;
        self.out.entities.push(entity);
        Ok(())
    }
}

impl<'n, 'a, 'c, 's> Visitor<'n, 'a> for ClassFinder<'c, 's> {
    type Error = ScanError;

    fn enter(&mut self, node: Node<'n, 'a>, path: &WalkPath<'n, 'a>) -> ScanResult<WalkAction> {
        match node {
            Node::VariableDeclarator(decl) => {
                let name = binding_name(&decl.id);
                match &decl.init {
                    Some(Expression::ClassExpression(class)) => {
                        let annotation = self.ctx.node_annotation(node, path);
                        self.push_class(class, name.as_deref(), annotation, decl.span)?;
                    }
                    init if init.as_ref().map_or(true, is_function) => {
                        if let Some(annotation) = self.ctx.node_annotation(node, path) {
                            if is_tagged_element(&annotation) {
                                self.push_tagged(name.as_deref(), annotation, decl.span)?;
                            }
                        }
                    }
                    _ => {}
                }
            }
            Node::Expression(Expression::AssignmentExpression(assign)) => {
                if let Expression::ClassExpression(class) = &assign.right {
                    let name = assignment_target_name(&assign.left);
                    let annotation = self.ctx.node_annotation(node, path);
                    self.push_class(class, name.as_deref(), annotation, assign.span)?;
                }
            }
            Node::Class(class) => {
                if !self.matched.contains(&node_id(class.span)) {
                    let name = class.id.as_ref().map(|id| id.name.as_str());
                    let annotation = self.ctx.node_annotation(node, path);
                    self.push_class(class, name, annotation, class.span)?;
                }
            }
            Node::Function(func) if func.r#type == FunctionType::FunctionDeclaration => {
                if let Some(annotation) = self.ctx.node_annotation(node, path) {
                    if is_tagged_element(&annotation) {
                        let name = func.id.as_ref().map(|id| id.name.as_str());
                        self.push_tagged(name, annotation, func.span)?;
                    }
                }
            }
            _ => {}
        }
        Ok(WalkAction::Continue)
    }
}

impl<'n, 'a, 'c, 's> Scanner<'n, 'a> for ClassFinder<'c, 's> {
    const NAME: &'static str = "class";

    fn finish(self) -> ScannerOutput {
        self.out
    }
}

/// Read an `extends` clause into superclass, mixin and behavior references.
///
/// `M1(M2(Base))` gives mixins `[M1, M2]` and superclass `Base`;
/// `mixinBehaviors([B1, B2], Base)` gives behaviors `[B1, B2]`.
pub(crate) fn read_heritage(ctx: &ScanContext<'_>, expr: &Expression<'_>, entity: &mut ScannedEntity) {
    match expr {
        Expression::CallExpression(call) => {
            let Some(callee) = dotted_name(&call.callee) else {
                return;
            };
            let mut args = call.arguments.iter().filter_map(|arg| arg.as_expression());
            if last_segment(&callee) == "mixinBehaviors" {
                if let Some(Expression::ArrayExpression(list)) = args.next() {
                    for elem in list.elements.iter() {
                        let Some(behavior) = array_name(elem) else { continue };
                        entity
                            .behaviors
                            .push(ctx.reference(ReferenceKind::Behavior, &behavior, elem.span()));
                    }
                }
            } else {
                entity
                    .mixins
                    .push(ctx.reference(ReferenceKind::Mixin, &callee, call.callee.span()));
            }
            if let Some(inner) = args.next() {
                read_heritage(ctx, inner, entity);
            }
        }
        Expression::ParenthesizedExpression(paren) => read_heritage(ctx, &paren.expression, entity),
        _ => {
            if let Some(name) = dotted_name(expr) {
                entity.superclass = Some(ctx.reference(ReferenceKind::Superclass, &name, expr.span()));
            }
        }
    }
}

fn array_name(elem: &ArrayExpressionElement<'_>) -> Option<CompactString> {
    elem.as_expression().and_then(dotted_name)
}

/// Apply every member- and heritage-declaring tag of the entity's comment.
pub(crate) fn apply_declaration_tags(
    ctx: &ScanContext<'_>,
    span: Span,
    entity: &mut ScannedEntity,
) -> ScanResult<()> {
    if let Some(annotation) = entity.annotation.take() {
        apply_heritage_tags(ctx, &annotation, span, entity);
        let applied = apply_entity_tags(ctx, &annotation, span, entity);
        entity.annotation = Some(annotation);
        applied?;
    }
    Ok(())
}

/// Apply `@extends`, `@mixes` and `@appliesMixin` from the entity's comment.
///
/// An `@extends` tag replaces whatever the `extends` clause said.
pub(crate) fn apply_heritage_tags(
    ctx: &ScanContext<'_>,
    annotation: &Annotation,
    span: Span,
    entity: &mut ScannedEntity,
) {
    for tag in annotation.tags.iter() {
        match tag.title.as_str() {
            "extends" | "augments" => match &tag.name {
                Some(name) => {
                    entity.superclass = Some(ScannedReference::new(
                        ReferenceKind::Superclass,
                        ctx.options.strip_global_prefix(name),
                        ctx.range(span),
                    ));
                }
                None => entity.warnings.push(Warning::new(
                    WarningCode::ClassExtendsAnnotationNoId,
                    format!("`@{}` names no superclass", tag.title),
                    ctx.range(span),
                )),
            },
            "mixes" | "appliesMixin" => {
                let Some(name) = &tag.name else { continue };
                let name = ctx.options.strip_global_prefix(name);
                if !entity.mixins.iter().any(|m| m.identifier == name) {
                    entity.mixins.push(ScannedReference::new(
                        ReferenceKind::Mixin,
                        name,
                        ctx.range(span),
                    ));
                }
            }
            _ => {}
        }
    }
}
