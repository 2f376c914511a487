//! `@polymerBehavior` finder.

use oxc_ast::ast::{ArrayExpressionElement, Expression};
use oxc_span::{GetSpan, Span};
use vellum_carton::CompactString;
use vellum_relief::{Annotation, EntityKind, ReferenceKind, WarningCode};

use super::{apply_declaration_tags, ScanContext, Scanner, ScannerOutput};
use crate::error::{ScanError, ScanResult};
use crate::helpers::{assignment_target_name, binding_name, dotted_name};
use crate::members::extract_object_members;
use crate::walker::{Node, Visitor, WalkAction, WalkPath};

const BEHAVIOR_TAG: &str = "polymerBehavior";

pub struct BehaviorFinder<'c, 's> {
    ctx: &'c ScanContext<'s>,
    out: ScannerOutput,
}

impl<'c, 's> BehaviorFinder<'c, 's> {
    pub fn new(ctx: &'c ScanContext<'s>) -> Self {
        Self {
            ctx,
            out: ScannerOutput::default(),
        }
    }

    fn behavior(
        &mut self,
        binding: Option<CompactString>,
        annotation: Annotation,
        value: Option<&Expression<'_>>,
        span: Span,
    ) -> ScanResult<()> {
        let ctx = self.ctx;
        // `@polymerBehavior Polymer.IronFoo` overrides the binding's name.
        let name = annotation
            .tag(BEHAVIOR_TAG)
            .and_then(|tag| tag.description.as_deref())
            .and_then(|text| text.split_whitespace().next())
            .map(CompactString::new)
            .or(binding);

        match value {
            Some(Expression::ObjectExpression(obj)) => {
                let mut entity = ctx.entity(EntityKind::Behavior, name.as_deref(), Some(annotation), span);
                extract_object_members(ctx, obj, &mut entity)?;
                apply_declaration_tags(ctx, span, &mut entity)?;
                self.out.entities.push(entity);
            }
            Some(Expression::ArrayExpression(list)) => {
                let mut entity = ctx.entity(EntityKind::Behavior, name.as_deref(), Some(annotation), span);
                for elem in list.elements.iter() {
                    match elem.as_expression() {
                        Some(Expression::ObjectExpression(obj)) => {
                            extract_object_members(ctx, obj, &mut entity)?;
                        }
                        Some(expr) => {
                            if let Some(behavior) = dotted_name(expr) {
                                entity.behaviors.push(ctx.reference(
                                    ReferenceKind::Behavior,
                                    &behavior,
                                    expr.span(),
                                ));
                            }
                        }
                        None => {
                            if let ArrayExpressionElement::SpreadElement(spread) = elem {
                                tracing::debug!(
                                    "ignoring spread in behavior list at offset {}",
                                    spread.span.start
                                );
                            }
                        }
                    }
                }
                apply_declaration_tags(ctx, span, &mut entity)?;
                self.out.entities.push(entity);
            }
            _ => self.out.warnings.push(ctx.warning(
                WarningCode::InvalidBehaviorDeclaration,
                format!(
                    "`@{BEHAVIOR_TAG}` on `{}`, which is not an object or array literal",
                    name.as_deref().unwrap_or("<anonymous>")
                ),
                span,
            )),
        }
        Ok(())
    }
}

impl<'n, 'a, 'c, 's> Visitor<'n, 'a> for BehaviorFinder<'c, 's> {
    type Error = ScanError;

    fn enter(&mut self, node: Node<'n, 'a>, path: &WalkPath<'n, 'a>) -> ScanResult<WalkAction> {
        let (binding, value, span) = match node {
            Node::VariableDeclarator(decl) => (binding_name(&decl.id), decl.init.as_ref(), decl.span),
            Node::Expression(Expression::AssignmentExpression(assign)) => (
                assignment_target_name(&assign.left),
                Some(&assign.right),
                assign.span,
            ),
            _ => return Ok(WalkAction::Continue),
        };
        let Some(annotation) = self.ctx.node_annotation(node, path) else {
            return Ok(WalkAction::Continue);
        };
        if annotation.has_tag(BEHAVIOR_TAG) {
            self.behavior(binding, annotation, value, span)?;
        }
        Ok(WalkAction::Continue)
    }
}

impl<'n, 'a, 'c, 's> Scanner<'n, 'a> for BehaviorFinder<'c, 's> {
    const NAME: &'static str = "behavior";

    fn finish(self) -> ScannerOutput {
        self.out
    }
}
