//! `Polymer({...})` element finder.

use oxc_ast::ast::{Expression, ObjectExpression, ObjectPropertyKind};
use oxc_span::GetSpan;
use vellum_carton::CompactString;
use vellum_relief::{EntityKind, ReferenceKind, ScannedEntity, WarningCode};

use super::{apply_declaration_tags, ScanContext, Scanner, ScannerOutput};
use crate::error::{ScanError, ScanResult};
use crate::helpers::{assignment_target_name, binding_name, dotted_name, property_key_name, string_value};
use crate::members::extract_object_members;
use crate::walker::{Node, Visitor, WalkAction, WalkPath};

pub struct LegacyElementFinder<'c, 's> {
    ctx: &'c ScanContext<'s>,
    out: ScannerOutput,
}

impl<'c, 's> LegacyElementFinder<'c, 's> {
    pub fn new(ctx: &'c ScanContext<'s>) -> Self {
        Self {
            ctx,
            out: ScannerOutput::default(),
        }
    }

    /// Read `is` and `behaviors` off the configuration object. Returns
    /// whether an `is` key was present at all.
    fn read_identity(&self, obj: &ObjectExpression<'_>, entity: &mut ScannedEntity) -> bool {
        let ctx = self.ctx;
        let mut has_is = false;
        for kind in obj.properties.iter() {
            let ObjectPropertyKind::ObjectProperty(p) = kind else {
                continue;
            };
            match property_key_name(&p.key).as_deref() {
                Some("is") => {
                    has_is = true;
                    match string_value(&p.value) {
                        Some(tag) => entity.tag_name = Some(CompactString::new(tag)),
                        None => entity.warnings.push(ctx.warning(
                            WarningCode::CouldNotDetermineTagName,
                            "`is` must be a string literal",
                            p.value.span(),
                        )),
                    }
                }
                Some("behaviors") => {
                    let Expression::ArrayExpression(list) = &p.value else {
                        continue;
                    };
                    for expr in list.elements.iter().filter_map(|elem| elem.as_expression()) {
                        if let Some(name) = dotted_name(expr) {
                            entity
                                .behaviors
                                .push(ctx.reference(ReferenceKind::Behavior, &name, expr.span()));
                        }
                    }
                }
                _ => {}
            }
        }
        has_is
    }
}

impl<'n, 'a, 'c, 's> Visitor<'n, 'a> for LegacyElementFinder<'c, 's> {
    type Error = ScanError;

    fn enter(&mut self, node: Node<'n, 'a>, path: &WalkPath<'n, 'a>) -> ScanResult<WalkAction> {
        let Node::Expression(Expression::CallExpression(call)) = node else {
            return Ok(WalkAction::Continue);
        };
        let ctx = self.ctx;
        let is_legacy_call = dotted_name(&call.callee)
            .is_some_and(|callee| ctx.options.strip_global_prefix(&callee) == "Polymer");
        if !is_legacy_call {
            return Ok(WalkAction::Continue);
        }

        let Some(Expression::ObjectExpression(obj)) =
            call.arguments.first().and_then(|arg| arg.as_expression())
        else {
            self.out.warnings.push(ctx.warning(
                WarningCode::InvalidLegacyElement,
                "`Polymer()` expects an object literal",
                call.span,
            ));
            return Ok(WalkAction::Continue);
        };

        let name = match path.parent() {
            Some(Node::VariableDeclarator(decl)) => binding_name(&decl.id),
            Some(Node::Expression(Expression::AssignmentExpression(assign))) => {
                assignment_target_name(&assign.left)
            }
            _ => None,
        };
        let annotation = ctx.node_annotation(node, path);
        let mut entity = ctx.entity(EntityKind::Element, name.as_deref(), annotation, call.span);
        entity.class_node = Some(super::node_id(obj.span));

        if !self.read_identity(obj, &mut entity) {
            entity.warnings.push(ctx.warning(
                WarningCode::CouldNotDetermineTagName,
                "`Polymer()` call has no `is`",
                call.span,
            ));
        }
        extract_object_members(ctx, obj, &mut entity)?;
        apply_declaration_tags(ctx, call.span, &mut entity)?;
        self.out.entities.push(entity);
        Ok(WalkAction::Continue)
    }
}

impl<'n, 'a, 'c, 's> Scanner<'n, 'a> for LegacyElementFinder<'c, 's> {
    const NAME: &'static str = "legacy";

    fn finish(self) -> ScannerOutput {
        self.out
    }
}
