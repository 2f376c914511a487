//! `Foo.prototype.bar = ...` finder.
//!
//! Members are collected per owner name and folded into the owner after all
//! scanners finish, since the assignment may come before the class.

use oxc_ast::ast::{AssignmentTarget, Expression, Statement, StaticMemberExpression};
use vellum_carton::CompactString;
use vellum_relief::{ScannedMethod, ScannedProperty};

use super::{ScanContext, Scanner, ScannerOutput};
use crate::error::{ScanError, ScanResult};
use crate::helpers::dotted_name;
use crate::members::{annotated_property, method_from_expression, set_default};
use crate::walker::{Node, Visitor, WalkAction, WalkPath};

/// A member declared through an owner's prototype.
#[derive(Debug, Clone)]
pub struct PrototypeMember {
    /// Plain or namespaced name of the owner.
    pub owner: CompactString,
    pub member: PrototypeMemberKind,
}

#[derive(Debug, Clone)]
pub enum PrototypeMemberKind {
    Property(ScannedProperty),
    Method(ScannedMethod),
}

impl PrototypeMemberKind {
    pub fn name(&self) -> &str {
        match self {
            PrototypeMemberKind::Property(prop) => &prop.name,
            PrototypeMemberKind::Method(method) => &method.name,
        }
    }
}

pub struct PrototypeFinder<'c, 's> {
    ctx: &'c ScanContext<'s>,
    out: ScannerOutput,
}

impl<'c, 's> PrototypeFinder<'c, 's> {
    pub fn new(ctx: &'c ScanContext<'s>) -> Self {
        Self {
            ctx,
            out: ScannerOutput::default(),
        }
    }

    /// Owner of `Owner.prototype.member`, if `member` has that shape.
    fn owner(&self, member: &StaticMemberExpression<'_>) -> Option<CompactString> {
        let Expression::StaticMemberExpression(proto) = &member.object else {
            return None;
        };
        if proto.property.name.as_str() != "prototype" {
            return None;
        }
        let owner = dotted_name(&proto.object)?;
        Some(CompactString::new(self.ctx.options.strip_global_prefix(&owner)))
    }
}

impl<'n, 'a, 'c, 's> Visitor<'n, 'a> for PrototypeFinder<'c, 's> {
    type Error = ScanError;

    fn enter(&mut self, node: Node<'n, 'a>, _path: &WalkPath<'n, 'a>) -> ScanResult<WalkAction> {
        let Node::Statement(Statement::ExpressionStatement(stmt)) = node else {
            return Ok(WalkAction::Continue);
        };
        let ctx = self.ctx;
        let annotation = ctx.annotation_at(stmt.span.start);

        let member = match &stmt.expression {
            Expression::AssignmentExpression(assign) => {
                let AssignmentTarget::StaticMemberExpression(target) = &assign.left else {
                    return Ok(WalkAction::Continue);
                };
                let Some(owner) = self.owner(target) else {
                    return Ok(WalkAction::Continue);
                };
                let name = target.property.name.as_str();
                let kind = match method_from_expression(
                    ctx,
                    name,
                    &assign.right,
                    annotation.as_ref(),
                    stmt.span,
                ) {
                    Some(method) => PrototypeMemberKind::Method(method),
                    None => {
                        let mut prop = annotated_property(ctx, name, annotation, stmt.span);
                        set_default(ctx, &mut prop, &assign.right);
                        PrototypeMemberKind::Property(prop)
                    }
                };
                PrototypeMember {
                    owner,
                    member: kind,
                }
            }
            // `Foo.prototype.bar;` only means something with a comment on it.
            Expression::StaticMemberExpression(target) if annotation.is_some() => {
                let Some(owner) = self.owner(target) else {
                    return Ok(WalkAction::Continue);
                };
                let prop =
                    annotated_property(ctx, target.property.name.as_str(), annotation, stmt.span);
                PrototypeMember {
                    owner,
                    member: PrototypeMemberKind::Property(prop),
                }
            }
            _ => return Ok(WalkAction::Continue),
        };

        self.out.prototype_members.push(member);
        Ok(WalkAction::Continue)
    }
}

impl<'n, 'a, 'c, 's> Scanner<'n, 'a> for PrototypeFinder<'c, 's> {
    const NAME: &'static str = "prototype";

    fn finish(self) -> ScannerOutput {
        self.out
    }
}
