//! `customElements.define(tag, Class)` finder.

use oxc_ast::ast::Expression;
use oxc_span::GetSpan;
use phf::{phf_set, Set as PhfSet};
use vellum_carton::CompactString;
use vellum_relief::{RegistrationTarget, ScannedRegistration, WarningCode};

use super::{node_id, ScanContext, Scanner, ScannerOutput};
use crate::error::{ScanError, ScanResult};
use crate::helpers::{dotted_name, string_value};
use crate::walker::{Node, Visitor, WalkAction, WalkPath};

/// Every spelling of the registration entry point.
static REGISTRATION_CALLEES: PhfSet<&'static str> = phf_set! {
    "customElements.define",
    "window.customElements.define",
    "globalThis.customElements.define",
    "self.customElements.define",
};

pub struct RegistrationFinder<'c, 's> {
    ctx: &'c ScanContext<'s>,
    out: ScannerOutput,
}

impl<'c, 's> RegistrationFinder<'c, 's> {
    pub fn new(ctx: &'c ScanContext<'s>) -> Self {
        Self {
            ctx,
            out: ScannerOutput::default(),
        }
    }
}

/// A tag argument that can be read statically.
enum TagArg {
    Literal(CompactString),
    /// `Class.is`: the tag lives on the class.
    FromClass,
}

fn read_tag(expr: &Expression<'_>) -> Option<TagArg> {
    if let Some(tag) = string_value(expr) {
        return Some(TagArg::Literal(CompactString::new(tag)));
    }
    match expr {
        Expression::StaticMemberExpression(member) if member.property.name.as_str() == "is" => {
            Some(TagArg::FromClass)
        }
        _ => None,
    }
}

impl<'n, 'a, 'c, 's> Visitor<'n, 'a> for RegistrationFinder<'c, 's> {
    type Error = ScanError;

    fn enter(&mut self, node: Node<'n, 'a>, _path: &WalkPath<'n, 'a>) -> ScanResult<WalkAction> {
        let Node::Expression(Expression::CallExpression(call)) = node else {
            return Ok(WalkAction::Continue);
        };
        let is_registration = dotted_name(&call.callee)
            .is_some_and(|callee| REGISTRATION_CALLEES.contains(callee.as_str()));
        if !is_registration {
            return Ok(WalkAction::Continue);
        }

        let ctx = self.ctx;
        let mut args = call.arguments.iter().filter_map(|arg| arg.as_expression());
        let (tag_arg, class_arg) = (args.next(), args.next());

        let tag_name = match tag_arg.and_then(read_tag) {
            Some(TagArg::Literal(tag)) => Some(tag),
            Some(TagArg::FromClass) => None,
            None => {
                let span = tag_arg.map_or(call.span, |arg| arg.span());
                self.out.warnings.push(ctx.warning(
                    WarningCode::CouldNotDetermineTagName,
                    "the tag name must be a string literal or `Class.is`",
                    span,
                ));
                return Ok(WalkAction::Continue);
            }
        };

        let target = match class_arg {
            Some(Expression::ClassExpression(class)) => RegistrationTarget::Node(node_id(class.span)),
            Some(expr) => match dotted_name(expr) {
                Some(name) => RegistrationTarget::Name(CompactString::new(
                    ctx.options.strip_global_prefix(&name),
                )),
                None => {
                    self.out.warnings.push(ctx.warning(
                        WarningCode::CouldNotDetermineElement,
                        "the element must be an identifier or a class expression",
                        expr.span(),
                    ));
                    return Ok(WalkAction::Continue);
                }
            },
            None => {
                self.out.warnings.push(ctx.warning(
                    WarningCode::CouldNotDetermineElement,
                    "registration call has no element argument",
                    call.span,
                ));
                return Ok(WalkAction::Continue);
            }
        };

        self.out.registrations.push(ScannedRegistration {
            tag_name,
            target,
            range: ctx.range(call.span),
        });
        Ok(WalkAction::Continue)
    }
}

impl<'n, 'a, 'c, 's> Scanner<'n, 'a> for RegistrationFinder<'c, 's> {
    const NAME: &'static str = "registration";

    fn finish(self) -> ScannerOutput {
        self.out
    }
}
