//! Mixin factory finder.
//!
//! A mixin is a `@mixinFunction`-tagged function whose body returns a class
//! extending the function's parameter:
//!
//! ```js
//! /** @mixinFunction */
//! const Selectable = (base) => class extends base { ... };
//! ```
//!
//! The finder threads a small state machine through the walk:
//!
//! ```text
//! Idle --tagged declaration--> Armed --class inside--> Bound
//!   ^                            |                       |
//!   +------leave declaration-----+-----------------------+
//! ```
//!
//! Leaving the declaration emits the record, with empty member tables if no
//! class was ever seen.

use oxc_ast::ast::{Expression, FormalParameters, FunctionType};
use oxc_span::{GetSpan, Span};
use vellum_carton::{CompactString, SmallVec};
use vellum_relief::{Annotation, EntityKind, ScannedEntity, SyntaxNodeId, WarningCode};

use super::{apply_declaration_tags, node_id, read_heritage, ScanContext, Scanner, ScannerOutput};
use crate::error::{ScanError, ScanResult};
use crate::helpers::{assignment_target_name, binding_name};
use crate::members::extract_class_members;
use crate::walker::{Node, Visitor, WalkAction, WalkPath};

const MIXIN_TAG: &str = "mixinFunction";

/// What an armed declaration remembers about itself.
#[derive(Debug, Clone)]
pub struct MixinBinding {
    pub name: Option<CompactString>,
    pub annotation: Annotation,
    /// The declarator, assignment or function declaration that armed the finder.
    pub declaration: SyntaxNodeId,
    pub span: Span,
    /// Factory parameter names; a superclass naming one of them is the
    /// mixin's own input, not a real superclass.
    pub params: SmallVec<[CompactString; 2]>,
}

#[derive(Debug, Default)]
pub enum MixinState {
    #[default]
    Idle,
    Armed(MixinBinding),
    Bound(MixinBinding, Box<ScannedEntity>),
}

impl MixinState {
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, MixinState::Idle)
    }

    /// Arm with a binding. Ignored unless idle: nested tagged declarations
    /// belong to the outer factory.
    pub fn arm(&mut self, binding: MixinBinding) -> bool {
        if self.is_idle() {
            *self = MixinState::Armed(binding);
            true
        } else {
            false
        }
    }

    /// The binding waiting for its class, if armed.
    pub fn armed(&self) -> Option<&MixinBinding> {
        match self {
            MixinState::Armed(binding) => Some(binding),
            _ => None,
        }
    }

    /// Attach the record built from the factory's class. Only the first class
    /// binds.
    pub fn bind(&mut self, record: ScannedEntity) -> bool {
        match std::mem::take(self) {
            MixinState::Armed(binding) => {
                *self = MixinState::Bound(binding, Box::new(record));
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    /// Leave a node. Returns the binding and the bound record, if any, when
    /// the node is the armed declaration, and goes back to idle.
    pub fn leave(&mut self, node: SyntaxNodeId) -> Option<(MixinBinding, Option<ScannedEntity>)> {
        let declaration = match self {
            MixinState::Idle => return None,
            MixinState::Armed(binding) | MixinState::Bound(binding, _) => binding.declaration,
        };
        if declaration != node {
            return None;
        }
        match std::mem::take(self) {
            MixinState::Armed(binding) => Some((binding, None)),
            MixinState::Bound(binding, record) => Some((binding, Some(*record))),
            MixinState::Idle => None,
        }
    }
}

pub struct MixinFinder<'c, 's> {
    ctx: &'c ScanContext<'s>,
    state: MixinState,
    out: ScannerOutput,
}

impl<'c, 's> MixinFinder<'c, 's> {
    pub fn new(ctx: &'c ScanContext<'s>) -> Self {
        Self {
            ctx,
            state: MixinState::Idle,
            out: ScannerOutput::default(),
        }
    }

    fn tagged(&self, node: Node<'_, '_>, path: &WalkPath<'_, '_>) -> Option<Annotation> {
        self.ctx
            .node_annotation(node, path)
            .filter(|annotation| annotation.has_tag(MIXIN_TAG))
    }

    /// Arm on a declaration whose value should be a factory.
    fn arm_with_value(
        &mut self,
        name: Option<CompactString>,
        annotation: Annotation,
        value: &Expression<'_>,
        span: Span,
    ) {
        match factory_params(value) {
            Some(params) => {
                self.state.arm(MixinBinding {
                    name,
                    annotation,
                    declaration: node_id(span),
                    span,
                    params,
                });
            }
            None => self.out.warnings.push(self.ctx.warning(
                WarningCode::InvalidMixinDeclaration,
                format!(
                    "`@{MIXIN_TAG}` on `{}`, which is not a function",
                    name.as_deref().unwrap_or("<anonymous>")
                ),
                span,
            )),
        }
    }

    fn empty_record(&self, binding: MixinBinding) -> ScanResult<ScannedEntity> {
        let mut record = self.ctx.entity(
            EntityKind::Mixin,
            binding.name.as_deref(),
            Some(binding.annotation),
            binding.span,
        );
        apply_declaration_tags(self.ctx, binding.span, &mut record)?;
        Ok(record)
    }

    fn class_record(
        &self,
        binding: &MixinBinding,
        class: &oxc_ast::ast::Class<'_>,
    ) -> ScanResult<ScannedEntity> {
        let ctx = self.ctx;
        let mut record = ctx.entity(
            EntityKind::Mixin,
            binding.name.as_deref(),
            Some(binding.annotation.clone()),
            binding.span,
        );
        record.class_node = Some(node_id(class.span));
        if let Some(superclass) = &class.super_class {
            read_heritage(ctx, superclass, &mut record);
        }
        if record
            .superclass
            .as_ref()
            .is_some_and(|sup| binding.params.contains(&sup.identifier))
        {
            record.superclass = None;
        }
        extract_class_members(ctx, class, &mut record)?;
        apply_declaration_tags(ctx, binding.span, &mut record)?;
        Ok(record)
    }
}

/// Parameter names of a factory: a function, an arrow, or a call wrapping
/// one (`dedupingMixin((base) => class ...)`).
fn factory_params(expr: &Expression<'_>) -> Option<SmallVec<[CompactString; 2]>> {
    match expr {
        Expression::FunctionExpression(func) => Some(param_names(&func.params)),
        Expression::ArrowFunctionExpression(arrow) => Some(param_names(&arrow.params)),
        Expression::ParenthesizedExpression(paren) => factory_params(&paren.expression),
        Expression::CallExpression(call) => call
            .arguments
            .iter()
            .filter_map(|arg| arg.as_expression())
            .find_map(factory_params),
        _ => None,
    }
}

fn param_names(params: &FormalParameters<'_>) -> SmallVec<[CompactString; 2]> {
    params
        .items
        .iter()
        .filter_map(|item| binding_name(&item.pattern))
        .collect()
}

impl<'n, 'a, 'c, 's> Visitor<'n, 'a> for MixinFinder<'c, 's> {
    type Error = ScanError;

    fn enter(&mut self, node: Node<'n, 'a>, path: &WalkPath<'n, 'a>) -> ScanResult<WalkAction> {
        match node {
            Node::Class(class) => {
                let record = match self.state.armed() {
                    Some(binding) => self.class_record(binding, class)?,
                    None => return Ok(WalkAction::Continue),
                };
                self.state.bind(record);
            }
            _ if !self.state.is_idle() => {}
            Node::VariableDeclarator(decl) => {
                let Some(annotation) = self.tagged(node, path) else {
                    return Ok(WalkAction::Continue);
                };
                let name = binding_name(&decl.id);
                match &decl.init {
                    // A forward declaration: legal, but it has no members.
                    None => {
                        let binding = MixinBinding {
                            name,
                            annotation,
                            declaration: node_id(decl.span),
                            span: decl.span,
                            params: SmallVec::new(),
                        };
                        let record = self.empty_record(binding)?;
                        self.out.entities.push(record);
                    }
                    Some(init) => self.arm_with_value(name, annotation, init, decl.span),
                }
            }
            Node::Expression(Expression::AssignmentExpression(assign)) => {
                if let Some(annotation) = self.tagged(node, path) {
                    let name = assignment_target_name(&assign.left);
                    self.arm_with_value(name, annotation, &assign.right, assign.span);
                }
            }
            Node::Function(func) if func.r#type == FunctionType::FunctionDeclaration => {
                if let Some(annotation) = self.tagged(node, path) {
                    self.state.arm(MixinBinding {
                        name: func.id.as_ref().map(|id| CompactString::new(id.name.as_str())),
                        annotation,
                        declaration: node_id(func.span),
                        span: func.span,
                        params: param_names(&func.params),
                    });
                }
            }
            _ => {}
        }
        Ok(WalkAction::Continue)
    }

    fn leave(&mut self, node: Node<'n, 'a>, _path: &WalkPath<'n, 'a>) -> ScanResult<()> {
        if let Some((binding, record)) = self.state.leave(node.id()) {
            let record = match record {
                Some(record) => record,
                None => self.empty_record(binding)?,
            };
            self.out.entities.push(record);
        }
        Ok(())
    }
}

impl<'n, 'a, 'c, 's> Scanner<'n, 'a> for MixinFinder<'c, 's> {
    const NAME: &'static str = "mixin";

    fn finish(self) -> ScannerOutput {
        self.out
    }
}
