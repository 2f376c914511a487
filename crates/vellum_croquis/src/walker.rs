//! Depth-first syntax tree walker.
//!
//! Every scanner is a [`Visitor`]: it sees each node once on the way down
//! (`enter`, pre-order) and once on the way up (`leave`, post-order), and
//! dispatches by matching on [`Node`]. Nodes the scanners never care about
//! (patterns, type annotations, literals other than strings) are not emitted
//! at all, but the walk still descends through every statement and expression
//! that can contain a class, function, call or assignment.
//!
//! ```text
//! enter(Program)
//!   enter(Class) ── Skip ──┐
//!   leave(Class) <─────────┘   children not visited
//!   enter(Statement) ── Abort ──> walk returns WalkOutcome::Aborted
//! ```

use std::ops::ControlFlow;

use oxc_ast::ast::{
    Argument, ArrayExpressionElement, ArrowFunctionExpression, CallExpression, ChainElement, Class,
    ClassElement, Declaration, ExportDefaultDeclarationKind, Expression, ForStatementInit,
    ForStatementLeft, Function, MethodDefinition, ObjectProperty, ObjectPropertyKind, Program,
    PropertyDefinition, Statement, StaticBlock, VariableDeclaration, VariableDeclarator,
};
use oxc_span::{GetSpan, Span};
use vellum_relief::SyntaxNodeId;

/// Kind of a [`Node`], without the borrowed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    ExpressionStatement,
    VariableDeclaration,
    VariableDeclarator,
    ReturnStatement,
    ExportNamedDeclaration,
    ExportDefaultDeclaration,
    ImportDeclaration,
    /// Any other statement (blocks, loops, conditionals, ...).
    Statement,
    Class,
    MethodDefinition,
    PropertyDefinition,
    StaticBlock,
    Function,
    ArrowFunction,
    CallExpression,
    NewExpression,
    AssignmentExpression,
    ObjectExpression,
    ObjectProperty,
    ArrayExpression,
    MemberExpression,
    Identifier,
    StringLiteral,
    /// Any other expression.
    Expression,
}

impl NodeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Program => "Program",
            Self::ExpressionStatement => "ExpressionStatement",
            Self::VariableDeclaration => "VariableDeclaration",
            Self::VariableDeclarator => "VariableDeclarator",
            Self::ReturnStatement => "ReturnStatement",
            Self::ExportNamedDeclaration => "ExportNamedDeclaration",
            Self::ExportDefaultDeclaration => "ExportDefaultDeclaration",
            Self::ImportDeclaration => "ImportDeclaration",
            Self::Statement => "Statement",
            Self::Class => "Class",
            Self::MethodDefinition => "MethodDefinition",
            Self::PropertyDefinition => "PropertyDefinition",
            Self::StaticBlock => "StaticBlock",
            Self::Function => "Function",
            Self::ArrowFunction => "ArrowFunction",
            Self::CallExpression => "CallExpression",
            Self::NewExpression => "NewExpression",
            Self::AssignmentExpression => "AssignmentExpression",
            Self::ObjectExpression => "ObjectExpression",
            Self::ObjectProperty => "ObjectProperty",
            Self::ArrayExpression => "ArrayExpression",
            Self::MemberExpression => "MemberExpression",
            Self::Identifier => "Identifier",
            Self::StringLiteral => "StringLiteral",
            Self::Expression => "Expression",
        }
    }

    /// Kinds that sit at statement level.
    #[inline]
    pub const fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::ExpressionStatement
                | Self::VariableDeclaration
                | Self::ReturnStatement
                | Self::ExportNamedDeclaration
                | Self::ExportDefaultDeclaration
                | Self::ImportDeclaration
                | Self::Statement
        )
    }
}

/// A borrowed syntax node.
///
/// Class and function declarations are emitted as [`Node::Class`] and
/// [`Node::Function`] just like their expression forms, so a scanner handles
/// both in one arm and reads the declaration form off the parent.
#[derive(Debug, Clone, Copy)]
pub enum Node<'n, 'a> {
    Program(&'n Program<'a>),
    Statement(&'n Statement<'a>),
    VariableDeclaration(&'n VariableDeclaration<'a>),
    VariableDeclarator(&'n VariableDeclarator<'a>),
    Class(&'n Class<'a>),
    MethodDefinition(&'n MethodDefinition<'a>),
    PropertyDefinition(&'n PropertyDefinition<'a>),
    StaticBlock(&'n StaticBlock<'a>),
    Function(&'n Function<'a>),
    ArrowFunction(&'n ArrowFunctionExpression<'a>),
    Expression(&'n Expression<'a>),
    ObjectProperty(&'n ObjectProperty<'a>),
}

impl<'n, 'a> Node<'n, 'a> {
    /// Wrap a statement, unwrapping declarations that have their own node.
    pub fn from_statement(stmt: &'n Statement<'a>) -> Self {
        match stmt {
            Statement::ClassDeclaration(class) => Node::Class(class),
            Statement::FunctionDeclaration(func) => Node::Function(func),
            Statement::VariableDeclaration(decl) => Node::VariableDeclaration(decl),
            _ => Node::Statement(stmt),
        }
    }

    /// Wrap an expression, unwrapping classes and functions.
    pub fn from_expression(expr: &'n Expression<'a>) -> Self {
        match expr {
            Expression::ClassExpression(class) => Node::Class(class),
            Expression::FunctionExpression(func) => Node::Function(func),
            Expression::ArrowFunctionExpression(arrow) => Node::ArrowFunction(arrow),
            _ => Node::Expression(expr),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Program(_) => NodeKind::Program,
            Node::Statement(stmt) => match stmt {
                Statement::ExpressionStatement(_) => NodeKind::ExpressionStatement,
                Statement::ReturnStatement(_) => NodeKind::ReturnStatement,
                Statement::ExportNamedDeclaration(_) => NodeKind::ExportNamedDeclaration,
                Statement::ExportDefaultDeclaration(_) => NodeKind::ExportDefaultDeclaration,
                Statement::ImportDeclaration(_) => NodeKind::ImportDeclaration,
                _ => NodeKind::Statement,
            },
            Node::VariableDeclaration(_) => NodeKind::VariableDeclaration,
            Node::VariableDeclarator(_) => NodeKind::VariableDeclarator,
            Node::Class(_) => NodeKind::Class,
            Node::MethodDefinition(_) => NodeKind::MethodDefinition,
            Node::PropertyDefinition(_) => NodeKind::PropertyDefinition,
            Node::StaticBlock(_) => NodeKind::StaticBlock,
            Node::Function(_) => NodeKind::Function,
            Node::ArrowFunction(_) => NodeKind::ArrowFunction,
            Node::Expression(expr) => match expr {
                Expression::CallExpression(_) => NodeKind::CallExpression,
                Expression::NewExpression(_) => NodeKind::NewExpression,
                Expression::AssignmentExpression(_) => NodeKind::AssignmentExpression,
                Expression::ObjectExpression(_) => NodeKind::ObjectExpression,
                Expression::ArrayExpression(_) => NodeKind::ArrayExpression,
                Expression::StaticMemberExpression(_)
                | Expression::ComputedMemberExpression(_)
                | Expression::PrivateFieldExpression(_) => NodeKind::MemberExpression,
                Expression::Identifier(_) => NodeKind::Identifier,
                Expression::StringLiteral(_) => NodeKind::StringLiteral,
                _ => NodeKind::Expression,
            },
            Node::ObjectProperty(_) => NodeKind::ObjectProperty,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::Program(program) => program.span,
            Node::Statement(stmt) => stmt.span(),
            Node::VariableDeclaration(decl) => decl.span,
            Node::VariableDeclarator(decl) => decl.span,
            Node::Class(class) => class.span,
            Node::MethodDefinition(method) => method.span,
            Node::PropertyDefinition(prop) => prop.span,
            Node::StaticBlock(block) => block.span,
            Node::Function(func) => func.span,
            Node::ArrowFunction(arrow) => arrow.span,
            Node::Expression(expr) => expr.span(),
            Node::ObjectProperty(prop) => prop.span,
        }
    }

    /// Identity of this node within its document.
    #[inline]
    pub fn id(&self) -> SyntaxNodeId {
        let span = self.span();
        SyntaxNodeId::new(span.start, span.end)
    }

    /// The expression payload, if this is a plain expression node.
    #[inline]
    pub fn as_expression(&self) -> Option<&'n Expression<'a>> {
        match self {
            Node::Expression(expr) => Some(expr),
            _ => None,
        }
    }
}

/// What a visitor wants after entering a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkAction {
    #[default]
    Continue,
    /// Do not visit this node's children. `leave` still fires.
    Skip,
    /// Stop the whole walk. No further callbacks fire.
    Abort,
}

/// How a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    Completed,
    Aborted,
}

/// Ancestors of the node being visited, outermost first.
#[derive(Debug, Default)]
pub struct WalkPath<'n, 'a> {
    stack: Vec<Node<'n, 'a>>,
}

impl<'n, 'a> WalkPath<'n, 'a> {
    /// Nearest ancestor.
    #[inline]
    pub fn parent(&self) -> Option<Node<'n, 'a>> {
        self.stack.last().copied()
    }

    /// Ancestors from nearest to farthest.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'n, 'a>> + '_ {
        self.stack.iter().rev().copied()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Callbacks for a walk. Both default to doing nothing.
pub trait Visitor<'n, 'a> {
    type Error;

    fn enter(
        &mut self,
        _node: Node<'n, 'a>,
        _path: &WalkPath<'n, 'a>,
    ) -> Result<WalkAction, Self::Error> {
        Ok(WalkAction::Continue)
    }

    fn leave(&mut self, _node: Node<'n, 'a>, _path: &WalkPath<'n, 'a>) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Walk a whole program.
pub fn walk<'n, 'a, V>(program: &'n Program<'a>, visitor: &mut V) -> Result<WalkOutcome, V::Error>
where
    V: Visitor<'n, 'a>,
{
    let mut walker = Walker {
        visitor,
        path: WalkPath::default(),
    };
    Ok(match walker.visit(Node::Program(program))? {
        ControlFlow::Continue(()) => WalkOutcome::Completed,
        ControlFlow::Break(()) => WalkOutcome::Aborted,
    })
}

type Flow<E> = Result<ControlFlow<()>, E>;

/// Return early when a child visit aborted the walk.
macro_rules! descend {
    ($flow:expr) => {
        if $flow?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    };
}

struct Walker<'v, 'n, 'a, V: Visitor<'n, 'a>> {
    visitor: &'v mut V,
    path: WalkPath<'n, 'a>,
}

impl<'v, 'n, 'a, V: Visitor<'n, 'a>> Walker<'v, 'n, 'a, V> {
    fn visit(&mut self, node: Node<'n, 'a>) -> Flow<V::Error> {
        match self.visitor.enter(node, &self.path)? {
            WalkAction::Abort => return Ok(ControlFlow::Break(())),
            WalkAction::Skip => {}
            WalkAction::Continue => {
                self.path.stack.push(node);
                let flow = self.children(node);
                self.path.stack.pop();
                descend!(flow);
            }
        }
        self.visitor.leave(node, &self.path)?;
        Ok(ControlFlow::Continue(()))
    }

    fn children(&mut self, node: Node<'n, 'a>) -> Flow<V::Error> {
        match node {
            Node::Program(program) => self.statements(&program.body),
            Node::Statement(stmt) => self.statement_children(stmt),
            Node::VariableDeclaration(decl) => {
                for declarator in decl.declarations.iter() {
                    descend!(self.visit(Node::VariableDeclarator(declarator)));
                }
                Ok(ControlFlow::Continue(()))
            }
            Node::VariableDeclarator(declarator) => self.opt_expression(declarator.init.as_ref()),
            Node::Class(class) => self.class_children(class),
            Node::MethodDefinition(method) => self.visit(Node::Function(&method.value)),
            Node::PropertyDefinition(prop) => self.opt_expression(prop.value.as_ref()),
            Node::StaticBlock(block) => self.statements(&block.body),
            Node::Function(func) => match &func.body {
                Some(body) => self.statements(&body.statements),
                None => Ok(ControlFlow::Continue(())),
            },
            Node::ArrowFunction(arrow) => self.statements(&arrow.body.statements),
            Node::Expression(expr) => self.expression_children(expr),
            Node::ObjectProperty(prop) => self.expression(&prop.value),
        }
    }

    fn statements(&mut self, stmts: &'n [Statement<'a>]) -> Flow<V::Error> {
        for stmt in stmts {
            descend!(self.visit(Node::from_statement(stmt)));
        }
        Ok(ControlFlow::Continue(()))
    }

    fn statement(&mut self, stmt: &'n Statement<'a>) -> Flow<V::Error> {
        self.visit(Node::from_statement(stmt))
    }

    fn expression(&mut self, expr: &'n Expression<'a>) -> Flow<V::Error> {
        self.visit(Node::from_expression(expr))
    }

    fn opt_expression(&mut self, expr: Option<&'n Expression<'a>>) -> Flow<V::Error> {
        match expr {
            Some(expr) => self.expression(expr),
            None => Ok(ControlFlow::Continue(())),
        }
    }

    fn statement_children(&mut self, stmt: &'n Statement<'a>) -> Flow<V::Error> {
        match stmt {
            Statement::ExpressionStatement(expr_stmt) => self.expression(&expr_stmt.expression),
            Statement::ReturnStatement(ret) => self.opt_expression(ret.argument.as_ref()),
            Statement::ThrowStatement(throw) => self.expression(&throw.argument),
            Statement::BlockStatement(block) => self.statements(&block.body),
            Statement::IfStatement(if_stmt) => {
                descend!(self.expression(&if_stmt.test));
                descend!(self.statement(&if_stmt.consequent));
                match &if_stmt.alternate {
                    Some(alt) => self.statement(alt),
                    None => Ok(ControlFlow::Continue(())),
                }
            }
            Statement::ForStatement(for_stmt) => {
                if let Some(init) = &for_stmt.init {
                    match init {
                        ForStatementInit::VariableDeclaration(decl) => {
                            descend!(self.visit(Node::VariableDeclaration(decl)));
                        }
                        _ => {
                            if let Some(expr) = init.as_expression() {
                                descend!(self.expression(expr));
                            }
                        }
                    }
                }
                descend!(self.opt_expression(for_stmt.test.as_ref()));
                descend!(self.opt_expression(for_stmt.update.as_ref()));
                self.statement(&for_stmt.body)
            }
            Statement::ForInStatement(for_in) => {
                descend!(self.for_left(&for_in.left));
                descend!(self.expression(&for_in.right));
                self.statement(&for_in.body)
            }
            Statement::ForOfStatement(for_of) => {
                descend!(self.for_left(&for_of.left));
                descend!(self.expression(&for_of.right));
                self.statement(&for_of.body)
            }
            Statement::WhileStatement(while_stmt) => {
                descend!(self.expression(&while_stmt.test));
                self.statement(&while_stmt.body)
            }
            Statement::DoWhileStatement(do_while) => {
                descend!(self.statement(&do_while.body));
                self.expression(&do_while.test)
            }
            Statement::SwitchStatement(switch) => {
                descend!(self.expression(&switch.discriminant));
                for case in switch.cases.iter() {
                    descend!(self.opt_expression(case.test.as_ref()));
                    descend!(self.statements(&case.consequent));
                }
                Ok(ControlFlow::Continue(()))
            }
            Statement::TryStatement(try_stmt) => {
                descend!(self.statements(&try_stmt.block.body));
                if let Some(handler) = &try_stmt.handler {
                    descend!(self.statements(&handler.body.body));
                }
                match &try_stmt.finalizer {
                    Some(finalizer) => self.statements(&finalizer.body),
                    None => Ok(ControlFlow::Continue(())),
                }
            }
            Statement::LabeledStatement(labeled) => self.statement(&labeled.body),
            Statement::WithStatement(with) => {
                descend!(self.expression(&with.object));
                self.statement(&with.body)
            }
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::VariableDeclaration(decl)) => {
                    self.visit(Node::VariableDeclaration(decl))
                }
                Some(Declaration::FunctionDeclaration(func)) => self.visit(Node::Function(func)),
                Some(Declaration::ClassDeclaration(class)) => self.visit(Node::Class(class)),
                _ => Ok(ControlFlow::Continue(())),
            },
            Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                    self.visit(Node::Function(func))
                }
                ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                    self.visit(Node::Class(class))
                }
                kind => match kind.as_expression() {
                    Some(expr) => self.expression(expr),
                    None => Ok(ControlFlow::Continue(())),
                },
            },
            _ => Ok(ControlFlow::Continue(())),
        }
    }

    fn for_left(&mut self, left: &'n ForStatementLeft<'a>) -> Flow<V::Error> {
        match left {
            ForStatementLeft::VariableDeclaration(decl) => {
                self.visit(Node::VariableDeclaration(decl))
            }
            _ => Ok(ControlFlow::Continue(())),
        }
    }

    fn class_children(&mut self, class: &'n Class<'a>) -> Flow<V::Error> {
        descend!(self.opt_expression(class.super_class.as_ref()));
        for element in class.body.body.iter() {
            let node = match element {
                ClassElement::MethodDefinition(method) => Node::MethodDefinition(method),
                ClassElement::PropertyDefinition(prop) => Node::PropertyDefinition(prop),
                ClassElement::StaticBlock(block) => Node::StaticBlock(block),
                _ => continue,
            };
            descend!(self.visit(node));
        }
        Ok(ControlFlow::Continue(()))
    }

    fn call_parts(
        &mut self,
        callee: &'n Expression<'a>,
        arguments: &'n [Argument<'a>],
    ) -> Flow<V::Error> {
        descend!(self.expression(callee));
        for arg in arguments {
            match arg {
                Argument::SpreadElement(spread) => descend!(self.expression(&spread.argument)),
                _ => {
                    if let Some(expr) = arg.as_expression() {
                        descend!(self.expression(expr));
                    }
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn call(&mut self, call: &'n CallExpression<'a>) -> Flow<V::Error> {
        self.call_parts(&call.callee, &call.arguments)
    }

    fn expression_children(&mut self, expr: &'n Expression<'a>) -> Flow<V::Error> {
        match expr {
            Expression::CallExpression(call) => self.call(call),
            Expression::NewExpression(new) => self.call_parts(&new.callee, &new.arguments),
            Expression::StaticMemberExpression(member) => self.expression(&member.object),
            Expression::ComputedMemberExpression(member) => {
                descend!(self.expression(&member.object));
                self.expression(&member.expression)
            }
            Expression::PrivateFieldExpression(field) => self.expression(&field.object),
            Expression::ChainExpression(chain) => match &chain.expression {
                ChainElement::CallExpression(call) => self.call(call),
                ChainElement::TSNonNullExpression(expr) => self.expression(&expr.expression),
                ChainElement::StaticMemberExpression(member) => self.expression(&member.object),
                ChainElement::ComputedMemberExpression(member) => {
                    descend!(self.expression(&member.object));
                    self.expression(&member.expression)
                }
                ChainElement::PrivateFieldExpression(field) => self.expression(&field.object),
            },
            Expression::AssignmentExpression(assign) => self.expression(&assign.right),
            Expression::ObjectExpression(obj) => {
                for prop in obj.properties.iter() {
                    match prop {
                        ObjectPropertyKind::ObjectProperty(p) => {
                            descend!(self.visit(Node::ObjectProperty(p)));
                        }
                        ObjectPropertyKind::SpreadProperty(spread) => {
                            descend!(self.expression(&spread.argument));
                        }
                    }
                }
                Ok(ControlFlow::Continue(()))
            }
            Expression::ArrayExpression(arr) => {
                for elem in arr.elements.iter() {
                    match elem {
                        ArrayExpressionElement::SpreadElement(spread) => {
                            descend!(self.expression(&spread.argument));
                        }
                        ArrayExpressionElement::Elision(_) => {}
                        _ => {
                            if let Some(expr) = elem.as_expression() {
                                descend!(self.expression(expr));
                            }
                        }
                    }
                }
                Ok(ControlFlow::Continue(()))
            }
            Expression::TemplateLiteral(template) => {
                for expr in template.expressions.iter() {
                    descend!(self.expression(expr));
                }
                Ok(ControlFlow::Continue(()))
            }
            Expression::TaggedTemplateExpression(tagged) => {
                descend!(self.expression(&tagged.tag));
                for expr in tagged.quasi.expressions.iter() {
                    descend!(self.expression(expr));
                }
                Ok(ControlFlow::Continue(()))
            }
            Expression::ConditionalExpression(cond) => {
                descend!(self.expression(&cond.test));
                descend!(self.expression(&cond.consequent));
                self.expression(&cond.alternate)
            }
            Expression::LogicalExpression(logical) => {
                descend!(self.expression(&logical.left));
                self.expression(&logical.right)
            }
            Expression::BinaryExpression(binary) => {
                descend!(self.expression(&binary.left));
                self.expression(&binary.right)
            }
            Expression::UnaryExpression(unary) => self.expression(&unary.argument),
            Expression::AwaitExpression(await_expr) => self.expression(&await_expr.argument),
            Expression::YieldExpression(yield_expr) => {
                self.opt_expression(yield_expr.argument.as_ref())
            }
            Expression::SequenceExpression(seq) => {
                for expr in seq.expressions.iter() {
                    descend!(self.expression(expr));
                }
                Ok(ControlFlow::Continue(()))
            }
            Expression::ParenthesizedExpression(paren) => self.expression(&paren.expression),
            Expression::TSAsExpression(ts_as) => self.expression(&ts_as.expression),
            Expression::TSSatisfiesExpression(ts_satisfies) => {
                self.expression(&ts_satisfies.expression)
            }
            Expression::TSNonNullExpression(ts_non_null) => {
                self.expression(&ts_non_null.expression)
            }
            _ => Ok(ControlFlow::Continue(())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;
    use std::convert::Infallible;

    /// Records `enter:Kind` / `leave:Kind` for every node.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip: Option<NodeKind>,
        abort: Option<NodeKind>,
    }

    impl<'n, 'a> Visitor<'n, 'a> for Recorder {
        type Error = Infallible;

        fn enter(
            &mut self,
            node: Node<'n, 'a>,
            _path: &WalkPath<'n, 'a>,
        ) -> Result<WalkAction, Infallible> {
            self.events.push(format!("enter:{}", node.kind().as_str()));
            if self.abort == Some(node.kind()) {
                return Ok(WalkAction::Abort);
            }
            if self.skip == Some(node.kind()) {
                return Ok(WalkAction::Skip);
            }
            Ok(WalkAction::Continue)
        }

        fn leave(&mut self, node: Node<'n, 'a>, _path: &WalkPath<'n, 'a>) -> Result<(), Infallible> {
            self.events.push(format!("leave:{}", node.kind().as_str()));
            Ok(())
        }
    }

    fn record(source: &str, mut recorder: Recorder) -> (Vec<String>, WalkOutcome) {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path("test.js").unwrap_or_default();
        let ret = Parser::new(&allocator, source, source_type).parse();
        let outcome = walk(&ret.program, &mut recorder).unwrap();
        (recorder.events, outcome)
    }

    #[test]
    fn test_enter_leave_order() {
        let (events, outcome) = record("class A { m() {} }", Recorder::default());
        assert_eq!(outcome, WalkOutcome::Completed);
        assert_eq!(
            events,
            vec![
                "enter:Program",
                "enter:Class",
                "enter:MethodDefinition",
                "enter:Function",
                "leave:Function",
                "leave:MethodDefinition",
                "leave:Class",
                "leave:Program",
            ]
        );
    }

    #[test]
    fn test_skip_still_leaves() {
        let recorder = Recorder {
            skip: Some(NodeKind::Class),
            ..Default::default()
        };
        let (events, _) = record("class A { m() {} }\nfoo();", recorder);
        assert_eq!(
            events,
            vec![
                "enter:Program",
                "enter:Class",
                "leave:Class",
                "enter:ExpressionStatement",
                "enter:CallExpression",
                "enter:Identifier",
                "leave:Identifier",
                "leave:CallExpression",
                "leave:ExpressionStatement",
                "leave:Program",
            ]
        );
    }

    #[test]
    fn test_abort_stops_everything() {
        let recorder = Recorder {
            abort: Some(NodeKind::CallExpression),
            ..Default::default()
        };
        let (events, outcome) = record("foo(); class A {}", recorder);
        assert_eq!(outcome, WalkOutcome::Aborted);
        assert_eq!(
            events,
            vec![
                "enter:Program",
                "enter:ExpressionStatement",
                "enter:CallExpression",
            ]
        );
    }

    /// Captures the parent kind seen when entering each class.
    struct ParentOfClass(Vec<Option<NodeKind>>);

    impl<'n, 'a> Visitor<'n, 'a> for ParentOfClass {
        type Error = Infallible;

        fn enter(
            &mut self,
            node: Node<'n, 'a>,
            path: &WalkPath<'n, 'a>,
        ) -> Result<WalkAction, Infallible> {
            if node.kind() == NodeKind::Class {
                self.0.push(path.parent().map(|p| p.kind()));
            }
            Ok(WalkAction::Continue)
        }
    }

    #[test]
    fn test_path_parent() {
        let allocator = Allocator::default();
        let source = "const A = class {};\nexport class B {}\nNS.C = class {};";
        let source_type = SourceType::from_path("test.js").unwrap_or_default();
        let ret = Parser::new(&allocator, source, source_type).parse();
        let mut visitor = ParentOfClass(Vec::new());
        walk(&ret.program, &mut visitor).unwrap();
        assert_eq!(
            visitor.0,
            vec![
                Some(NodeKind::VariableDeclarator),
                Some(NodeKind::ExportNamedDeclaration),
                Some(NodeKind::AssignmentExpression),
            ]
        );
    }

    /// Fails on the first string literal.
    struct FailOnString;

    impl<'n, 'a> Visitor<'n, 'a> for FailOnString {
        type Error = String;

        fn enter(&mut self, node: Node<'n, 'a>, _path: &WalkPath<'n, 'a>) -> Result<WalkAction, String> {
            if node.kind() == NodeKind::StringLiteral {
                return Err("string".to_string());
            }
            Ok(WalkAction::Continue)
        }
    }

    #[test]
    fn test_error_propagates() {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path("test.js").unwrap_or_default();
        let ret = Parser::new(&allocator, "f('x');", source_type).parse();
        assert_eq!(walk(&ret.program, &mut FailOnString), Err("string".to_string()));
    }
}
