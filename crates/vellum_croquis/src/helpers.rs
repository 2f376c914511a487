//! Small readers over oxc expressions shared by the scanners.

use oxc_ast::ast::{
    AssignmentTarget, BindingPattern, Expression, PropertyKey, Statement,
    UnaryOperator,
};
use vellum_carton::CompactString;

/// Dotted name of an identifier or static member chain (`a.b.c`).
pub fn dotted_name(expr: &Expression<'_>) -> Option<CompactString> {
    match expr {
        Expression::Identifier(id) => Some(CompactString::new(id.name.as_str())),
        Expression::ThisExpression(_) => Some(CompactString::new("this")),
        Expression::StaticMemberExpression(member) => {
            let mut name = dotted_name(&member.object)?;
            name.push('.');
            name.push_str(member.property.name.as_str());
            Some(name)
        }
        Expression::ParenthesizedExpression(paren) => dotted_name(&paren.expression),
        _ => None,
    }
}

/// Dotted name of an assignment target (`Foo` or `NS.Foo`).
pub fn assignment_target_name(target: &AssignmentTarget<'_>) -> Option<CompactString> {
    match target {
        AssignmentTarget::AssignmentTargetIdentifier(id) => {
            Some(CompactString::new(id.name.as_str()))
        }
        AssignmentTarget::StaticMemberExpression(member) => {
            let mut name = dotted_name(&member.object)?;
            name.push('.');
            name.push_str(member.property.name.as_str());
            Some(name)
        }
        _ => None,
    }
}

/// Last segment of a dotted name.
#[inline]
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Static string value of a literal or a template without substitutions.
pub fn string_value<'e>(expr: &'e Expression<'_>) -> Option<&'e str> {
    match expr {
        Expression::StringLiteral(lit) => Some(lit.value.as_str()),
        Expression::TemplateLiteral(template) if template.expressions.is_empty() => {
            template.quasis.first().map(|q| q.value.raw.as_str())
        }
        Expression::ParenthesizedExpression(paren) => string_value(&paren.expression),
        _ => None,
    }
}

/// Boolean literal value.
pub fn bool_value(expr: &Expression<'_>) -> Option<bool> {
    match expr {
        Expression::BooleanLiteral(lit) => Some(lit.value),
        _ => None,
    }
}

/// Name of a non-computed property key.
pub fn property_key_name(key: &PropertyKey<'_>) -> Option<CompactString> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(CompactString::new(id.name.as_str())),
        PropertyKey::PrivateIdentifier(id) => {
            let mut name = CompactString::new("#");
            name.push_str(id.name.as_str());
            Some(name)
        }
        PropertyKey::StringLiteral(lit) => Some(CompactString::new(lit.value.as_str())),
        PropertyKey::NumericLiteral(lit) => Some(CompactString::new(lit.value.to_string())),
        _ => None,
    }
}

/// Name bound by a simple pattern (`x` or `x = default`).
pub fn binding_name(pattern: &BindingPattern<'_>) -> Option<CompactString> {
    match pattern {
        BindingPattern::BindingIdentifier(id) => Some(CompactString::new(id.name.as_str())),
        BindingPattern::AssignmentPattern(assign) => binding_name(&assign.left),
        _ => None,
    }
}

/// Argument of the first top-level `return` in a body.
pub fn returned_expression<'s, 'a>(stmts: &'s [Statement<'a>]) -> Option<&'s Expression<'a>> {
    stmts.iter().find_map(|stmt| match stmt {
        Statement::ReturnStatement(ret) => ret.argument.as_ref(),
        _ => None,
    })
}

/// What a function-valued expression evaluates to when called.
///
/// `() => x` and `function() { return x; }` both give `x`.
pub fn function_result<'s, 'a>(expr: &'s Expression<'a>) -> Option<&'s Expression<'a>> {
    match expr {
        Expression::ArrowFunctionExpression(arrow) if arrow.expression => {
            match arrow.body.statements.first() {
                Some(Statement::ExpressionStatement(stmt)) => Some(&stmt.expression),
                _ => None,
            }
        }
        Expression::ArrowFunctionExpression(arrow) => returned_expression(&arrow.body.statements),
        Expression::FunctionExpression(func) => func
            .body
            .as_ref()
            .and_then(|body| returned_expression(&body.statements)),
        Expression::ParenthesizedExpression(paren) => function_result(&paren.expression),
        _ => None,
    }
}

/// Whether an expression is a function or arrow function.
#[inline]
pub fn is_function(expr: &Expression<'_>) -> bool {
    matches!(
        expr,
        Expression::FunctionExpression(_) | Expression::ArrowFunctionExpression(_)
    )
}

/// Type of a literal initializer.
pub fn infer_literal_type(expr: &Expression<'_>) -> Option<&'static str> {
    match expr {
        Expression::NumericLiteral(_) | Expression::BigIntLiteral(_) => Some("number"),
        Expression::StringLiteral(_) | Expression::TemplateLiteral(_) => Some("string"),
        Expression::BooleanLiteral(_) => Some("boolean"),
        Expression::NullLiteral(_) => Some("null"),
        Expression::ArrayExpression(_) => Some("Array"),
        Expression::ObjectExpression(_) => Some("Object"),
        Expression::RegExpLiteral(_) => Some("RegExp"),
        Expression::FunctionExpression(_) | Expression::ArrowFunctionExpression(_) => {
            Some("Function")
        }
        Expression::UnaryExpression(unary) => match unary.operator {
            UnaryOperator::UnaryNegation | UnaryOperator::UnaryPlus => Some("number"),
            UnaryOperator::LogicalNot => Some("boolean"),
            UnaryOperator::Typeof => Some("string"),
            _ => None,
        },
        Expression::ParenthesizedExpression(paren) => infer_literal_type(&paren.expression),
        _ => None,
    }
}

/// Type named by a constructor used in a property configuration.
pub fn config_type_name(constructor: &str) -> Option<&'static str> {
    match constructor {
        "String" => Some("string"),
        "Number" => Some("number"),
        "Boolean" => Some("boolean"),
        "Array" => Some("Array"),
        "Object" => Some("Object"),
        "Date" => Some("Date"),
        "Function" => Some("Function"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn with_expression<R>(source: &str, f: impl FnOnce(&Expression<'_>) -> R) -> R {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path("test.js").unwrap_or_default();
        let ret = Parser::new(&allocator, source, source_type).parse();
        match ret.program.body.first() {
            Some(Statement::ExpressionStatement(stmt)) => f(&stmt.expression),
            _ => panic!("expected an expression statement"),
        }
    }

    #[test]
    fn test_dotted_name() {
        assert_eq!(
            with_expression("window.Polymer.Element;", dotted_name).as_deref(),
            Some("window.Polymer.Element")
        );
        assert_eq!(with_expression("a[b];", dotted_name), None);
        assert_eq!(with_expression("(Foo);", dotted_name).as_deref(), Some("Foo"));
    }

    #[test]
    fn test_infer_literal_type() {
        assert_eq!(with_expression("1;", infer_literal_type), Some("number"));
        assert_eq!(with_expression("-1;", infer_literal_type), Some("number"));
        // A bare `'x';` statement would parse as a directive.
        assert_eq!(with_expression("('x');", infer_literal_type), Some("string"));
        assert_eq!(with_expression("`x`;", infer_literal_type), Some("string"));
        assert_eq!(with_expression("[];", infer_literal_type), Some("Array"));
        assert_eq!(with_expression("(() => 1);", infer_literal_type), Some("Function"));
        assert_eq!(with_expression("foo();", infer_literal_type), None);
    }

    #[test]
    fn test_function_result() {
        let text = |expr: &Expression<'_>| function_result(expr).and_then(string_value).map(str::to_string);
        assert_eq!(with_expression("(() => 'a');", text).as_deref(), Some("a"));
        assert_eq!(
            with_expression("(function() { return `b`; });", text).as_deref(),
            Some("b")
        );
        assert_eq!(with_expression("(() => { foo(); });", text), None);
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("NS.Inner.Foo"), "Foo");
        assert_eq!(last_segment("Foo"), "Foo");
    }
}
