//! Member extraction from class bodies and object literals.
//!
//! Within one entity, members are merged in discovery order, with the
//! earlier declaration as `a`:
//!
//! 1. constructor assignments (`this.x = 1`)
//! 2. accessors, fields and methods
//! 3. the configuration block (`static get properties()`)
//! 4. `@property` tags on the entity's own comment

use oxc_ast::ast::{
    ArrayExpression, BindingPattern, Class, ClassElement, Expression, FormalParameters,
    Function, MethodDefinitionKind, ObjectExpression, ObjectPropertyKind, PropertyKind, Statement,
};
use oxc_span::{GetSpan, Span};
use vellum_carton::{CompactString, FxHashSet};
use vellum_relief::{
    get_or_infer_privacy, Annotation, ExpressionRef, MethodParam, PropertyFlags, ScannedAttribute,
    ScannedEntity, ScannedEvent, ScannedMethod, ScannedObserver, ScannedProperty, WarningCode,
};

use crate::error::ScanResult;
use crate::helpers::{
    binding_name, bool_value, config_type_name, function_result, infer_literal_type, is_function,
    property_key_name, returned_expression, string_value,
};
use crate::merge::merge_into;
use crate::scanner::{node_id, ScanContext};

/// Keys of a legacy object literal that are not members.
const RESERVED_OBJECT_KEYS: [&str; 6] = [
    "is",
    "behaviors",
    "listeners",
    "hostAttributes",
    "keyBindings",
    "extends",
];

/// A property with description, privacy and tag-driven type filled in.
pub(crate) fn annotated_property(
    ctx: &ScanContext<'_>,
    name: &str,
    annotation: Option<Annotation>,
    span: Span,
) -> ScannedProperty {
    let mut prop = ScannedProperty::new(name);
    if let Some(annotation) = &annotation {
        prop.description = annotation.description_text();
        prop.type_ = annotation.type_of("type").cloned();
        if annotation.has_tag("readonly") || annotation.has_tag("const") {
            prop.flags |= PropertyFlags::READ_ONLY;
        }
    }
    prop.privacy = get_or_infer_privacy(name, annotation.as_ref());
    prop.annotation = annotation;
    prop.range = Some(ctx.range(span));
    prop.node = Some(node_id(span));
    prop
}

pub(crate) fn set_default(ctx: &ScanContext<'_>, prop: &mut ScannedProperty, value: &Expression<'_>) {
    prop.default_value = Some(CompactString::new(ctx.text(value.span())));
    if prop.type_.is_none() && ctx.options.infer_types {
        prop.type_ = infer_literal_type(value).map(CompactString::new);
    }
}

fn params(ctx: &ScanContext<'_>, params: &FormalParameters<'_>) -> Vec<MethodParam> {
    let mut out = Vec::with_capacity(params.items.len() + 1);
    for item in params.items.iter() {
        let pattern = &item.pattern;
        let default_value = match (&item.initializer, pattern) {
            (Some(init), _) => Some(CompactString::new(ctx.text(init.span()))),
            (None, BindingPattern::AssignmentPattern(assign)) => {
                Some(CompactString::new(ctx.text(assign.right.span())))
            }
            _ => None,
        };
        out.push(MethodParam {
            name: binding_name(pattern)
                .unwrap_or_else(|| CompactString::new(ctx.text(pattern.span()))),
            default_value,
            ..Default::default()
        });
    }
    if let Some(rest) = &params.rest {
        out.push(MethodParam {
            name: binding_name(&rest.rest.argument)
                .unwrap_or_else(|| CompactString::new(ctx.text(rest.rest.argument.span()))),
            rest: true,
            ..Default::default()
        });
    }
    out
}

/// A method from a parameter list, enriched by `@param` and `@return` tags.
pub(crate) fn annotated_method(
    ctx: &ScanContext<'_>,
    name: &str,
    formal: &FormalParameters<'_>,
    annotation: Option<Annotation>,
    span: Span,
    is_static: bool,
) -> ScannedMethod {
    let mut method = ScannedMethod::new(name);
    method.params = params(ctx, formal);
    method.is_static = is_static;
    if let Some(annotation) = &annotation {
        method.description = annotation.description_text();
        for tag in annotation.tags_named("param") {
            let Some(tag_name) = &tag.name else { continue };
            if let Some(param) = method.params.iter_mut().find(|p| p.name == *tag_name) {
                param.type_ = tag.type_.clone();
                param.description = tag.description.clone();
            }
        }
        method.return_type = annotation
            .type_of("return")
            .or_else(|| annotation.type_of("returns"))
            .cloned();
    }
    method.privacy = get_or_infer_privacy(name, annotation.as_ref());
    method.annotation = annotation;
    method.range = Some(ctx.range(span));
    method.node = Some(node_id(span));
    method
}

pub(crate) fn method_from_expression(
    ctx: &ScanContext<'_>,
    name: &str,
    value: &Expression<'_>,
    annotation: Option<&Annotation>,
    span: Span,
) -> Option<ScannedMethod> {
    let formal = match value {
        Expression::FunctionExpression(func) => &func.params,
        Expression::ArrowFunctionExpression(arrow) => &arrow.params,
        _ => return None,
    };
    Some(annotated_method(ctx, name, formal, annotation.cloned(), span, false))
}

fn cant_determine_name(ctx: &ScanContext<'_>, entity: &mut ScannedEntity, span: Span) {
    entity.warnings.push(ctx.warning(
        WarningCode::CantDetermineName,
        "cannot determine the name of a computed member",
        span,
    ));
}

/// Where a static configuration member keeps its value.
enum ConfigSource<'s, 'a> {
    Getter(&'s Function<'a>),
    Field(Option<&'s Expression<'a>>),
}

impl<'s, 'a> ConfigSource<'s, 'a> {
    fn value(&self) -> Option<&'s Expression<'a>> {
        match self {
            ConfigSource::Getter(func) => func
                .body
                .as_ref()
                .and_then(|body| returned_expression(&body.statements)),
            ConfigSource::Field(value) => *value,
        }
    }
}

fn is_config_name(name: &str) -> bool {
    matches!(name, "properties" | "observers" | "observedAttributes" | "is")
}

/// Fill an entity's member tables from a class body.
pub(crate) fn extract_class_members(
    ctx: &ScanContext<'_>,
    class: &Class<'_>,
    entity: &mut ScannedEntity,
) -> ScanResult<()> {
    for element in class.body.body.iter() {
        if let ClassElement::MethodDefinition(method) = element {
            if method.kind == MethodDefinitionKind::Constructor {
                constructor_properties(ctx, &method.value, entity)?;
            }
        }
    }

    let setters: FxHashSet<CompactString> = class
        .body
        .body
        .iter()
        .filter_map(|element| match element {
            ClassElement::MethodDefinition(m)
                if m.kind == MethodDefinitionKind::Set && !m.r#static && !m.computed =>
            {
                property_key_name(&m.key)
            }
            _ => None,
        })
        .collect();

    let mut config = Vec::new();

    for element in class.body.body.iter() {
        match element {
            ClassElement::MethodDefinition(method) => {
                if method.kind == MethodDefinitionKind::Constructor {
                    continue;
                }
                let name = match (method.computed, property_key_name(&method.key)) {
                    (false, Some(name)) => name,
                    _ => {
                        cant_determine_name(ctx, entity, method.span);
                        continue;
                    }
                };
                let annotation = ctx.annotation_at(method.span.start);
                if method.r#static {
                    match method.kind {
                        MethodDefinitionKind::Get if is_config_name(&name) => {
                            config.push((name, ConfigSource::Getter(&method.value), method.span));
                        }
                        MethodDefinitionKind::Method => {
                            let m = annotated_method(
                                ctx,
                                &name,
                                &method.value.params,
                                annotation,
                                method.span,
                                true,
                            );
                            merge_into(&mut entity.static_methods, m)?;
                        }
                        _ => {}
                    }
                    continue;
                }
                match method.kind {
                    MethodDefinitionKind::Get | MethodDefinitionKind::Set => {
                        let mut prop = annotated_property(ctx, &name, annotation, method.span);
                        if method.kind == MethodDefinitionKind::Get && !setters.contains(&name) {
                            prop.flags |= PropertyFlags::READ_ONLY;
                        }
                        if method.kind == MethodDefinitionKind::Get && prop.type_.is_none() {
                            prop.type_ = prop
                                .annotation
                                .as_ref()
                                .and_then(|a| a.type_of("return").cloned());
                        }
                        merge_into(&mut entity.properties, prop)?;
                    }
                    _ => {
                        let m = annotated_method(
                            ctx,
                            &name,
                            &method.value.params,
                            annotation,
                            method.span,
                            false,
                        );
                        merge_into(&mut entity.methods, m)?;
                    }
                }
            }
            ClassElement::PropertyDefinition(field) => {
                let name = match (field.computed, property_key_name(&field.key)) {
                    (false, Some(name)) => name,
                    _ => {
                        cant_determine_name(ctx, entity, field.span);
                        continue;
                    }
                };
                if field.r#static {
                    if is_config_name(&name) {
                        config.push((name, ConfigSource::Field(field.value.as_ref()), field.span));
                    }
                    continue;
                }
                let annotation = ctx.annotation_at(field.span.start);
                let mut prop = annotated_property(ctx, &name, annotation, field.span);
                if let Some(value) = &field.value {
                    set_default(ctx, &mut prop, value);
                }
                merge_into(&mut entity.properties, prop)?;
            }
            _ => {}
        }
    }

    for (name, source, span) in config {
        read_config_member(ctx, &name, source.value(), span, entity)?;
    }

    Ok(())
}

fn constructor_properties(
    ctx: &ScanContext<'_>,
    func: &Function<'_>,
    entity: &mut ScannedEntity,
) -> ScanResult<()> {
    let Some(body) = &func.body else {
        return Ok(());
    };
    for stmt in body.statements.iter() {
        let Statement::ExpressionStatement(expr_stmt) = stmt else {
            continue;
        };
        match &expr_stmt.expression {
            Expression::AssignmentExpression(assign) => {
                let oxc_ast::ast::AssignmentTarget::StaticMemberExpression(member) = &assign.left
                else {
                    continue;
                };
                if !matches!(member.object, Expression::ThisExpression(_)) {
                    continue;
                }
                let annotation = ctx.annotation_at(expr_stmt.span.start);
                let mut prop = annotated_property(
                    ctx,
                    member.property.name.as_str(),
                    annotation,
                    expr_stmt.span,
                );
                set_default(ctx, &mut prop, &assign.right);
                merge_into(&mut entity.properties, prop)?;
            }
            Expression::StaticMemberExpression(member)
                if matches!(member.object, Expression::ThisExpression(_)) =>
            {
                let Some(annotation) = ctx.annotation_at(expr_stmt.span.start) else {
                    continue;
                };
                let prop = annotated_property(
                    ctx,
                    member.property.name.as_str(),
                    Some(annotation),
                    expr_stmt.span,
                );
                merge_into(&mut entity.properties, prop)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn read_config_member(
    ctx: &ScanContext<'_>,
    name: &str,
    value: Option<&Expression<'_>>,
    span: Span,
    entity: &mut ScannedEntity,
) -> ScanResult<()> {
    match name {
        "properties" => match value {
            Some(Expression::ObjectExpression(obj)) => read_properties_block(ctx, obj, entity)?,
            _ => entity.warnings.push(ctx.warning(
                WarningCode::InvalidPropertiesBlock,
                "`properties` must be an object literal",
                span,
            )),
        },
        "observers" => match value {
            Some(Expression::ArrayExpression(arr)) => read_observers(ctx, arr, entity),
            _ => entity.warnings.push(ctx.warning(
                WarningCode::InvalidObserversBlock,
                "`observers` must be an array literal",
                span,
            )),
        },
        "observedAttributes" => {
            if let Some(Expression::ArrayExpression(arr)) = value {
                for elem in arr.elements.iter() {
                    let Some(expr) = elem.as_expression() else { continue };
                    if let Some(attr) = string_value(expr) {
                        let mut attribute = ScannedAttribute::new(attr);
                        attribute.range = Some(ctx.range(expr.span()));
                        merge_into(&mut entity.attributes, attribute)?;
                    }
                }
            }
        }
        "is" => {
            if let Some(tag) = value.and_then(string_value) {
                entity.tag_name = Some(CompactString::new(tag));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Read a `properties: {...}` configuration object.
pub(crate) fn read_properties_block(
    ctx: &ScanContext<'_>,
    obj: &ObjectExpression<'_>,
    entity: &mut ScannedEntity,
) -> ScanResult<()> {
    for kind in obj.properties.iter() {
        let ObjectPropertyKind::ObjectProperty(p) = kind else {
            continue;
        };
        let name = match (p.computed, property_key_name(&p.key)) {
            (false, Some(name)) => name,
            _ => {
                cant_determine_name(ctx, entity, p.span);
                continue;
            }
        };
        let annotation = ctx.annotation_at(p.span.start);
        let mut prop = annotated_property(ctx, &name, annotation, p.span);
        prop.flags |= PropertyFlags::PUBLISHED;

        match &p.value {
            Expression::Identifier(id) => match config_type_name(id.name.as_str()) {
                Some(type_name) => {
                    prop.type_.get_or_insert_with(|| CompactString::new(type_name));
                }
                None => entity.warnings.push(ctx.warning(
                    WarningCode::InvalidPropertyConfig,
                    format!("`{}` is not a property type", id.name),
                    p.value.span(),
                )),
            },
            Expression::ObjectExpression(config) => read_property_config(ctx, config, &mut prop),
            other => entity.warnings.push(ctx.warning(
                WarningCode::InvalidPropertyConfig,
                format!("cannot read the configuration of `{name}`"),
                other.span(),
            )),
        }

        merge_into(&mut entity.properties, prop)?;
    }
    Ok(())
}

fn read_property_config(
    ctx: &ScanContext<'_>,
    config: &ObjectExpression<'_>,
    prop: &mut ScannedProperty,
) {
    for kind in config.properties.iter() {
        let ObjectPropertyKind::ObjectProperty(p) = kind else {
            continue;
        };
        let Some(key) = property_key_name(&p.key) else {
            continue;
        };
        let value = &p.value;
        match key.as_str() {
            "type" => {
                if let Expression::Identifier(id) = value {
                    let name = id.name.as_str();
                    prop.type_ = Some(CompactString::new(config_type_name(name).unwrap_or(name)));
                }
            }
            "value" => {
                let shown = if is_function(value) {
                    function_result(value).unwrap_or(value)
                } else {
                    value
                };
                prop.default_value = Some(CompactString::new(ctx.text(shown.span())));
                if prop.type_.is_none() && ctx.options.infer_types {
                    prop.type_ = infer_literal_type(shown).map(CompactString::new);
                }
            }
            "readOnly" => {
                if bool_value(value) == Some(true) {
                    prop.flags |= PropertyFlags::READ_ONLY;
                }
            }
            "notify" => {
                if bool_value(value) == Some(true) {
                    prop.flags |= PropertyFlags::NOTIFY;
                }
            }
            "reflectToAttribute" => {
                if bool_value(value) == Some(true) {
                    prop.flags |= PropertyFlags::REFLECT_TO_ATTRIBUTE;
                }
            }
            "observer" => {
                prop.observer = match string_value(value) {
                    Some(method) => Some(ExpressionRef::method(method)),
                    None => Some(ExpressionRef::method(ctx.text(value.span()))),
                };
            }
            "computed" => {
                if let Some(expr) = string_value(value) {
                    prop.computed = Some(ExpressionRef::parse(expr));
                    prop.flags |= PropertyFlags::READ_ONLY;
                }
            }
            _ => {}
        }
    }
}

/// Read an `observers: [...]` array of call-like strings.
pub(crate) fn read_observers(
    ctx: &ScanContext<'_>,
    arr: &ArrayExpression<'_>,
    entity: &mut ScannedEntity,
) {
    for elem in arr.elements.iter() {
        let Some(expr) = elem.as_expression() else {
            continue;
        };
        match string_value(expr) {
            Some(source) => entity.observers.push(ScannedObserver {
                expression: ExpressionRef::parse(source),
                range: ctx.range(expr.span()),
            }),
            None => entity.warnings.push(ctx.warning(
                WarningCode::InvalidObserversBlock,
                "observers must be string literals",
                expr.span(),
            )),
        }
    }
}

/// Members declared only in the entity's own doc comment.
pub(crate) fn apply_entity_tags(
    ctx: &ScanContext<'_>,
    annotation: &Annotation,
    span: Span,
    entity: &mut ScannedEntity,
) -> ScanResult<()> {
    for tag in annotation.tags.iter() {
        let Some(name) = &tag.name else { continue };
        let description = tag.description.clone().unwrap_or_default();
        match tag.title.as_str() {
            "fires" | "event" => {
                let mut event = ScannedEvent::new(name.clone());
                event.description = description;
                event.range = Some(ctx.range(span));
                merge_into(&mut entity.events, event)?;
            }
            "attr" | "attribute" => {
                let mut attribute = ScannedAttribute::new(name.clone());
                attribute.type_ = tag.type_.clone();
                attribute.description = description;
                attribute.range = Some(ctx.range(span));
                merge_into(&mut entity.attributes, attribute)?;
            }
            "property" | "prop" => {
                let mut prop = ScannedProperty::new(name.clone());
                prop.type_ = tag.type_.clone();
                prop.description = description;
                prop.privacy = get_or_infer_privacy(name, None);
                prop.range = Some(ctx.range(span));
                merge_into(&mut entity.properties, prop)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Fill an entity's member tables from a legacy object literal.
pub(crate) fn extract_object_members(
    ctx: &ScanContext<'_>,
    obj: &ObjectExpression<'_>,
    entity: &mut ScannedEntity,
) -> ScanResult<()> {
    let setters: FxHashSet<CompactString> = obj
        .properties
        .iter()
        .filter_map(|kind| match kind {
            ObjectPropertyKind::ObjectProperty(p) if p.kind == PropertyKind::Set && !p.computed => {
                property_key_name(&p.key)
            }
            _ => None,
        })
        .collect();

    for kind in obj.properties.iter() {
        let ObjectPropertyKind::ObjectProperty(p) = kind else {
            continue;
        };
        let name = match (p.computed, property_key_name(&p.key)) {
            (false, Some(name)) => name,
            _ => {
                cant_determine_name(ctx, entity, p.span);
                continue;
            }
        };
        if RESERVED_OBJECT_KEYS.contains(&name.as_str()) {
            continue;
        }
        match name.as_str() {
            "properties" => {
                match &p.value {
                    Expression::ObjectExpression(block) => read_properties_block(ctx, block, entity)?,
                    other => entity.warnings.push(ctx.warning(
                        WarningCode::InvalidPropertiesBlock,
                        "`properties` must be an object literal",
                        other.span(),
                    )),
                }
                continue;
            }
            "observers" => {
                match &p.value {
                    Expression::ArrayExpression(arr) => read_observers(ctx, arr, entity),
                    other => entity.warnings.push(ctx.warning(
                        WarningCode::InvalidObserversBlock,
                        "`observers` must be an array literal",
                        other.span(),
                    )),
                }
                continue;
            }
            _ => {}
        }

        let annotation = ctx.annotation_at(p.span.start);
        match p.kind {
            PropertyKind::Get | PropertyKind::Set => {
                let mut prop = annotated_property(ctx, &name, annotation, p.span);
                if p.kind == PropertyKind::Get && !setters.contains(&name) {
                    prop.flags |= PropertyFlags::READ_ONLY;
                }
                merge_into(&mut entity.properties, prop)?;
            }
            PropertyKind::Init => {
                match method_from_expression(ctx, &name, &p.value, annotation.as_ref(), p.span) {
                    Some(method) => merge_into(&mut entity.methods, method)?,
                    None => {
                        let mut prop = annotated_property(ctx, &name, annotation, p.span);
                        set_default(ctx, &mut prop, &p.value);
                        merge_into(&mut entity.properties, prop)?;
                    }
                }
            }
        }
    }
    Ok(())
}
