//! Scanned entities and their members.
//!
//! A scanner fills these from one document. Nothing here has been looked up
//! across files yet: superclasses, mixins and behaviors are plain
//! [`ScannedReference`]s that the resolver follows later.

use serde::{ser::SerializeStruct, Serialize, Serializer};
use vellum_carton::{bitflags, hyphenate, CompactString, FxIndexMap};

use crate::{Annotation, Privacy, SourceRange, SyntaxNodeId, Warning};

/// Type string used when a member's type cannot be determined.
pub const UNKNOWN_TYPE: &str = "unknown";

bitflags! {
    /// Boolean facts about a property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u8 {
        /// Cannot be assigned from outside.
        const READ_ONLY = 1 << 0;
        /// Declared through the configuration block.
        const PUBLISHED = 1 << 1;
        /// Changes fire `<attribute>-changed`.
        const NOTIFY = 1 << 2;
        /// Value is mirrored onto the attribute.
        const REFLECT_TO_ATTRIBUTE = 1 << 3;
    }
}

impl Serialize for PropertyFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PropertyFlags", 4)?;
        state.serialize_field("readOnly", &self.contains(Self::READ_ONLY))?;
        state.serialize_field("published", &self.contains(Self::PUBLISHED))?;
        state.serialize_field("notify", &self.contains(Self::NOTIFY))?;
        state.serialize_field(
            "reflectToAttribute",
            &self.contains(Self::REFLECT_TO_ATTRIBUTE),
        )?;
        state.end()
    }
}

/// A call-like string such as `_fullName(first, last)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpressionRef {
    pub source: CompactString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<CompactString>,
    pub dependencies: Vec<CompactString>,
}

impl ExpressionRef {
    /// Split `method(dep.a, dep.b)` into a method name and its dependencies.
    ///
    /// A string without parentheses names a method and has no dependencies.
    /// Literal arguments (quoted strings, numbers) are not dependencies.
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        let Some(open) = trimmed.find('(') else {
            return Self {
                source: CompactString::new(trimmed),
                method: (!trimmed.is_empty()).then(|| CompactString::new(trimmed)),
                dependencies: Vec::new(),
            };
        };
        let method = trimmed[..open].trim();
        let close = trimmed.rfind(')').filter(|&c| c > open).unwrap_or(trimmed.len());
        let dependencies = trimmed[open + 1..close]
            .split(',')
            .map(str::trim)
            .filter(|arg| !arg.is_empty())
            .filter(|arg| {
                !arg.starts_with(['\'', '"', '`'])
                    && !arg.starts_with(|c: char| c.is_ascii_digit() || c == '-')
            })
            .map(CompactString::new)
            .collect();
        Self {
            source: CompactString::new(trimmed),
            method: (!method.is_empty()).then(|| CompactString::new(method)),
            dependencies,
        }
    }

    /// Expression naming a single method with no arguments.
    pub fn method(name: impl Into<CompactString>) -> Self {
        let name = name.into();
        Self {
            source: name.clone(),
            method: Some(name),
            dependencies: Vec::new(),
        }
    }
}

/// A property declared or inferred on an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedProperty {
    pub name: CompactString,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CompactString>,
    pub description: CompactString,
    #[serde(skip)]
    pub annotation: Option<Annotation>,
    pub privacy: Privacy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<CompactString>,
    pub flags: PropertyFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observer: Option<ExpressionRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<ExpressionRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_event: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    #[serde(skip)]
    pub node: Option<SyntaxNodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<CompactString>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl ScannedProperty {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(PropertyFlags::READ_ONLY)
    }

    #[inline]
    pub fn is_published(&self) -> bool {
        self.flags.contains(PropertyFlags::PUBLISHED)
    }

    #[inline]
    pub fn notifies(&self) -> bool {
        self.flags.contains(PropertyFlags::NOTIFY)
    }

    /// Type string, with the unknown sentinel when undetermined.
    pub fn type_name(&self) -> &str {
        self.type_.as_deref().unwrap_or(UNKNOWN_TYPE)
    }

    /// Attribute this property projects to, if it is public and published.
    pub fn attribute_name(&self) -> Option<CompactString> {
        (self.privacy == Privacy::Public && self.is_published()).then(|| hyphenate(&self.name))
    }

    /// Change event this property synthesizes, if it notifies.
    pub fn change_event_name(&self) -> Option<CompactString> {
        if !self.notifies() {
            return None;
        }
        if let Some(event) = &self.change_event {
            return Some(event.clone());
        }
        self.attribute_name().map(|attribute| {
            let mut event = attribute;
            event.push_str("-changed");
            event
        })
    }
}

/// A parameter of a method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodParam {
    pub name: CompactString,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<CompactString>,
    pub rest: bool,
}

/// A method or static method.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedMethod {
    pub name: CompactString,
    pub description: CompactString,
    #[serde(skip)]
    pub annotation: Option<Annotation>,
    pub privacy: Privacy,
    pub params: Vec<MethodParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<CompactString>,
    pub is_static: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    #[serde(skip)]
    pub node: Option<SyntaxNodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<CompactString>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl ScannedMethod {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// An attribute, declared explicitly or projected from a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedAttribute {
    pub name: CompactString,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CompactString>,
    pub description: CompactString,
    #[serde(skip)]
    pub annotation: Option<Annotation>,
    pub privacy: Privacy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_event: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    #[serde(skip)]
    pub node: Option<SyntaxNodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<CompactString>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl ScannedAttribute {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// An event the entity may dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedEvent {
    pub name: CompactString,
    pub description: CompactString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<CompactString>,
}

impl ScannedEvent {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A complex observer from an `observers` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedObserver {
    pub expression: ExpressionRef,
    pub range: SourceRange,
}

/// What a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Superclass,
    Mixin,
    Behavior,
}

impl ReferenceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Superclass => "superclass",
            Self::Mixin => "mixin",
            Self::Behavior => "behavior",
        }
    }
}

/// A by-name reference to another entity, resolved lazily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedReference {
    pub kind: ReferenceKind,
    pub identifier: CompactString,
    pub range: SourceRange,
    /// Set when the reference is a plain identifier in the source, as
    /// opposed to a name only known from a doc tag.
    #[serde(skip)]
    pub node: Option<SyntaxNodeId>,
}

impl ScannedReference {
    pub fn new(kind: ReferenceKind, identifier: impl Into<CompactString>, range: SourceRange) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            range,
            node: None,
        }
    }
}

/// What kind of entity the scanners found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Class,
    Element,
    Mixin,
    Behavior,
}

impl EntityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Element => "element",
            Self::Mixin => "mixin",
            Self::Behavior => "behavior",
        }
    }
}

/// A class, element, mixin or behavior found in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedEntity {
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaced_name: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<CompactString>,
    #[serde(skip)]
    pub annotation: Option<Annotation>,
    pub description: CompactString,
    pub privacy: Privacy,
    pub range: SourceRange,
    #[serde(skip)]
    pub node: Option<SyntaxNodeId>,
    /// The class body this entity's members came from. For a mixin it is the
    /// class expression inside the factory.
    #[serde(skip)]
    pub class_node: Option<SyntaxNodeId>,
    pub is_abstract: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<ScannedReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<ScannedReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<ScannedReference>,
    pub properties: FxIndexMap<CompactString, ScannedProperty>,
    pub methods: FxIndexMap<CompactString, ScannedMethod>,
    pub static_methods: FxIndexMap<CompactString, ScannedMethod>,
    pub attributes: FxIndexMap<CompactString, ScannedAttribute>,
    pub events: FxIndexMap<CompactString, ScannedEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub observers: Vec<ScannedObserver>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl ScannedEntity {
    pub fn new(kind: EntityKind, name: Option<CompactString>, range: SourceRange) -> Self {
        Self {
            kind,
            name,
            range,
            ..Default::default()
        }
    }

    /// Check a lookup name against the plain and the namespaced name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name) || self.namespaced_name.as_deref() == Some(name)
    }

    /// The most specific name available.
    pub fn display_name(&self) -> &str {
        self.namespaced_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<anonymous>")
    }

    /// Mixins, superclass and behaviors in declaration order.
    pub fn references(&self) -> impl Iterator<Item = &ScannedReference> {
        self.mixins
            .iter()
            .chain(self.superclass.iter())
            .chain(self.behaviors.iter())
    }
}

/// A `customElements.define(...)` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedRegistration {
    /// `None` when the tag is read off the class itself (`Foo.is`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<CompactString>,
    pub target: RegistrationTarget,
    pub range: SourceRange,
}

/// The class argument of a registration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum RegistrationTarget {
    /// A (possibly dotted) identifier.
    Name(CompactString),
    /// A class expression written inline.
    Node(SyntaxNodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_computed_expression() {
        let expr = ExpressionRef::parse("_fullName(first, user.last, 'x', 3)");
        assert_eq!(expr.method.as_deref(), Some("_fullName"));
        assert_eq!(expr.dependencies, vec!["first", "user.last"]);
    }

    #[test]
    fn test_parse_bare_method() {
        let expr = ExpressionRef::parse(" _changed ");
        assert_eq!(expr.source, "_changed");
        assert_eq!(expr.method.as_deref(), Some("_changed"));
        assert!(expr.dependencies.is_empty());
    }

    #[test]
    fn test_attribute_projection() {
        let mut prop = ScannedProperty::new("fooBar");
        assert_eq!(prop.attribute_name(), None);

        prop.flags |= PropertyFlags::PUBLISHED | PropertyFlags::NOTIFY;
        assert_eq!(prop.attribute_name().as_deref(), Some("foo-bar"));
        assert_eq!(prop.change_event_name().as_deref(), Some("foo-bar-changed"));

        prop.privacy = Privacy::Protected;
        assert_eq!(prop.attribute_name(), None);
        assert_eq!(prop.change_event_name(), None);
    }

    #[test]
    fn test_flags_serialize_as_booleans() {
        let flags = PropertyFlags::READ_ONLY | PropertyFlags::NOTIFY;
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["readOnly"], true);
        assert_eq!(json["published"], false);
        assert_eq!(json["notify"], true);
        assert_eq!(json["reflectToAttribute"], false);
    }

    #[test]
    fn test_entity_name_matching() {
        let mut entity = ScannedEntity::new(
            EntityKind::Class,
            Some(CompactString::new("Foo")),
            SourceRange::default(),
        );
        entity.namespaced_name = Some(CompactString::new("App.Foo"));
        assert!(entity.matches_name("Foo"));
        assert!(entity.matches_name("App.Foo"));
        assert!(!entity.matches_name("Bar"));
        assert_eq!(entity.display_name(), "App.Foo");
        assert_eq!(entity.references().count(), 0);
    }
}
