//! Feature classification.
//!
//! Splits a document's classes into elements, mixins and plain classes:
//!
//! 1. a class whose body belongs to a mixin factory is dropped
//! 2. a class is an element if a registration call names it, trying the
//!    call's inline class node, then its identifier, then, with no call at
//!    all, a `@customElement` / `@polymerElement` tag
//! 3. everything else stays a plain class
//!
//! Inheritance never makes an element: extending a known element base
//! without a registration or a tag leaves the class plain. A registration
//! that names no class of the document yields `could-not-determine-element`.

use vellum_carton::{CompactString, FxHashSet};
use vellum_relief::{
    EntityKind, RegistrationTarget, ScannedEntity, ScannedRegistration, SyntaxNodeId, Warning,
    WarningCode,
};

/// Tags that register a class with no call evidence.
const ELEMENT_TAGS: [&str; 2] = ["customElement", "polymerElement"];

/// Disjoint partitions of one document's classes and mixins.
#[derive(Debug, Default)]
pub struct Classification {
    pub elements: Vec<ScannedEntity>,
    pub mixins: Vec<ScannedEntity>,
    pub classes: Vec<ScannedEntity>,
    /// Registrations that matched no class.
    pub warnings: Vec<Warning>,
}

impl Classification {
    /// Elements, then mixins, then plain classes.
    pub fn into_features(self) -> Vec<ScannedEntity> {
        let mut features = self.elements;
        features.extend(self.mixins);
        features.extend(self.classes);
        features
    }
}

/// How a class got matched to its registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Evidence<'r> {
    Call(&'r ScannedRegistration),
    Tag,
}

fn registers(registration: &ScannedRegistration, class: &ScannedEntity) -> bool {
    match &registration.target {
        RegistrationTarget::Node(node) => class.class_node == Some(*node),
        RegistrationTarget::Name(name) => class.matches_name(name),
    }
}

fn unmatched_warning(registration: &ScannedRegistration) -> Warning {
    let tag = registration.tag_name.as_deref().unwrap_or("?");
    let message = match &registration.target {
        RegistrationTarget::Name(name) => {
            format!("`<{tag}>` registers `{name}`, which is not a class declared here")
        }
        RegistrationTarget::Node(_) => format!("`<{tag}>` registers a class that was not scanned"),
    };
    Warning::new(
        WarningCode::CouldNotDetermineElement,
        message,
        registration.range.clone(),
    )
}

fn find_registration<'r>(
    class: &ScannedEntity,
    registrations: &'r [ScannedRegistration],
) -> Option<Evidence<'r>> {
    if let Some(node) = class.class_node {
        let by_node = registrations
            .iter()
            .find(|r| r.target == RegistrationTarget::Node(node));
        if let Some(registration) = by_node {
            return Some(Evidence::Call(registration));
        }
    }

    let by_name = registrations.iter().find(|r| match &r.target {
        RegistrationTarget::Name(name) => class.matches_name(name),
        RegistrationTarget::Node(_) => false,
    });
    if let Some(registration) = by_name {
        return Some(Evidence::Call(registration));
    }

    let tagged = class
        .annotation
        .as_ref()
        .is_some_and(|a| ELEMENT_TAGS.iter().any(|tag| a.has_tag(tag)));
    tagged.then_some(Evidence::Tag)
}

/// Tag name written on an element tag, `@customElement my-el`.
fn tag_from_annotation(class: &ScannedEntity) -> Option<CompactString> {
    let annotation = class.annotation.as_ref()?;
    ELEMENT_TAGS
        .iter()
        .filter_map(|title| annotation.tag(title))
        .filter_map(|tag| tag.description.as_deref())
        .filter_map(|text| text.split_whitespace().next())
        .find(|word| word.contains('-'))
        .map(CompactString::new)
}

/// Partition scanned classes and mixins using the document's registrations.
pub fn classify(
    classes: Vec<ScannedEntity>,
    mixins: Vec<ScannedEntity>,
    registrations: &[ScannedRegistration],
) -> Classification {
    let mixin_bodies: FxHashSet<SyntaxNodeId> =
        mixins.iter().filter_map(|m| m.class_node).collect();

    let mut out = Classification {
        mixins: mixins
            .into_iter()
            .map(|mut mixin| {
                mixin.kind = EntityKind::Mixin;
                mixin
            })
            .collect(),
        ..Default::default()
    };

    for mut class in classes {
        if class.class_node.is_some_and(|node| mixin_bodies.contains(&node)) {
            continue;
        }
        match find_registration(&class, registrations) {
            Some(evidence) => {
                let registered_tag = match evidence {
                    Evidence::Call(registration) => registration.tag_name.clone(),
                    Evidence::Tag => None,
                };
                class.kind = EntityKind::Element;
                class.tag_name = registered_tag
                    .or_else(|| class.tag_name.take())
                    .or_else(|| tag_from_annotation(&class));
                out.elements.push(class);
            }
            None => {
                class.kind = EntityKind::Class;
                out.classes.push(class);
            }
        }
    }

    out.warnings = registrations
        .iter()
        .filter(|r| !out.elements.iter().any(|e| registers(r, e)))
        .map(unmatched_warning)
        .collect();

    tracing::debug!(
        "classified {} elements, {} mixins, {} classes ({} unmatched registrations)",
        out.elements.len(),
        out.mixins.len(),
        out.classes.len(),
        out.warnings.len()
    );
    out
}
