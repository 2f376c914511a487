//! Merging two partial descriptors of the same member.
//!
//! `merge(a, b)` is asymmetric: wherever both sides carry a
//! value, `a`'s wins. Call sites decide precedence by argument order:
//!
//! - within one entity, the earlier declaration is `a` (constructor before
//!   accessors, accessors before the configuration block)
//! - across an inheritance chain, the closer entity is `a` and the inherited
//!   member is `b`
//!
//! Read-only and the other flags are OR'd, so they never switch off.

use vellum_carton::{CompactString, FxIndexMap};
use vellum_relief::{
    get_or_infer_privacy, Annotation, ScannedAttribute, ScannedEvent, ScannedMethod,
    ScannedProperty,
};

use crate::error::MergeError;

/// A member that can be merged with another declaration of itself.
pub trait Mergeable: Sized {
    fn name(&self) -> &str;

    /// Merge two declarations; `a` wins ties.
    fn merge(a: &Self, b: &Self) -> Result<Self, MergeError>;
}

fn check_names(a: &str, b: &str) -> Result<(), MergeError> {
    if a == b {
        Ok(())
    } else {
        Err(MergeError::NameMismatch {
            left: CompactString::new(a),
            right: CompactString::new(b),
        })
    }
}

/// Prefer the non-empty description, `a`'s if both are non-empty.
fn best_description(a: &CompactString, b: &CompactString) -> CompactString {
    if a.is_empty() {
        b.clone()
    } else {
        a.clone()
    }
}

impl Mergeable for ScannedProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn merge(a: &Self, b: &Self) -> Result<Self, MergeError> {
        check_names(&a.name, &b.name)?;
        let annotation = Annotation::merged(a.annotation.as_ref(), b.annotation.as_ref());
        let privacy = get_or_infer_privacy(&a.name, annotation.as_ref());
        Ok(ScannedProperty {
            name: a.name.clone(),
            type_: a.type_.clone().or_else(|| b.type_.clone()),
            description: best_description(&a.description, &b.description),
            annotation,
            privacy,
            default_value: a.default_value.clone().or_else(|| b.default_value.clone()),
            flags: a.flags | b.flags,
            observer: a.observer.clone().or_else(|| b.observer.clone()),
            computed: a.computed.clone().or_else(|| b.computed.clone()),
            change_event: a.change_event.clone().or_else(|| b.change_event.clone()),
            range: a.range.clone().or_else(|| b.range.clone()),
            node: a.node.or(b.node),
            inherited_from: a.inherited_from.clone(),
            warnings: a.warnings.iter().chain(&b.warnings).cloned().collect(),
        })
    }
}

impl Mergeable for ScannedMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn merge(a: &Self, b: &Self) -> Result<Self, MergeError> {
        check_names(&a.name, &b.name)?;
        let annotation = Annotation::merged(a.annotation.as_ref(), b.annotation.as_ref());
        let privacy = get_or_infer_privacy(&a.name, annotation.as_ref());
        Ok(ScannedMethod {
            name: a.name.clone(),
            description: best_description(&a.description, &b.description),
            annotation,
            privacy,
            params: if a.params.is_empty() {
                b.params.clone()
            } else {
                a.params.clone()
            },
            return_type: a.return_type.clone().or_else(|| b.return_type.clone()),
            is_static: a.is_static || b.is_static,
            range: a.range.clone().or_else(|| b.range.clone()),
            node: a.node.or(b.node),
            inherited_from: a.inherited_from.clone(),
            warnings: a.warnings.iter().chain(&b.warnings).cloned().collect(),
        })
    }
}

impl Mergeable for ScannedAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn merge(a: &Self, b: &Self) -> Result<Self, MergeError> {
        check_names(&a.name, &b.name)?;
        let annotation = Annotation::merged(a.annotation.as_ref(), b.annotation.as_ref());
        let privacy = get_or_infer_privacy(&a.name, annotation.as_ref());
        Ok(ScannedAttribute {
            name: a.name.clone(),
            type_: a.type_.clone().or_else(|| b.type_.clone()),
            description: best_description(&a.description, &b.description),
            annotation,
            privacy,
            change_event: a.change_event.clone().or_else(|| b.change_event.clone()),
            range: a.range.clone().or_else(|| b.range.clone()),
            node: a.node.or(b.node),
            inherited_from: a.inherited_from.clone(),
            warnings: a.warnings.iter().chain(&b.warnings).cloned().collect(),
        })
    }
}

impl Mergeable for ScannedEvent {
    fn name(&self) -> &str {
        &self.name
    }

    fn merge(a: &Self, b: &Self) -> Result<Self, MergeError> {
        check_names(&a.name, &b.name)?;
        Ok(ScannedEvent {
            name: a.name.clone(),
            description: best_description(&a.description, &b.description),
            range: a.range.clone().or_else(|| b.range.clone()),
            inherited_from: a.inherited_from.clone(),
        })
    }
}

/// Merge `a` with `b`.
#[inline]
pub fn merge<T: Mergeable>(a: &T, b: &T) -> Result<T, MergeError> {
    T::merge(a, b)
}

/// Add a member to a table; an existing entry plays `a`.
pub fn merge_into<T: Mergeable>(
    table: &mut FxIndexMap<CompactString, T>,
    incoming: T,
) -> Result<(), MergeError> {
    match table.get_mut(incoming.name()) {
        Some(existing) => {
            *existing = T::merge(existing, &incoming)?;
        }
        None => {
            table.insert(CompactString::new(incoming.name()), incoming);
        }
    }
    Ok(())
}

/// Add a member to a table; the incoming member plays `a`.
pub fn merge_over<T: Mergeable>(
    table: &mut FxIndexMap<CompactString, T>,
    incoming: T,
) -> Result<(), MergeError> {
    match table.get_mut(incoming.name()) {
        Some(existing) => {
            *existing = T::merge(&incoming, existing)?;
        }
        None => {
            table.insert(CompactString::new(incoming.name()), incoming);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_relief::{AnnotationTag, Privacy, PropertyFlags};

    fn prop(name: &str) -> ScannedProperty {
        ScannedProperty::new(name)
    }

    #[test]
    fn test_name_mismatch_is_an_error() {
        let err = merge(&prop("a"), &prop("b")).unwrap_err();
        assert_eq!(
            err,
            MergeError::NameMismatch {
                left: "a".into(),
                right: "b".into()
            }
        );
    }

    #[test]
    fn test_read_only_is_monotonic() {
        for (a_ro, b_ro) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut a = prop("x");
            let mut b = prop("x");
            a.flags.set(PropertyFlags::READ_ONLY, a_ro);
            b.flags.set(PropertyFlags::READ_ONLY, b_ro);
            assert_eq!(merge(&a, &b).unwrap().is_read_only(), a_ro || b_ro);
            assert_eq!(merge(&b, &a).unwrap().is_read_only(), a_ro || b_ro);
        }
    }

    #[test]
    fn test_a_wins_present_values() {
        let mut a = prop("x");
        a.default_value = Some("1".into());
        let mut b = prop("x");
        b.default_value = Some("2".into());
        b.type_ = Some("number".into());
        b.description = "From b.".into();

        let merged = merge(&a, &b).unwrap();
        assert_eq!(merged.default_value.as_deref(), Some("1"));
        assert_eq!(merged.type_.as_deref(), Some("number"));
        assert_eq!(merged.description, "From b.");

        a.description = "From a.".into();
        assert_eq!(merge(&a, &b).unwrap().description, "From a.");
    }

    #[test]
    fn test_privacy_rederived_from_merged_tags() {
        let mut a = prop("_x");
        a.privacy = Privacy::Protected;
        let mut b = prop("_x");
        b.annotation = Some(Annotation {
            tags: vec![AnnotationTag::new("public")],
            ..Default::default()
        });
        b.privacy = Privacy::Public;

        let merged = merge(&a, &b).unwrap();
        assert_eq!(merged.privacy, Privacy::Public);
        assert!(merged.annotation.unwrap().has_tag("public"));
    }

    #[test]
    fn test_merge_into_keeps_existing_as_a() {
        let mut table = FxIndexMap::default();
        let mut first = prop("x");
        first.default_value = Some("ctor".into());
        merge_into(&mut table, first).unwrap();

        let mut second = prop("x");
        second.default_value = Some("config".into());
        second.flags = PropertyFlags::PUBLISHED;
        merge_into(&mut table, second).unwrap();

        merge_into(&mut table, prop("y")).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table["x"].default_value.as_deref(), Some("ctor"));
        assert!(table["x"].is_published());
        assert_eq!(table.keys().map(|k| k.as_str()).collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_merge_over_lets_incoming_win() {
        let mut table = FxIndexMap::default();
        let mut inherited = ScannedMethod::new("m");
        inherited.description = "Inherited.".into();
        inherited.inherited_from = Some("Base".into());
        merge_into(&mut table, inherited).unwrap();

        let mut own = ScannedMethod::new("m");
        own.description = "Own.".into();
        merge_over(&mut table, own).unwrap();

        assert_eq!(table["m"].description, "Own.");
        assert_eq!(table["m"].inherited_from, None);
    }
}
