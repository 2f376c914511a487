//! Member and entity privacy.

use serde::Serialize;

use crate::Annotation;

/// Visibility of an entity or member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Protected,
    Private,
}

impl Privacy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

/// Privacy declared by an explicit tag, if any.
///
/// When several privacy tags are present the first one wins. A merged
/// annotation lists the closer declaration's tags first.
pub fn explicit_privacy(annotation: &Annotation) -> Option<Privacy> {
    annotation.tags.iter().find_map(|t| match t.title.as_str() {
        "public" => Some(Privacy::Public),
        "protected" => Some(Privacy::Protected),
        "private" => Some(Privacy::Private),
        _ => None,
    })
}

/// Privacy from naming convention alone.
///
/// `__name` and `name_` are private, `_name` is protected.
pub fn infer_privacy(name: &str) -> Privacy {
    if name.starts_with("__") || (name.len() > 1 && name.ends_with('_')) {
        Privacy::Private
    } else if name.starts_with('_') {
        Privacy::Protected
    } else {
        Privacy::Public
    }
}

/// Explicit tags first, naming convention otherwise.
pub fn get_or_infer_privacy(name: &str, annotation: Option<&Annotation>) -> Privacy {
    annotation
        .and_then(explicit_privacy)
        .unwrap_or_else(|| infer_privacy(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnnotationTag;

    #[test]
    fn test_infer_from_name() {
        assert_eq!(infer_privacy("foo"), Privacy::Public);
        assert_eq!(infer_privacy("_foo"), Privacy::Protected);
        assert_eq!(infer_privacy("__foo"), Privacy::Private);
        assert_eq!(infer_privacy("foo_"), Privacy::Private);
        assert_eq!(infer_privacy("_"), Privacy::Protected);
    }

    #[test]
    fn test_tag_overrides_name() {
        let annotation = Annotation {
            tags: vec![AnnotationTag::new("public")],
            ..Default::default()
        };
        assert_eq!(
            get_or_infer_privacy("_looksProtected", Some(&annotation)),
            Privacy::Public
        );
        assert_eq!(get_or_infer_privacy("_looksProtected", None), Privacy::Protected);
    }

    #[test]
    fn test_first_privacy_tag_wins() {
        let annotation = Annotation {
            tags: vec![
                AnnotationTag::new("type"),
                AnnotationTag::new("public"),
                AnnotationTag::new("protected"),
            ],
            ..Default::default()
        };
        assert_eq!(explicit_privacy(&annotation), Some(Privacy::Public));
    }
}
