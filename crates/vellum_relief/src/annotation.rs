//! Parsed documentation comments.

use serde::Serialize;
use vellum_carton::CompactString;

/// One `@tag {type} name description` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationTag {
    pub title: CompactString,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<CompactString>,
}

impl AnnotationTag {
    pub fn new(title: impl Into<CompactString>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A documentation comment: free description followed by ordered tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub description: CompactString,
    pub tags: Vec<AnnotationTag>,
}

const DESCRIPTION_TAGS: [&str; 3] = ["description", "desc", "summary"];
const PRIVACY_TAGS: [&str; 3] = ["public", "protected", "private"];

impl Annotation {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.tags.is_empty()
    }

    /// Check whether a tag with this title is present.
    #[inline]
    pub fn has_tag(&self, title: &str) -> bool {
        self.tags.iter().any(|t| t.title == title)
    }

    /// First tag with this title.
    #[inline]
    pub fn tag(&self, title: &str) -> Option<&AnnotationTag> {
        self.tags.iter().find(|t| t.title == title)
    }

    /// All tags with this title, in comment order.
    pub fn tags_named<'s>(&'s self, title: &'s str) -> impl Iterator<Item = &'s AnnotationTag> {
        self.tags.iter().filter(move |t| t.title == title)
    }

    /// Declared type from the first tag of `title` carrying one.
    pub fn type_of<'s>(&'s self, title: &'s str) -> Option<&'s CompactString> {
        self.tags_named(title).find_map(|t| t.type_.as_ref())
    }

    /// Best human description.
    ///
    /// The free description if present; otherwise the first explicit
    /// description tag; otherwise text trailing a privacy tag, as in
    /// `/** @public The x. */`.
    pub fn description_text(&self) -> CompactString {
        if !self.description.is_empty() {
            return self.description.clone();
        }
        for title in DESCRIPTION_TAGS {
            if let Some(text) = self.tag(title).and_then(|t| t.description.as_ref()) {
                return text.clone();
            }
        }
        self.tags
            .iter()
            .filter(|t| PRIVACY_TAGS.contains(&t.title.as_str()))
            .find_map(|t| t.description.clone())
            .unwrap_or_default()
    }

    /// Combine two annotations of the same member.
    ///
    /// The description is the first non-empty one. Tags are concatenated,
    /// `a`'s first, and a `b` tag identical to one already present is
    /// dropped, so folding a chain does not repeat ancestor tags.
    pub fn merged(a: Option<&Annotation>, b: Option<&Annotation>) -> Option<Annotation> {
        match (a, b) {
            (None, None) => None,
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (Some(a), Some(b)) => {
                let description = if a.description.is_empty() {
                    b.description.clone()
                } else {
                    a.description.clone()
                };
                let mut tags = Vec::with_capacity(a.tags.len() + b.tags.len());
                tags.extend(a.tags.iter().cloned());
                for tag in &b.tags {
                    if !tags.contains(tag) {
                        tags.push(tag.clone());
                    }
                }
                Some(Annotation { description, tags })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(title: &str, description: Option<&str>) -> AnnotationTag {
        AnnotationTag {
            description: description.map(CompactString::new),
            ..AnnotationTag::new(title)
        }
    }

    #[test]
    fn test_description_falls_back_to_privacy_tag() {
        let annotation = Annotation {
            description: CompactString::default(),
            tags: vec![tag("public", Some("The x."))],
        };
        assert_eq!(annotation.description_text(), "The x.");
    }

    #[test]
    fn test_description_prefers_free_text() {
        let annotation = Annotation {
            description: CompactString::new("Main."),
            tags: vec![tag("description", Some("Other."))],
        };
        assert_eq!(annotation.description_text(), "Main.");
    }

    #[test]
    fn test_merged_concatenates_tags() {
        let a = Annotation {
            description: CompactString::default(),
            tags: vec![tag("type", None)],
        };
        let b = Annotation {
            description: CompactString::new("From b."),
            tags: vec![tag("private", None)],
        };
        let merged = Annotation::merged(Some(&a), Some(&b)).unwrap();
        assert_eq!(merged.description, "From b.");
        assert_eq!(merged.tags.len(), 2);
        assert_eq!(merged.tags[0].title, "type");
        assert!(merged.has_tag("private"));
    }

    #[test]
    fn test_merged_drops_repeated_tags() {
        let base = Annotation {
            description: CompactString::default(),
            tags: vec![tag("protected", None), tag("type", None)],
        };
        let own = Annotation {
            description: CompactString::default(),
            tags: vec![tag("public", None), tag("type", None)],
        };
        let once = Annotation::merged(Some(&own), Some(&base)).unwrap();
        let twice = Annotation::merged(Some(&once), Some(&base)).unwrap();
        assert_eq!(once, twice);
        let titles: Vec<&str> = twice.tags.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["public", "type", "protected"]);
    }
}
