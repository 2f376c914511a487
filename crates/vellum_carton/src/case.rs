//! Property name to attribute name conversion.

use compact_str::CompactString;

/// Convert camelCase to dash-case.
///
/// Every uppercase ASCII letter becomes a dash followed by its lowercase form.
/// A leading uppercase letter does not produce a leading dash.
///
/// ```
/// use vellum_carton::hyphenate;
///
/// assert_eq!(hyphenate("fooBar"), "foo-bar");
/// assert_eq!(hyphenate("fooBarBaz"), "foo-bar-baz");
/// assert_eq!(hyphenate("foo"), "foo");
/// assert_eq!(hyphenate("URL"), "u-r-l");
/// ```
pub fn hyphenate(s: &str) -> CompactString {
    let mut out = CompactString::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphenate_property_names() {
        assert_eq!(hyphenate("a"), "a");
        assert_eq!(hyphenate("someLongPropertyName"), "some-long-property-name");
    }

    #[test]
    fn test_hyphenate_keeps_digits_and_underscores() {
        assert_eq!(hyphenate("item2Count"), "item2-count");
        assert_eq!(hyphenate("_privateThing"), "_private-thing");
    }
}
