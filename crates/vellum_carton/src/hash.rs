//! Fast hashing utilities using xxHash3.
//!
//! Document versions are content hashes, so an unchanged file keeps its
//! version across rescans and any edit produces a new one.

use xxhash_rust::xxh3::xxh3_64;

/// Compute a 64-bit hash of the given string using xxHash3.
#[inline]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

/// Version stamp for a document's source text.
#[inline]
pub fn content_version(source: &str) -> u64 {
    hash_str(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_stable() {
        let source = "class Foo {}";
        assert_eq!(content_version(source), content_version(source));
    }

    #[test]
    fn test_version_changes_with_content() {
        assert_ne!(
            content_version("class Foo {}"),
            content_version("class Foo { }")
        );
    }
}
