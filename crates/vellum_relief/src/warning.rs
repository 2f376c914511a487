//! Structured warnings.
//!
//! Nothing the analyzed source does is an error in the engine's sense: an
//! unanalyzable pattern, a dangling name or an inheritance cycle all become a
//! [`Warning`] tied to the range that caused it, and the scan carries on.

use serde::Serialize;
use std::fmt;
use vellum_carton::CompactString;

use crate::SourceRange;

/// Severity level of a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    /// The analyzed source is broken in a way the model cannot paper over.
    Error = 0,
    /// Legal but under-determined; the model may be incomplete.
    Warning = 1,
    /// For awareness only.
    Info = 2,
}

impl Severity {
    /// Get display name.
    #[inline]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Kind of warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningCode {
    // === Parsing ===
    /// The parser reported a syntax error.
    ParseError,

    // === Ambiguity ===
    /// A member key is computed and has no static name.
    CantDetermineName,
    /// A registration call's tag name is not a literal or `Class.is`.
    CouldNotDetermineTagName,
    /// A registration call's class argument is not an identifier or class.
    CouldNotDetermineElement,
    /// `@extends` with no name.
    ClassExtendsAnnotationNoId,
    /// A mixin-tagged declaration that is not a function or forward reference.
    InvalidMixinDeclaration,
    /// A behavior-tagged declaration that is not an object or array literal.
    InvalidBehaviorDeclaration,
    /// `Polymer(...)` called with something other than an object literal.
    InvalidLegacyElement,
    /// A properties getter that does not return an object literal.
    InvalidPropertiesBlock,
    /// A single property configuration that cannot be read.
    InvalidPropertyConfig,
    /// An observers block entry that is not a string literal.
    InvalidObserversBlock,

    // === Dangling references ===
    /// A superclass, mixin or behavior name found nowhere in the document set.
    CouldNotResolveReference,

    // === Structural ===
    /// A reference chain leads back to an entity still being resolved.
    CyclicInheritance,
    /// An acyclic chain longer than the configured maximum.
    ChainTooDeep,
}

impl WarningCode {
    /// Get the warning code (for filtering/configuration).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "parse-error",
            Self::CantDetermineName => "cant-determine-name",
            Self::CouldNotDetermineTagName => "could-not-determine-tag-name",
            Self::CouldNotDetermineElement => "could-not-determine-element",
            Self::ClassExtendsAnnotationNoId => "class-extends-annotation-no-id",
            Self::InvalidMixinDeclaration => "invalid-mixin-declaration",
            Self::InvalidBehaviorDeclaration => "invalid-behavior-declaration",
            Self::InvalidLegacyElement => "invalid-legacy-element",
            Self::InvalidPropertiesBlock => "invalid-properties-block",
            Self::InvalidPropertyConfig => "invalid-property-config",
            Self::InvalidObserversBlock => "invalid-observers-block",
            Self::CouldNotResolveReference => "could-not-resolve-reference",
            Self::CyclicInheritance => "cyclic-inheritance",
            Self::ChainTooDeep => "chain-too-deep",
        }
    }

    /// Severity used when the reporter does not pick one.
    pub const fn default_severity(&self) -> Severity {
        match self {
            Self::ParseError | Self::CyclicInheritance => Severity::Error,
            Self::CantDetermineName => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A warning with location information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub code: WarningCode,
    pub message: CompactString,
    pub severity: Severity,
    pub range: SourceRange,
}

impl Warning {
    /// Create a warning with the code's default severity.
    pub fn new(code: WarningCode, message: impl Into<CompactString>, range: SourceRange) -> Self {
        Self {
            code,
            message: message.into(),
            severity: code.default_severity(),
            range,
        }
    }

    /// Override the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    #[inline]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.range,
            self.severity.display_name(),
            self.code,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourcePosition;

    fn range() -> SourceRange {
        SourceRange::new("el.js", SourcePosition::new(4, 2), SourcePosition::new(4, 9))
    }

    #[test]
    fn test_code_strings_match_serde_names() {
        for code in [
            WarningCode::ParseError,
            WarningCode::CouldNotDetermineTagName,
            WarningCode::CouldNotResolveReference,
            WarningCode::CyclicInheritance,
            WarningCode::InvalidObserversBlock,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_default_severity() {
        let w = Warning::new(WarningCode::CyclicInheritance, "cycle", range());
        assert!(w.is_error());
        let w = Warning::new(WarningCode::CouldNotResolveReference, "missing", range());
        assert!(w.is_warning());
        let w = w.with_severity(Severity::Info);
        assert_eq!(w.severity, Severity::Info);
    }

    #[test]
    fn test_display() {
        let w = Warning::new(WarningCode::CouldNotDetermineTagName, "no tag", range());
        assert_eq!(
            w.to_string(),
            "el.js:5:3: warning [could-not-determine-tag-name] no tag"
        );
    }
}
