//! Declaration scanners.
//!
//! Each scanner is an independent [`Visitor`] over one parsed document. It
//! owns its own output and never looks at another scanner's state; all
//! coordination happens in [`scan_program`] once every walk has finished:
//!
//! 1. class, mixin, registration, prototype, behavior and legacy walks run
//! 2. classes, mixins and registrations are classified
//! 3. prototype members are folded into the entity they name
//!
//! The first [`ScanError`] from any scanner aborts the document.

mod behavior;
mod class;
mod legacy;
mod mixin;
mod prototype;
mod registration;

pub use behavior::BehaviorFinder;
pub use class::ClassFinder;
pub use legacy::LegacyElementFinder;
pub use mixin::MixinFinder;
pub use prototype::{PrototypeFinder, PrototypeMember, PrototypeMemberKind};
pub use registration::RegistrationFinder;

pub(crate) use class::{apply_declaration_tags, read_heritage};

use oxc_ast::ast::Program;
use oxc_span::Span;
use vellum_carton::CompactString;
use vellum_relief::{
    get_or_infer_privacy, Annotation, EntityKind, ReferenceKind, ScannedEntity,
    ScannedReference, ScannedRegistration, SourceRange, SyntaxNodeId, Warning, WarningCode,
};

use crate::annotation::annotation_at;
use crate::classify::classify;
use crate::document::SourceMapper;
use crate::error::{ScanError, ScanResult};
use crate::helpers::last_segment;
use crate::merge::merge_into;
use crate::options::AnalyzerOptions;
use crate::walker::{walk, Node, NodeKind, Visitor, WalkOutcome, WalkPath};

#[inline]
pub(crate) fn node_id(span: Span) -> SyntaxNodeId {
    SyntaxNodeId::new(span.start, span.end)
}

/// Node kinds a doc comment may sit in front of on behalf of a child.
const ANNOTATION_CARRIERS: [NodeKind; 6] = [
    NodeKind::VariableDeclarator,
    NodeKind::VariableDeclaration,
    NodeKind::AssignmentExpression,
    NodeKind::ExpressionStatement,
    NodeKind::ExportNamedDeclaration,
    NodeKind::ExportDefaultDeclaration,
];

/// Shared, read-only state for every scanner of one script.
pub struct ScanContext<'s> {
    pub source: &'s str,
    pub mapper: SourceMapper<'s>,
    pub options: &'s AnalyzerOptions,
}

impl<'s> ScanContext<'s> {
    pub fn new(source: &'s str, mapper: SourceMapper<'s>, options: &'s AnalyzerOptions) -> Self {
        Self {
            source,
            mapper,
            options,
        }
    }

    #[inline]
    pub fn range(&self, span: Span) -> SourceRange {
        self.mapper.range(span)
    }

    /// Source text under a span; empty when the span is out of bounds.
    #[inline]
    pub fn text(&self, span: Span) -> &'s str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
    }

    #[inline]
    pub fn annotation_at(&self, offset: u32) -> Option<Annotation> {
        annotation_at(self.source, offset)
    }

    /// The doc comment for a node, looking through `export`, `const X =`
    /// and `X.y =` wrappers up to the enclosing statement.
    pub fn node_annotation(&self, node: Node<'_, '_>, path: &WalkPath<'_, '_>) -> Option<Annotation> {
        if let Some(annotation) = self.annotation_at(node.span().start) {
            return Some(annotation);
        }
        for ancestor in path.ancestors() {
            if !ANNOTATION_CARRIERS.contains(&ancestor.kind()) {
                break;
            }
            if let Some(annotation) = self.annotation_at(ancestor.span().start) {
                return Some(annotation);
            }
        }
        None
    }

    pub fn warning(
        &self,
        code: WarningCode,
        message: impl Into<CompactString>,
        span: Span,
    ) -> Warning {
        Warning::new(code, message, self.range(span))
    }

    /// A reference to a name written in the source, global prefix stripped.
    pub fn reference(&self, kind: ReferenceKind, name: &str, span: Span) -> ScannedReference {
        let mut reference =
            ScannedReference::new(kind, self.options.strip_global_prefix(name), self.range(span));
        reference.node = Some(node_id(span));
        reference
    }

    /// A fresh entity with name, namespace, description, privacy and the
    /// abstract flag read off its declaration.
    pub fn entity(
        &self,
        kind: EntityKind,
        dotted_name: Option<&str>,
        annotation: Option<Annotation>,
        span: Span,
    ) -> ScannedEntity {
        let mut entity = ScannedEntity::new(kind, None, self.range(span));
        if let Some(dotted) = dotted_name {
            let dotted = self.options.strip_global_prefix(dotted);
            let name = last_segment(dotted);
            entity.name = Some(CompactString::new(name));
            if dotted.len() != name.len() {
                entity.namespaced_name = Some(CompactString::new(dotted));
            }
        }
        if let Some(annotation) = &annotation {
            if entity.namespaced_name.is_none() {
                let namespace = annotation.tag("memberof").and_then(|tag| tag.name.as_ref());
                if let (Some(namespace), Some(name)) = (namespace, &entity.name) {
                    entity.namespaced_name = Some(CompactString::from(format!("{namespace}.{name}")));
                }
            }
            entity.description = annotation.description_text();
            entity.is_abstract = annotation.has_tag("abstract");
        }
        entity.privacy = get_or_infer_privacy(entity.name.as_deref().unwrap_or_default(), annotation.as_ref());
        entity.node = Some(node_id(span));
        entity.annotation = annotation;
        entity
    }
}

/// What one scanner found in one document.
#[derive(Debug, Default)]
pub struct ScannerOutput {
    pub entities: Vec<ScannedEntity>,
    pub registrations: Vec<ScannedRegistration>,
    pub prototype_members: Vec<PrototypeMember>,
    /// Warnings not owned by any entity.
    pub warnings: Vec<Warning>,
}

/// A visitor that produces a [`ScannerOutput`].
pub trait Scanner<'n, 'a>: Visitor<'n, 'a, Error = ScanError> {
    const NAME: &'static str;

    fn finish(self) -> ScannerOutput;
}

/// Walk a program with one scanner and take its output.
pub fn run<'n, 'a, S: Scanner<'n, 'a>>(program: &'n Program<'a>, mut scanner: S) -> ScanResult<ScannerOutput> {
    match walk(program, &mut scanner)? {
        WalkOutcome::Completed => Ok(scanner.finish()),
        WalkOutcome::Aborted => Err(ScanError::Walk {
            scanner: S::NAME,
            message: CompactString::new("walk aborted before the end of the document"),
        }),
    }
}

/// Features and loose warnings of one script.
#[derive(Debug, Default)]
pub struct ScriptScan {
    pub features: Vec<ScannedEntity>,
    pub warnings: Vec<Warning>,
}

/// Run every enabled scanner over a program and combine the results.
pub fn scan_program(ctx: &ScanContext<'_>, program: &Program<'_>) -> ScanResult<ScriptScan> {
    let classes = run(program, ClassFinder::new(ctx))?;
    let mixins = run(program, MixinFinder::new(ctx))?;
    let registrations = run(program, RegistrationFinder::new(ctx))?;
    let prototypes = if ctx.options.prototype_members {
        run(program, PrototypeFinder::new(ctx))?
    } else {
        ScannerOutput::default()
    };
    let behaviors = if ctx.options.behaviors {
        run(program, BehaviorFinder::new(ctx))?
    } else {
        ScannerOutput::default()
    };
    let legacy = if ctx.options.legacy_elements {
        run(program, LegacyElementFinder::new(ctx))?
    } else {
        ScannerOutput::default()
    };

    let mut warnings = Vec::new();
    for output in [&classes, &mixins, &registrations, &prototypes, &behaviors, &legacy] {
        warnings.extend(output.warnings.iter().cloned());
    }

    let mut classification = classify(classes.entities, mixins.entities, &registrations.registrations);
    warnings.append(&mut classification.warnings);
    let mut features = classification.into_features();
    features.extend(behaviors.entities);
    features.extend(legacy.entities);

    attach_prototype_members(&mut features, prototypes.prototype_members)?;

    Ok(ScriptScan { features, warnings })
}

/// Fold `X.prototype.y` members into the entity named `X`.
fn attach_prototype_members(
    features: &mut [ScannedEntity],
    members: Vec<PrototypeMember>,
) -> ScanResult<()> {
    for PrototypeMember { owner, member } in members {
        let Some(entity) = features.iter_mut().find(|e| e.matches_name(&owner)) else {
            tracing::debug!(
                "dropping prototype member {}.{}: no entity named {}",
                owner,
                member.name(),
                owner
            );
            continue;
        };
        match member {
            PrototypeMemberKind::Property(prop) => merge_into(&mut entity.properties, prop)?,
            PrototypeMemberKind::Method(method) => merge_into(&mut entity.methods, method)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod scanner_tests;
