//! Cross-file resolution.
//!
//! Resolving an entity folds its inheritance chain into one set of member
//! tables. The chain is linearized as
//!
//! ```text
//! [ mixins in declaration order, superclass, behaviors in declaration order ]
//! ```
//!
//! and folded left to right, each link already resolved (and folded) on its
//! own. The entity's own declarations go last. A later table overrides an
//! earlier one field by field through the merge algorithm; read-only stays
//! sticky. Attributes and change events are projected from the final property
//! table once, after the fold.
//!
//! Resolution never fails on the analyzed source. A name that resolves
//! nowhere becomes `could-not-resolve-reference`, a reference back into an
//! entity that is still being resolved becomes `cyclic-inheritance`, and a
//! chain longer than the configured maximum becomes `chain-too-deep`. In each
//! case the link is dropped and the fold carries on.

use std::fmt::Write as _;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use vellum_carton::{CompactString, FxIndexMap};
use vellum_relief::{
    EntityKind, Privacy, ReferenceKind, ScannedAttribute, ScannedEntity, ScannedEvent,
    ScannedMethod, ScannedObserver, ScannedProperty, ScannedReference, SourceRange, Warning,
    WarningCode,
};

use crate::analysis::{Dependencies, DocumentSet, FeatureId};
use crate::document::Document;
use crate::error::{MergeError, ResolveError, ResolveResult};
use crate::merge::{merge_into, merge_over, Mergeable};

/// An entity with its chain folded in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntity {
    pub id: FeatureId,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaced_name: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<CompactString>,
    pub privacy: Privacy,
    pub description: CompactString,
    pub range: SourceRange,
    pub is_abstract: bool,
    pub properties: FxIndexMap<CompactString, ScannedProperty>,
    pub methods: FxIndexMap<CompactString, ScannedMethod>,
    pub static_methods: FxIndexMap<CompactString, ScannedMethod>,
    pub attributes: FxIndexMap<CompactString, ScannedAttribute>,
    pub events: FxIndexMap<CompactString, ScannedEvent>,
    /// Observers of the whole chain, farthest first.
    pub observers: Vec<ScannedObserver>,
    /// Every ancestor, nearest first.
    pub chain: Vec<FeatureId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<FeatureId>,
    /// Own warnings, reference warnings and every ancestor's warnings.
    pub warnings: Vec<Warning>,
    /// Version of every document this result read, including every document
    /// searched while looking up its references.
    #[serde(skip)]
    pub dependencies: Dependencies,
    /// Attributes and events declared explicitly somewhere in the chain,
    /// before projection.
    #[serde(skip)]
    declared_attributes: FxIndexMap<CompactString, ScannedAttribute>,
    #[serde(skip)]
    declared_events: FxIndexMap<CompactString, ScannedEvent>,
}

impl ResolvedEntity {
    /// The most specific name available.
    pub fn display_name(&self) -> &str {
        self.namespaced_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<anonymous>")
    }

    /// Short human-readable outline.
    pub fn summary(&self) -> String {
        fn keys<V>(table: &FxIndexMap<CompactString, V>) -> String {
            table.keys().map(CompactString::as_str).collect::<Vec<_>>().join(", ")
        }

        let mut out = String::new();
        let _ = write!(out, "{} {}", self.kind.as_str(), self.display_name());
        if let Some(tag) = &self.tag_name {
            let _ = write!(out, " <{tag}>");
        }
        let _ = writeln!(out, " ({})", self.id);
        if !self.chain.is_empty() {
            let chain: Vec<String> = self.chain.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, "  chain: {}", chain.join(" -> "));
        }
        for (label, list) in [
            ("properties", keys(&self.properties)),
            ("methods", keys(&self.methods)),
            ("static methods", keys(&self.static_methods)),
            ("attributes", keys(&self.attributes)),
            ("events", keys(&self.events)),
        ] {
            if !list.is_empty() {
                let _ = writeln!(out, "  {label}: {list}");
            }
        }
        for warning in &self.warnings {
            let _ = writeln!(out, "  {warning}");
        }
        out
    }
}

/// Every feature of one document, resolved.
#[derive(Debug, Clone)]
pub struct DocumentResolution {
    pub url: CompactString,
    pub version: u64,
    pub entities: Vec<Arc<ResolvedEntity>>,
    /// Document warnings followed by each entity's aggregated warnings.
    pub warnings: Vec<Warning>,
}

/// Memo table for resolved entities, keyed by feature and document version.
///
/// An entry remembers the version of every document it read. A lookup whose
/// dependencies have moved on is a miss and evicts the entry.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<(FeatureId, u64), Arc<ResolvedEntity>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn get<S: DocumentSet + ?Sized>(
        &self,
        id: &FeatureId,
        version: u64,
        set: &S,
    ) -> ResolveResult<Option<Arc<ResolvedEntity>>> {
        let key = (id.clone(), version);
        let Some(entry) = self.entries.get(&key).map(|e| Arc::clone(e.value())) else {
            return Ok(None);
        };
        for (url, version) in &entry.dependencies {
            let current = set.document(url)?.map(|doc| doc.version);
            if current != *version {
                tracing::debug!("evicting {}: {} changed", id, url);
                self.entries.remove(&key);
                return Ok(None);
            }
        }
        Ok(Some(entry))
    }

    fn insert(&self, version: u64, entity: Arc<ResolvedEntity>) {
        self.entries.insert((entity.id.clone(), version), entity);
    }
}

/// A member table entry that records where it was inherited from.
trait Inherited: Mergeable + Clone {
    fn origin(&mut self) -> &mut Option<CompactString>;
}

macro_rules! impl_inherited {
    ($($ty:ty),*) => {
        $(impl Inherited for $ty {
            #[inline]
            fn origin(&mut self) -> &mut Option<CompactString> {
                &mut self.inherited_from
            }
        })*
    };
}

impl_inherited!(ScannedProperty, ScannedMethod, ScannedAttribute, ScannedEvent);

/// Fold an ancestor's table in; members keep the nearest declaring entity.
fn inherit_table<T: Inherited>(
    table: &mut FxIndexMap<CompactString, T>,
    from: &FxIndexMap<CompactString, T>,
    origin: &CompactString,
) -> Result<(), MergeError> {
    for member in from.values() {
        let mut member = member.clone();
        member.origin().get_or_insert_with(|| origin.clone());
        merge_over(table, member)?;
    }
    Ok(())
}

fn own_table<T: Inherited>(
    table: &mut FxIndexMap<CompactString, T>,
    from: &FxIndexMap<CompactString, T>,
) -> Result<(), MergeError> {
    for member in from.values() {
        merge_over(table, member.clone())?;
    }
    Ok(())
}

/// Working tables of one fold.
#[derive(Default)]
struct Tables {
    properties: FxIndexMap<CompactString, ScannedProperty>,
    methods: FxIndexMap<CompactString, ScannedMethod>,
    static_methods: FxIndexMap<CompactString, ScannedMethod>,
    attributes: FxIndexMap<CompactString, ScannedAttribute>,
    events: FxIndexMap<CompactString, ScannedEvent>,
    observers: Vec<ScannedObserver>,
}

impl Tables {
    fn inherit(&mut self, link: &ResolvedEntity) -> Result<(), MergeError> {
        let origin = CompactString::new(link.display_name());
        inherit_table(&mut self.properties, &link.properties, &origin)?;
        inherit_table(&mut self.methods, &link.methods, &origin)?;
        inherit_table(&mut self.static_methods, &link.static_methods, &origin)?;
        inherit_table(&mut self.attributes, &link.declared_attributes, &origin)?;
        inherit_table(&mut self.events, &link.declared_events, &origin)?;
        for observer in &link.observers {
            if !self.observers.contains(observer) {
                self.observers.push(observer.clone());
            }
        }
        Ok(())
    }

    fn own(&mut self, scanned: &ScannedEntity) -> Result<(), MergeError> {
        own_table(&mut self.properties, &scanned.properties)?;
        own_table(&mut self.methods, &scanned.methods)?;
        own_table(&mut self.static_methods, &scanned.static_methods)?;
        own_table(&mut self.attributes, &scanned.attributes)?;
        own_table(&mut self.events, &scanned.events)?;
        self.observers.extend(scanned.observers.iter().cloned());
        Ok(())
    }
}

/// Project attributes and change events out of the final property table.
///
/// Explicit declarations stay `a`, so a hand-written attribute keeps its own
/// description.
fn project(
    properties: &FxIndexMap<CompactString, ScannedProperty>,
    declared_attributes: &FxIndexMap<CompactString, ScannedAttribute>,
    declared_events: &FxIndexMap<CompactString, ScannedEvent>,
) -> Result<
    (
        FxIndexMap<CompactString, ScannedAttribute>,
        FxIndexMap<CompactString, ScannedEvent>,
    ),
    MergeError,
> {
    let mut attributes = declared_attributes.clone();
    let mut events = declared_events.clone();
    for prop in properties.values() {
        let change_event = prop.change_event_name();
        if let Some(name) = prop.attribute_name() {
            let mut attribute = ScannedAttribute::new(name);
            attribute.type_ = prop.type_.clone();
            attribute.description = prop.description.clone();
            attribute.privacy = prop.privacy;
            attribute.change_event = change_event.clone();
            attribute.range = prop.range.clone();
            attribute.inherited_from = prop.inherited_from.clone();
            merge_into(&mut attributes, attribute)?;
        }
        if let Some(name) = change_event {
            let mut event = ScannedEvent::new(name);
            event.description = CompactString::from(format!("Fired when `{}` changes.", prop.name));
            event.range = prop.range.clone();
            event.inherited_from = prop.inherited_from.clone();
            merge_into(&mut events, event)?;
        }
    }
    Ok((attributes, events))
}

/// Ancestors nearest first, each listed once.
fn linearize(links: &[Arc<ResolvedEntity>]) -> Vec<FeatureId> {
    let mut chain: Vec<FeatureId> = Vec::new();
    for link in links.iter().rev() {
        for id in std::iter::once(&link.id).chain(&link.chain) {
            if !chain.contains(id) {
                chain.push(id.clone());
            }
        }
    }
    chain
}

fn reference_warning(code: WarningCode, reference: &ScannedReference, message: String) -> Warning {
    Warning::new(code, message, reference.range.clone())
}

/// One resolved entity plus whether its computation hit a cycle or the depth
/// limit. Such results depend on where the walk started and are not cached.
struct Resolution {
    entity: Arc<ResolvedEntity>,
    tainted: bool,
}

/// Resolves entities against a document set, memoizing into a cache.
pub struct Resolver<'r, S: DocumentSet + ?Sized> {
    set: &'r S,
    cache: &'r ResolutionCache,
    max_chain_depth: usize,
}

impl<'r, S: DocumentSet + ?Sized> Resolver<'r, S> {
    pub fn new(set: &'r S, cache: &'r ResolutionCache) -> Self {
        Self {
            set,
            cache,
            max_chain_depth: set.max_chain_depth(),
        }
    }

    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Resolve one feature.
    pub fn resolve(&self, id: &FeatureId) -> ResolveResult<Arc<ResolvedEntity>> {
        let mut visiting = Vec::new();
        Ok(self.resolve_in(id, &mut visiting)?.entity)
    }

    /// Resolve every feature of a document.
    pub fn resolve_document(&self, url: &str) -> ResolveResult<DocumentResolution> {
        let doc = self
            .set
            .document(url)?
            .ok_or_else(|| ResolveError::MissingDocument(CompactString::new(url)))?;
        let mut entities = Vec::with_capacity(doc.features.len());
        let mut warnings = doc.warnings.clone();
        for index in 0..doc.features.len() {
            let entity = self.resolve(&FeatureId::new(doc.url.clone(), index))?;
            warnings.extend(entity.warnings.iter().cloned());
            entities.push(entity);
        }
        tracing::debug!(
            "resolved {}: {} entities, {} warnings",
            doc.url,
            entities.len(),
            warnings.len()
        );
        Ok(DocumentResolution {
            url: doc.url.clone(),
            version: doc.version,
            entities,
            warnings,
        })
    }

    fn resolve_in(&self, id: &FeatureId, visiting: &mut Vec<FeatureId>) -> ResolveResult<Resolution> {
        let doc = self
            .set
            .document(&id.document)?
            .ok_or_else(|| ResolveError::MissingDocument(id.document.clone()))?;
        let scanned = doc.feature(id.index).ok_or_else(|| ResolveError::MissingFeature {
            document: id.document.clone(),
            index: id.index,
        })?;

        if let Some(entity) = self.cache.get(id, doc.version, self.set)? {
            tracing::debug!("cache hit for {}", id);
            return Ok(Resolution {
                entity,
                tainted: false,
            });
        }
        tracing::debug!("cache miss for {} ({})", id, scanned.display_name());

        visiting.push(id.clone());
        let built = self.build(id, &doc, scanned, visiting);
        visiting.pop();
        let resolution = built?;

        if !resolution.tainted {
            self.cache.insert(doc.version, Arc::clone(&resolution.entity));
        }
        Ok(resolution)
    }

    fn build(
        &self,
        id: &FeatureId,
        doc: &Document,
        scanned: &ScannedEntity,
        visiting: &mut Vec<FeatureId>,
    ) -> ResolveResult<Resolution> {
        let mut tainted = false;
        let mut warnings = scanned.warnings.clone();
        let mut dependencies = Dependencies::default();
        dependencies.insert(doc.url.clone(), Some(doc.version));
        let mut links: Vec<Arc<ResolvedEntity>> = Vec::new();
        let mut superclass = None;

        for reference in scanned.references() {
            let kind = reference.kind.as_str();
            let Some(target) = self.set.resolve_recorded(
                &reference.identifier,
                &doc.url,
                reference.kind,
                &mut dependencies,
            )?
            else {
                tracing::trace!("{}: {} `{}` not found", id, kind, reference.identifier);
                warnings.push(reference_warning(
                    WarningCode::CouldNotResolveReference,
                    reference,
                    format!("could not resolve {} `{}`", kind, reference.identifier),
                ));
                continue;
            };
            if visiting.contains(&target) {
                tracing::trace!("{}: {} `{}` closes a cycle", id, kind, reference.identifier);
                warnings.push(reference_warning(
                    WarningCode::CyclicInheritance,
                    reference,
                    format!(
                        "`{}` inherits from itself through {} `{}`",
                        scanned.display_name(),
                        kind,
                        reference.identifier
                    ),
                ));
                tainted = true;
                continue;
            }
            if visiting.len() >= self.max_chain_depth {
                warnings.push(reference_warning(
                    WarningCode::ChainTooDeep,
                    reference,
                    format!(
                        "inheritance chain is deeper than {} at {} `{}`",
                        self.max_chain_depth, kind, reference.identifier
                    ),
                ));
                tainted = true;
                continue;
            }

            tracing::trace!("{}: {} `{}` -> {}", id, kind, reference.identifier, target);
            let child = self.resolve_in(&target, visiting)?;
            tainted |= child.tainted;
            if reference.kind == ReferenceKind::Superclass {
                superclass = Some(target);
            }
            links.push(child.entity);
        }

        let mut tables = Tables::default();
        for link in &links {
            tables.inherit(link)?;
            warnings.extend(link.warnings.iter().cloned());
            for (url, version) in &link.dependencies {
                dependencies.entry(url.clone()).or_insert(*version);
            }
        }
        tables.own(scanned)?;
        let (attributes, events) = project(&tables.properties, &tables.attributes, &tables.events)?;

        let entity = ResolvedEntity {
            id: id.clone(),
            kind: scanned.kind,
            name: scanned.name.clone(),
            namespaced_name: scanned.namespaced_name.clone(),
            tag_name: scanned.tag_name.clone(),
            privacy: scanned.privacy,
            description: scanned.description.clone(),
            range: scanned.range.clone(),
            is_abstract: scanned.is_abstract,
            properties: tables.properties,
            methods: tables.methods,
            static_methods: tables.static_methods,
            attributes,
            events,
            observers: tables.observers,
            chain: linearize(&links),
            superclass,
            warnings,
            dependencies,
            declared_attributes: tables.attributes,
            declared_events: tables.events,
        };
        Ok(Resolution {
            entity: Arc::new(entity),
            tainted,
        })
    }
}

/// Resolve one feature with a fresh resolver.
pub fn resolve_feature<S: DocumentSet + ?Sized>(
    id: &FeatureId,
    set: &S,
    cache: &ResolutionCache,
) -> ResolveResult<Arc<ResolvedEntity>> {
    Resolver::new(set, cache).resolve(id)
}

/// Resolve every feature of a document with a fresh resolver.
pub fn resolve_document<S: DocumentSet + ?Sized>(
    url: &str,
    set: &S,
    cache: &ResolutionCache,
) -> ResolveResult<DocumentResolution> {
    Resolver::new(set, cache).resolve_document(url)
}
