//! Relationship merging: folds typed symbol-graph edges into the symbol model.
//!
//! Each edge is applied on its own. A missing symbol is reported to the
//! collector and the edge is skipped; nothing here fails the pass.

use std::collections::HashMap;

use crate::diagnostics::{DiagnosticCollector, Problem};
use crate::graph::{GraphRelationship, RelationshipKind};
use crate::symbol::{Implementation, Relationship, SymbolId, SymbolStore, TopicGraph};
use crate::types::{ConstraintKind, GenericConstraint, Selector, SourceLanguage, SymbolKind, TopicReference, UnresolvedReference};

/// Settings for one merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Bundle placeholders for unresolved targets point into.
    pub bundle_id: String,
    /// Keep documentation inherited from other modules.
    pub inherit_docs: bool,
    /// Module whose graph is being merged.
    pub module_name: String,
}

/// Applies relationship edges to a symbol store and topic graph.
///
/// Holds both exclusively, so merges of one pass are always sequential.
#[derive(Debug)]
pub struct RelationshipMerger<'m> {
    /// Extended type to the extended-module symbol it is declared in.
    extended_modules: &'m HashMap<String, String>,
    /// Merge settings.
    options: &'m MergeOptions,
    /// Symbols, mutated in place.
    store: &'m mut SymbolStore,
    /// Curation edges for default implementations.
    topic_graph: &'m mut TopicGraph,
}

impl<'m> RelationshipMerger<'m> {
    /// Record `source` conforming to `target`, and the mirror edge on a local
    /// target. Protocols inherit from the protocols they conform to.
    pub fn add_conformance(&mut self, edge: &GraphRelationship, selector: &Selector, engine: &mut DiagnosticCollector) {
        let Some((source_id, source_kind, source_language)) = self.source(edge, engine) else {
            return;
        };
        let target_id = self.store.lookup(&edge.target);
        let Some(target) = self.target_reference(edge, target_id, source_language, engine) else {
            return;
        };
        self.record_fallback(source_id, selector, edge, &target);

        let is_protocol = source_kind == SymbolKind::Protocol;
        let constraints = edge.swift_constraints.clone();
        let forward = if is_protocol {
            Relationship::InheritsFrom { target }
        } else {
            Relationship::ConformsTo { constraints: constraints.clone(), target }
        };
        self.relate(source_id, selector, forward);

        if let Some(target_id) = target_id {
            let source = TopicReference::resolved(&edge.source);
            let mirror = if is_protocol {
                Relationship::InheritedBy { target: source }
            } else {
                Relationship::ConformingType { constraints, target: source }
            };
            self.relate(target_id, selector, mirror);
        }
    }

    /// Record `source` as a default implementation of the `target`
    /// requirement, and curate it under the requirement.
    pub fn add_implementation(&mut self, edge: &GraphRelationship, selector: &Selector, engine: &mut DiagnosticCollector) {
        let Some((source_id, _, source_language)) = self.source(edge, engine) else {
            return;
        };

        let Some(target_id) = self.store.lookup(&edge.target) else {
            let Some(placeholder) = UnresolvedReference::placeholder(&edge.target, source_language, &self.options.bundle_id) else {
                engine.emit(Problem::invalid_relationship_reference(&edge.target));
                return;
            };
            if let (Some(fallback), Some(source)) = (&edge.target_fallback, self.store.get_mut(source_id)) {
                source.default_implementations_mut(selector).target_fallbacks.insert(placeholder.precise_id, fallback.clone());
            }
            tracing::debug!(source = %edge.source, target = %edge.target, "default implementation of an external requirement");
            return;
        };

        let missing: Vec<&String> =
            [&edge.target, &edge.source].into_iter().filter(|endpoint| return !self.topic_graph.contains(endpoint)).collect();
        if !missing.is_empty() {
            for endpoint in missing {
                engine.emit(Problem::symbol_not_found(endpoint));
            }
            return;
        }

        let parent = self
            .store
            .parent_of(source_id)
            .and_then(|id| return self.store.get(id))
            .map(|p| return p.title.clone());
        let implementation = Implementation {
            fallback_name: edge.target_fallback.clone(),
            parent,
            reference: TopicReference::resolved(&edge.source),
        };
        if let Some(requirement) = self.store.get_mut(target_id) {
            let section = requirement.default_implementations_mut(selector);
            if !section.implementations.contains(&implementation) {
                section.implementations.push(implementation);
            }
        }
        self.topic_graph.add_edge(&edge.target, &edge.source);
    }

    /// Record `source` inheriting from `target`, and the mirror edge on a
    /// local target.
    pub fn add_inheritance(&mut self, edge: &GraphRelationship, selector: &Selector, engine: &mut DiagnosticCollector) {
        let Some((source_id, _, source_language)) = self.source(edge, engine) else {
            return;
        };
        let target_id = self.store.lookup(&edge.target);
        let Some(target) = self.target_reference(edge, target_id, source_language, engine) else {
            return;
        };
        self.record_fallback(source_id, selector, edge, &target);
        self.relate(source_id, selector, Relationship::InheritsFrom { target });

        if let Some(target_id) = target_id {
            self.relate(target_id, selector, Relationship::InheritedBy { target: TopicReference::resolved(&edge.source) });
        }
    }

    /// Record where an inherited member came from, and drop documentation it
    /// inherited from another module unless that is allowed.
    pub fn add_inherited_default_implementation(&mut self, edge: &GraphRelationship) {
        if !matches!(edge.kind, RelationshipKind::MemberOf | RelationshipKind::DefaultImplementationOf) {
            return;
        }
        let Some(origin) = &edge.source_origin else {
            return;
        };
        let origin_module = self.store.symbol(&origin.identifier).map(|s| return s.module.clone());
        let Some(symbol) = self.store.lookup(&edge.source).and_then(|id| return self.store.get_mut(id)) else {
            return;
        };

        symbol.origin = Some(origin.clone());
        if origin_module.as_deref() == Some(symbol.module.as_str()) {
            return;
        }
        if !self.options.inherit_docs && symbol.is_doc_comment_from_same_module(&self.options.module_name) == Some(false) {
            tracing::debug!(symbol = %edge.source, origin = %origin.identifier, "dropping inherited documentation");
            symbol.doc_comment = None;
        }
    }

    /// Show which protocol a member of an extension to another module's
    /// protocol belongs to, as a `Self == Protocol` constraint.
    pub fn add_protocol_extension_member_constraint(&mut self, edge: &GraphRelationship) {
        let Some(extended_module) = self.extended_modules.get(&edge.target) else {
            return;
        };
        let Some(protocol) = self.store.symbol(&edge.target).filter(|t| return t.kind == SymbolKind::ExtendedProtocol) else {
            return;
        };
        let protocol_title = protocol.title.clone();
        let Some(module_title) = self.store.symbol(extended_module).map(|m| return m.title.clone()) else {
            return;
        };
        let Some(member) = self.store.lookup(&edge.source).and_then(|id| return self.store.get_mut(id)) else {
            return;
        };

        member.add_swift_extension_constraint(&module_title, SymbolKind::Protocol, GenericConstraint {
            kind: ConstraintKind::SameType,
            lhs: "Self".to_string(),
            rhs: protocol_title,
        });
    }

    /// Mark `source` as a required or optional protocol requirement.
    pub fn add_requirement(&mut self, edge: &GraphRelationship, required: bool, engine: &mut DiagnosticCollector) {
        let Some(symbol) = self.store.lookup(&edge.source).and_then(|id| return self.store.get_mut(id)) else {
            engine.emit(Problem::symbol_not_found(&edge.source));
            return;
        };
        symbol.is_required = required;
    }

    /// Apply one edge under `selector`.
    pub fn merge(&mut self, edge: &GraphRelationship, selector: &Selector, engine: &mut DiagnosticCollector) {
        match edge.kind {
            RelationshipKind::ConformsTo => self.add_conformance(edge, selector, engine),
            RelationshipKind::DefaultImplementationOf => self.add_implementation(edge, selector, engine),
            RelationshipKind::InheritsFrom => self.add_inheritance(edge, selector, engine),
            RelationshipKind::MemberOf => self.add_protocol_extension_member_constraint(edge),
            RelationshipKind::OptionalRequirementOf => self.add_requirement(edge, false, engine),
            RelationshipKind::RequirementOf => self.add_requirement(edge, true, engine),
            RelationshipKind::DeclaredIn | RelationshipKind::ExtensionTo | RelationshipKind::Other | RelationshipKind::Overrides => {
                tracing::trace!(kind = ?edge.kind, source = %edge.source, "relationship not merged");
            },
        }
    }

    /// Apply every edge of one graph, then record inherited origins.
    pub fn merge_all(&mut self, relationships: &[GraphRelationship], selector: &Selector, engine: &mut DiagnosticCollector) {
        let before = engine.len();
        for edge in relationships {
            self.merge(edge, selector, engine);
        }
        for edge in relationships {
            self.add_inherited_default_implementation(edge);
        }
        tracing::debug!(
            selector = %selector,
            edges = relationships.len(),
            problems = engine.len().saturating_sub(before),
            "merged relationships"
        );
    }

    /// Merge into `store` and `topic_graph`.
    pub const fn new(
        store: &'m mut SymbolStore,
        topic_graph: &'m mut TopicGraph,
        extended_modules: &'m HashMap<String, String>,
        options: &'m MergeOptions,
    ) -> Self {
        return Self { extended_modules, options, store, topic_graph };
    }

    /// Keep the display name of an unresolved target on the source's section.
    fn record_fallback(&mut self, source_id: SymbolId, selector: &Selector, edge: &GraphRelationship, target: &TopicReference) {
        let (TopicReference::Unresolved(placeholder), Some(fallback)) = (target, &edge.target_fallback) else {
            return;
        };
        if let Some(source) = self.store.get_mut(source_id) {
            source.relationships_mut(selector).target_fallbacks.insert(placeholder.precise_id.clone(), fallback.clone());
        }
    }

    /// Add a relationship to a symbol's section for `selector`.
    fn relate(&mut self, id: SymbolId, selector: &Selector, relationship: Relationship) {
        if let Some(symbol) = self.store.get_mut(id) {
            symbol.relationships_mut(selector).add(relationship);
        }
    }

    /// Handle, kind, and language of an edge's source, reporting a missing one.
    fn source(&self, edge: &GraphRelationship, engine: &mut DiagnosticCollector) -> Option<(SymbolId, SymbolKind, SourceLanguage)> {
        let found = self
            .store
            .lookup(&edge.source)
            .and_then(|id| return self.store.get(id).map(|s| return (id, s.kind.clone(), s.language.clone())));
        if found.is_none() {
            tracing::debug!(kind = ?edge.kind, source = %edge.source, "relationship source not found");
            engine.emit(Problem::symbol_not_found(&edge.source));
        }
        return found;
    }

    /// Reference to an edge's target: the local symbol, or a placeholder in
    /// the source's language. `None` after reporting a target that can't form
    /// a placeholder.
    fn target_reference(
        &self,
        edge: &GraphRelationship,
        target_id: Option<SymbolId>,
        source_language: SourceLanguage,
        engine: &mut DiagnosticCollector,
    ) -> Option<TopicReference> {
        if target_id.is_some() {
            return Some(TopicReference::resolved(&edge.target));
        }
        let language = self.store.symbol(&edge.target).map_or(source_language, |t| return t.language.clone());
        let placeholder = UnresolvedReference::placeholder(&edge.target, language, &self.options.bundle_id);
        if placeholder.is_none() {
            engine.emit(Problem::invalid_relationship_reference(&edge.target));
        }
        return placeholder.map(TopicReference::Unresolved);
    }
}

/// Extended type to extended-module symbol, from `declaredIn` edges.
pub fn extended_modules<'r>(relationships: impl IntoIterator<Item = &'r GraphRelationship>) -> HashMap<String, String> {
    return relationships
        .into_iter()
        .filter(|edge| return edge.kind == RelationshipKind::DeclaredIn)
        .map(|edge| return (edge.source.clone(), edge.target.clone()))
        .collect();
}
