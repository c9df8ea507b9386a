//! The documentation pass: ingest symbol graphs, merge their relationships,
//! build the path hierarchy, and assign canonical references.

use std::collections::BTreeMap;

use crate::diagnostics::DiagnosticCollector;
use crate::graph::{RelationshipKind, SymbolGraph};
use crate::hierarchy::PathHierarchy;
use crate::hierarchy::build::{MemberOfTable, build};
use crate::merger::{MergeOptions, RelationshipMerger, extended_modules};
use crate::resolver::LocalResolver;
use crate::snapshot::{LinkDestinationSummary, LinkResolutionSnapshot};
use crate::symbol::{Symbol, SymbolStore, TopicGraph};
use crate::types::{ResolvedReference, SourceLanguage};

/// Settings for a documentation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Bundle every reference points into.
    pub bundle_id: String,
    /// Keep documentation inherited from other modules.
    pub inherit_docs: bool,
}

/// Everything one pass produced. Immutable once built.
#[derive(Debug)]
pub struct DocumentationContext {
    /// Bundle the references point into.
    bundle_id: String,
    /// Link resolution tree.
    hierarchy: PathHierarchy,
    /// Canonical reference of every symbol, by precise identifier.
    references: BTreeMap<String, ResolvedReference>,
    /// Merged symbols.
    store: SymbolStore,
    /// Curation edges.
    topic_graph: TopicGraph,
}

impl DocumentationContext {
    /// Run a pass over `graphs`. Problems go to `engine`; the pass itself
    /// always completes.
    ///
    /// Swift graphs are ingested first, so a symbol present in several
    /// languages takes its primary language and path from Swift.
    pub fn build(graphs: &[SymbolGraph], options: &ContextOptions, engine: &mut DiagnosticCollector) -> Self {
        let mut ordered: Vec<&SymbolGraph> = graphs.iter().collect();
        ordered.sort_by_key(|graph| return graph.language() != SourceLanguage::Swift);

        let mut store = SymbolStore::new();
        let mut topic_graph = TopicGraph::new();
        for graph in &ordered {
            let module = &graph.module.name;
            store.insert(Symbol::module(module, graph.language()));
            topic_graph.add_node(module);
            for symbol in &graph.symbols {
                store.insert(symbol.to_symbol(module));
                topic_graph.add_node(&symbol.identifier.precise);
            }
        }

        let mut member_of = MemberOfTable::new();
        for graph in &ordered {
            let language = graph.language();
            for edge in graph.relationships.iter().filter(|e| return e.kind == RelationshipKind::MemberOf) {
                member_of
                    .entry((language.clone(), edge.source.clone()))
                    .or_insert_with(|| return edge.target.clone());
            }
        }

        let extended = extended_modules(ordered.iter().flat_map(|graph| return graph.relationships.iter()));
        for graph in &ordered {
            let merge_options = MergeOptions {
                bundle_id: options.bundle_id.clone(),
                inherit_docs: options.inherit_docs,
                module_name: graph.module.name.clone(),
            };
            RelationshipMerger::new(&mut store, &mut topic_graph, &extended, &merge_options).merge_all(
                &graph.relationships,
                &graph.selector(),
                engine,
            );
        }

        let hierarchy = build(&store, &member_of);
        let references = hierarchy
            .canonical_paths()
            .into_iter()
            .map(|(precise_id, path)| {
                let language = store.symbol(&precise_id).map_or(SourceLanguage::Swift, |s| return s.language.clone());
                let reference = ResolvedReference {
                    bundle_id: options.bundle_id.clone(),
                    language,
                    path: format!("/documentation{path}"),
                };
                return (precise_id, reference);
            })
            .collect::<BTreeMap<_, _>>();

        tracing::info!(
            graphs = graphs.len(),
            symbols = store.len(),
            nodes = hierarchy.node_count(),
            problems = engine.len(),
            "built documentation context"
        );

        return Self { bundle_id: options.bundle_id.clone(), hierarchy, references, store, topic_graph };
    }

    /// Bundle the references point into.
    pub fn bundle_id(&self) -> &str {
        return &self.bundle_id;
    }

    /// Link resolution tree.
    pub const fn hierarchy(&self) -> &PathHierarchy {
        return &self.hierarchy;
    }

    /// Summaries of every symbol with a page, ordered by precise identifier.
    pub fn linkable_summaries(&self) -> Vec<LinkDestinationSummary> {
        return self
            .references
            .iter()
            .filter_map(|(precise_id, reference)| {
                let symbol = self.store.symbol(precise_id)?;
                return Some(LinkDestinationSummary {
                    abstract_text: symbol.abstract_text(),
                    declaration: symbol.declaration.clone(),
                    kind: symbol.kind.clone(),
                    language: symbol.language.clone(),
                    precise_id: precise_id.clone(),
                    reference: reference.clone(),
                    title: symbol.title.clone(),
                });
            })
            .collect();
    }

    /// Resolver over this context.
    pub const fn local_resolver(&self) -> LocalResolver<'_> {
        return LocalResolver::new(self);
    }

    /// Canonical reference of a symbol.
    pub fn reference(&self, precise_id: &str) -> Option<&ResolvedReference> {
        return self.references.get(precise_id);
    }

    /// Canonical references of every symbol.
    pub const fn references(&self) -> &BTreeMap<String, ResolvedReference> {
        return &self.references;
    }

    /// Snapshot of the hierarchy for other builds.
    pub fn snapshot(&self) -> LinkResolutionSnapshot {
        return LinkResolutionSnapshot::from_hierarchy(&self.bundle_id, &self.hierarchy);
    }

    /// Merged symbols.
    pub const fn store(&self) -> &SymbolStore {
        return &self.store;
    }

    /// Curation edges.
    pub const fn topic_graph(&self) -> &TopicGraph {
        return &self.topic_graph;
    }
}
