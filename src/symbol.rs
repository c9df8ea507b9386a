//! Symbol model: documented entities, their merged relationships, and the
//! arena that owns them.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{GenericConstraint, Selector, SourceLanguage, SymbolKind, TopicReference};

/// Documentation comment attached to a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocComment {
    /// Comment text, one entry per source line.
    pub lines: Vec<String>,
    /// Module the comment was written in, when the graph records it.
    pub module: Option<String>,
}

/// Default implementations of a protocol requirement, for one selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultImplementationsSection {
    /// Implementations contributed by protocol extensions.
    pub implementations: Vec<Implementation>,
    /// Display names for requirements that aren't in this model, by precise identifier.
    pub target_fallbacks: BTreeMap<String, String>,
}

/// One default implementation of a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Implementation {
    /// Name of the requirement as the symbol graph spelled it.
    pub fallback_name: Option<String>,
    /// Title of the symbol that encloses the implementation.
    pub parent: Option<String>,
    /// The implementing symbol.
    pub reference: TopicReference,
}

/// A typed edge stored on one side of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Relationship {
    /// Mirror of `ConformsTo`, stored on the protocol.
    ConformingType {
        /// Conditions under which the conformance holds.
        constraints: Vec<GenericConstraint>,
        /// The conforming type.
        target: TopicReference,
    },
    /// The owner conforms to `target`.
    ConformsTo {
        /// Conditions under which the conformance holds.
        constraints: Vec<GenericConstraint>,
        /// The protocol conformed to.
        target: TopicReference,
    },
    /// Mirror of `InheritsFrom`, stored on the superclass or base protocol.
    InheritedBy {
        /// The inheriting symbol.
        target: TopicReference,
    },
    /// The owner inherits from `target`.
    InheritsFrom {
        /// The superclass or base protocol.
        target: TopicReference,
    },
}

/// Relationships of one symbol, for one selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipsSection {
    /// Edges in the order they were merged.
    pub relationships: Vec<Relationship>,
    /// Display names for targets that aren't in this model, by precise identifier.
    pub target_fallbacks: BTreeMap<String, String>,
}

impl RelationshipsSection {
    /// Append an edge unless an identical one is already present.
    pub fn add(&mut self, relationship: Relationship) {
        if !self.relationships.contains(&relationship) {
            self.relationships.push(relationship);
        }
    }
}

/// Where an inherited member originally came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOrigin {
    /// Display name of the original declaration.
    pub display_name: String,
    /// Precise identifier of the original declaration.
    pub identifier: String,
}

/// Extension information for members declared in an extension to a type from
/// another module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftExtension {
    /// Constraints of the extension's `where` clause.
    pub constraints: Vec<GenericConstraint>,
    /// Kind of the extended type.
    pub extended_kind: SymbolKind,
    /// Module that declares the extended type.
    pub extended_module: String,
}

/// One documented entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    /// Plain-text declaration, used as a disambiguation hint.
    pub declaration: Option<String>,
    /// Default implementations of this requirement, per selector.
    pub default_implementations: BTreeMap<Selector, DefaultImplementationsSection>,
    /// Documentation comment, if any.
    pub doc_comment: Option<DocComment>,
    /// Whether this is a required protocol member.
    pub is_required: bool,
    /// Kind in the primary language.
    pub kind: SymbolKind,
    /// Primary interface language.
    pub language: SourceLanguage,
    /// Module the symbol belongs to.
    pub module: String,
    /// Path components below the module, per language spelling.
    pub names: BTreeMap<SourceLanguage, Vec<String>>,
    /// Original declaration this symbol was inherited from.
    pub origin: Option<SourceOrigin>,
    /// Stable identifier, unique within the module.
    pub precise_id: String,
    /// Merged relationships, per selector.
    pub relationships: BTreeMap<Selector, RelationshipsSection>,
    /// Extension information, when declared in an extension of a foreign type.
    pub swift_extension: Option<SwiftExtension>,
    /// Display title.
    pub title: String,
}

impl Symbol {
    /// A module's own symbol. Its precise identifier is the module name.
    pub fn module(name: &str, language: SourceLanguage) -> Self {
        let mut names = BTreeMap::new();
        names.insert(language.clone(), Vec::new());
        return Self {
            declaration: None,
            default_implementations: BTreeMap::new(),
            doc_comment: None,
            is_required: false,
            kind: SymbolKind::Module,
            language,
            module: name.to_string(),
            names,
            origin: None,
            precise_id: name.to_string(),
            relationships: BTreeMap::new(),
            swift_extension: None,
            title: name.to_string(),
        };
    }

    /// First paragraph of the documentation comment.
    pub fn abstract_text(&self) -> Option<String> {
        let comment = self.doc_comment.as_ref()?;
        let paragraph: Vec<&str> = comment
            .lines
            .iter()
            .map(|line| return line.trim())
            .skip_while(|line| return line.is_empty())
            .take_while(|line| return !line.is_empty())
            .collect();
        if paragraph.is_empty() {
            return None;
        }
        return Some(paragraph.join(" "));
    }

    /// Record a generic constraint contributed by an extension to a type from
    /// `extended_module`.
    pub fn add_swift_extension_constraint(
        &mut self,
        extended_module: &str,
        extended_kind: SymbolKind,
        constraint: GenericConstraint,
    ) {
        let extension = self.swift_extension.get_or_insert_with(|| {
            return SwiftExtension {
                constraints: Vec::new(),
                extended_kind,
                extended_module: extended_module.to_string(),
            };
        });
        if !extension.constraints.contains(&constraint) {
            extension.constraints.push(constraint);
        }
    }

    /// Mutable default-implementations section for `selector`, created on demand.
    pub fn default_implementations_mut(&mut self, selector: &Selector) -> &mut DefaultImplementationsSection {
        return self.default_implementations.entry(selector.clone()).or_default();
    }

    /// Text shown next to this symbol in disambiguation solutions.
    pub fn hint(&self) -> &str {
        return self.declaration.as_deref().unwrap_or(&self.title);
    }

    /// Whether the doc comment was written in `module_name`.
    ///
    /// `None` when there is no comment to judge. A comment whose graph
    /// doesn't record a module is treated as written in place.
    pub fn is_doc_comment_from_same_module(&self, module_name: &str) -> Option<bool> {
        let comment = self.doc_comment.as_ref().filter(|c| return !c.lines.is_empty())?;
        return Some(comment.module.as_deref().is_none_or(|module| return module == module_name));
    }

    /// Path components in the primary language.
    pub fn path_components(&self) -> &[String] {
        return self.names.get(&self.language).map_or(&[], Vec::as_slice);
    }

    /// Mutable relationships section for `selector`, created on demand.
    pub fn relationships_mut(&mut self, selector: &Selector) -> &mut RelationshipsSection {
        return self.relationships.entry(selector.clone()).or_default();
    }
}

/// Handle to a symbol in a [`SymbolStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(usize);

/// Arena of all symbols in a pass, indexed by precise identifier.
#[derive(Debug, Default)]
pub struct SymbolStore {
    /// Symbols by module and primary path, for locating enclosing symbols.
    by_path: HashMap<(String, Vec<String>), SymbolId>,
    /// Symbols by precise identifier.
    index: HashMap<String, SymbolId>,
    /// Arena storage.
    symbols: Vec<Symbol>,
}

impl SymbolStore {
    /// Empty store.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Symbol by handle.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        return self.symbols.get(id.0);
    }

    /// Mutable symbol by handle.
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        return self.symbols.get_mut(id.0);
    }

    /// Add a symbol, or merge its spellings into the one already stored under
    /// the same precise identifier. The first insertion decides the primary
    /// language.
    pub fn insert(&mut self, symbol: Symbol) -> SymbolId {
        if let Some(&existing) = self.index.get(&symbol.precise_id) {
            if let Some(stored) = self.symbols.get_mut(existing.0) {
                for (language, path) in symbol.names {
                    stored.names.entry(language).or_insert(path);
                }
            }
            return existing;
        }

        let id = SymbolId(self.symbols.len());
        self.index.insert(symbol.precise_id.clone(), id);
        self.by_path
            .entry((symbol.module.clone(), symbol.path_components().to_vec()))
            .or_insert(id);
        self.symbols.push(symbol);
        return id;
    }

    /// Whether the store holds no symbols.
    pub fn is_empty(&self) -> bool {
        return self.symbols.is_empty();
    }

    /// All symbols, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        return self.symbols.iter().enumerate().map(|(index, symbol)| return (SymbolId(index), symbol));
    }

    /// Number of stored symbols.
    pub fn len(&self) -> usize {
        return self.symbols.len();
    }

    /// Handle for a precise identifier.
    pub fn lookup(&self, precise_id: &str) -> Option<SymbolId> {
        return self.index.get(precise_id).copied();
    }

    /// The symbol whose primary path is this symbol's path minus its last
    /// component. Top-level symbols resolve to their module.
    pub fn parent_of(&self, id: SymbolId) -> Option<SymbolId> {
        let symbol = self.get(id)?;
        let (_, prefix) = symbol.path_components().split_last()?;
        return self.by_path.get(&(symbol.module.clone(), prefix.to_vec())).copied();
    }

    /// Symbol by precise identifier.
    pub fn symbol(&self, precise_id: &str) -> Option<&Symbol> {
        return self.lookup(precise_id).and_then(|id| return self.get(id));
    }
}

/// Curation graph: which pages appear under which.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct TopicGraph {
    /// Containment edges, parent to children.
    edges: BTreeMap<String, BTreeSet<String>>,
    /// Every page that can take part in an edge.
    nodes: BTreeSet<String>,
}

impl TopicGraph {
    /// Empty graph.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Add a containment edge. Both ends must already be nodes; returns
    /// whether the edge was added.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        self.edges.entry(from.to_string()).or_default().insert(to.to_string());
        return true;
    }

    /// Register a page.
    pub fn add_node(&mut self, precise_id: &str) {
        self.nodes.insert(precise_id.to_string());
    }

    /// Children of a page.
    pub fn children(&self, precise_id: &str) -> impl Iterator<Item = &str> {
        return self.edges.get(precise_id).into_iter().flatten().map(String::as_str);
    }

    /// Whether a page is registered.
    pub fn contains(&self, precise_id: &str) -> bool {
        return self.nodes.contains(precise_id);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{DocComment, Symbol, SymbolStore, TopicGraph};
    use crate::types::{ConstraintKind, GenericConstraint, SourceLanguage, SymbolKind};

    fn symbol(id: &str, path: &[&str]) -> Symbol {
        let mut names = BTreeMap::new();
        names.insert(SourceLanguage::Swift, path.iter().map(|c| c.to_string()).collect());
        Symbol {
            declaration: None,
            default_implementations: BTreeMap::new(),
            doc_comment: None,
            is_required: false,
            kind: SymbolKind::Struct,
            language: SourceLanguage::Swift,
            module: "Kit".to_string(),
            names,
            origin: None,
            precise_id: id.to_string(),
            relationships: BTreeMap::new(),
            swift_extension: None,
            title: path.last().unwrap().to_string(),
        }
    }

    #[test]
    fn insert_merges_language_spellings() {
        let mut store = SymbolStore::new();
        let first = store.insert(symbol("s:Kit3FooV", &["Foo"]));

        let mut objc = symbol("s:Kit3FooV", &["KITFoo"]);
        objc.names = BTreeMap::from([(SourceLanguage::ObjectiveC, vec!["KITFoo".to_string()])]);
        let second = store.insert(objc);

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        let merged = store.get(first).unwrap();
        assert_eq!(merged.path_components(), ["Foo".to_string()]);
        assert_eq!(merged.names.get(&SourceLanguage::ObjectiveC), Some(&vec!["KITFoo".to_string()]));
    }

    #[test]
    fn parent_of_walks_declared_path() {
        let mut store = SymbolStore::new();
        let module = store.insert(Symbol::module("Kit", SourceLanguage::Swift));
        let foo = store.insert(symbol("s:Kit3FooV", &["Foo"]));
        let bar = store.insert(symbol("s:Kit3FooV3barSivp", &["Foo", "bar"]));

        assert_eq!(store.parent_of(bar), Some(foo));
        assert_eq!(store.parent_of(foo), Some(module));
        assert_eq!(store.parent_of(module), None);
    }

    #[test]
    fn doc_comment_module_check() {
        let mut foo = symbol("s:Kit3FooV", &["Foo"]);
        assert_eq!(foo.is_doc_comment_from_same_module("Kit"), None);

        foo.doc_comment = Some(DocComment { lines: vec!["A foo.".to_string()], module: None });
        assert_eq!(foo.is_doc_comment_from_same_module("Kit"), Some(true));

        foo.doc_comment = Some(DocComment { lines: vec!["A foo.".to_string()], module: Some("Swift".to_string()) });
        assert_eq!(foo.is_doc_comment_from_same_module("Kit"), Some(false));
    }

    #[test]
    fn abstract_is_first_paragraph() {
        let mut foo = symbol("s:Kit3FooV", &["Foo"]);
        foo.doc_comment = Some(DocComment {
            lines: vec!["".to_string(), "A foo that".to_string(), "does things.".to_string(), "".to_string(), "More.".to_string()],
            module: None,
        });
        assert_eq!(foo.abstract_text().as_deref(), Some("A foo that does things."));
    }

    #[test]
    fn extension_constraints_are_not_duplicated() {
        let mut foo = symbol("s:Kit3FooV", &["Foo"]);
        let constraint = GenericConstraint { kind: ConstraintKind::SameType, lhs: "Self".to_string(), rhs: "Sequence".to_string() };
        foo.add_swift_extension_constraint("Swift", SymbolKind::Protocol, constraint.clone());
        foo.add_swift_extension_constraint("Swift", SymbolKind::Protocol, constraint);

        let extension = foo.swift_extension.unwrap();
        assert_eq!(extension.extended_module, "Swift");
        assert_eq!(extension.constraints.len(), 1);
    }

    #[test]
    fn topic_graph_requires_both_nodes() {
        let mut graph = TopicGraph::new();
        graph.add_node("a");
        assert!(!graph.add_edge("a", "b"));
        graph.add_node("b");
        assert!(graph.add_edge("a", "b"));
        assert_eq!(graph.children("a").collect::<Vec<_>>(), ["b"]);
    }
}
