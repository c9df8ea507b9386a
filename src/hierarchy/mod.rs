//! Path hierarchy: a tree of every symbol spelling, keyed by path component,
//! that authored links are resolved against.
//!
//! Node 0 is a hidden root whose children are the modules. A symbol gets one
//! node per distinct spelling (Swift and Objective-C names can differ), and
//! one of those is its primary node, which decides its canonical path.

pub mod build;
pub mod disambiguation;
pub mod find;
pub mod path;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::types::SourceLanguage;

use self::disambiguation::{DisambiguationContainer, Disambiguator, Element, minimal_disambiguators};

/// One path component in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Children by spelling.
    pub children: BTreeMap<String, DisambiguationContainer>,
    /// Languages that spell a path through this node.
    pub languages: BTreeSet<SourceLanguage>,
    /// Spelling of this component.
    pub name: String,
    /// Enclosing node. `None` only for the root.
    pub parent: Option<NodeId>,
    /// Precise identifier of the symbol, or `None` for a sparse node that
    /// only exists to hold children.
    pub symbol: Option<String>,
}

impl Node {
    /// Whether any child is spelled `name`.
    pub fn has_child(&self, name: &str) -> bool {
        return self.children.contains_key(name);
    }

    /// Language used for kind suffixes in canonical paths: Swift when the
    /// node has a Swift spelling.
    pub fn primary_language(&self) -> Option<&SourceLanguage> {
        if self.languages.contains(&SourceLanguage::Swift) {
            return Some(&SourceLanguage::Swift);
        }
        return self.languages.first();
    }

    /// A node with no children or languages yet.
    fn new(name: &str, parent: Option<NodeId>, symbol: Option<String>) -> Self {
        return Self {
            children: BTreeMap::new(),
            languages: BTreeSet::new(),
            name: name.to_string(),
            parent,
            symbol,
        };
    }
}

/// Handle to a node in a [`PathHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Handle for an arena index.
    pub(crate) const fn new(index: usize) -> Self {
        return Self(index);
    }

    /// Arena index.
    pub(crate) const fn index(self) -> usize {
        return self.0;
    }
}

/// The built tree. Immutable once construction finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHierarchy {
    /// Node arena; index 0 is the root.
    nodes: Vec<Node>,
    /// Node that decides each symbol's canonical path.
    primary_nodes: BTreeMap<String, NodeId>,
    /// Every node of each symbol, one per spelling, in arena order.
    symbol_nodes: BTreeMap<String, Vec<NodeId>>,
}

impl Default for PathHierarchy {
    fn default() -> Self {
        return Self::new();
    }
}

impl PathHierarchy {
    /// The hidden root whose children are modules.
    pub const ROOT: NodeId = NodeId(0);

    /// Attach a child for a symbol spelling, reusing a node the symbol already
    /// has under this spelling, or upgrading a sparse one.
    pub(crate) fn add_symbol_node(&mut self, parent: NodeId, name: &str, spelling: SymbolSpelling<'_>) -> NodeId {
        let existing = self.child_elements(parent, name).map(|e| return e.node).find(|node| {
            return self.node(*node).is_some_and(|n| return n.symbol.as_deref() == Some(spelling.precise_id));
        });
        let sparse = self.child_elements(parent, name).map(|e| return e.node).find(|node| {
            return self.node(*node).is_some_and(|n| return n.symbol.is_none());
        });

        let id = if let Some(node) = existing.or(sparse) {
            if let Some(element) = self.container_mut(parent, name).and_then(|c| return c.element_mut(node)) {
                element.hash = Some(spelling.hash.to_string());
                element.kind = Some(spelling.kind.to_string());
            }
            node
        } else {
            let node = self.push_node(parent, name, None);
            if let Some(container) = self.container_mut(parent, name) {
                container.insert(Element {
                    hash: Some(spelling.hash.to_string()),
                    kind: Some(spelling.kind.to_string()),
                    node,
                });
            }
            node
        };

        if let Some(node) = self.nodes.get_mut(id.0) {
            node.symbol = Some(spelling.precise_id.to_string());
            node.languages.insert(spelling.language.clone());
        }
        self.primary_nodes.entry(spelling.precise_id.to_string()).or_insert(id);
        let spellings = self.symbol_nodes.entry(spelling.precise_id.to_string()).or_default();
        if let Err(at) = spellings.binary_search(&id) {
            spellings.insert(at, id);
        }
        return id;
    }

    /// Child spelled `name` to hold descendants of a symbol that isn't in the
    /// hierarchy. Reuses any existing child with that spelling.
    pub(crate) fn add_sparse_node(&mut self, parent: NodeId, name: &str, language: &SourceLanguage) -> NodeId {
        let existing = self.child_elements(parent, name).next().map(|e| return e.node);
        let id = existing.unwrap_or_else(|| {
            let node = self.push_node(parent, name, None);
            if let Some(container) = self.container_mut(parent, name) {
                container.insert(Element { hash: None, kind: None, node });
            }
            return node;
        });
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.languages.insert(language.clone());
        }
        return id;
    }

    /// Canonical URL path of every symbol, below `/documentation`, keyed by
    /// precise identifier.
    ///
    /// Siblings whose spellings collide without regard to case get a suffix:
    /// `-<language>.<kind>` when their kinds are unique among them and
    /// `-<hash>` otherwise. Only primary nodes take part, so alternate
    /// language spellings never change a symbol's URL.
    pub fn canonical_paths(&self) -> BTreeMap<String, String> {
        let mut paths = BTreeMap::new();
        self.collect_canonical_paths(Self::ROOT, "", &mut paths);
        return paths;
    }

    /// Elements of the container spelled `name` under `parent`.
    fn child_elements(&self, parent: NodeId, name: &str) -> impl Iterator<Item = &Element> {
        return self
            .node(parent)
            .and_then(|n| return n.children.get(name))
            .into_iter()
            .flat_map(|c| return c.elements().iter());
    }

    /// Depth-first walk for [`Self::canonical_paths`].
    fn collect_canonical_paths(&self, id: NodeId, prefix: &str, paths: &mut BTreeMap<String, String>) {
        let Some(node) = self.node(id) else {
            return;
        };

        let mut groups: BTreeMap<String, Vec<(&str, &Element)>> = BTreeMap::new();
        for (name, container) in &node.children {
            for element in container.elements() {
                groups.entry(name.to_lowercase()).or_default().push((name.as_str(), element));
            }
        }

        for group in groups.values() {
            let primary: Vec<&Element> =
                group.iter().map(|(_, e)| return *e).filter(|e| return self.is_primary(e.node)).collect();
            let disambiguators = minimal_disambiguators(&primary);

            for (name, element) in group {
                let Some(child) = self.node(element.node) else {
                    continue;
                };
                let disambiguator = primary
                    .iter()
                    .position(|p| return p.node == element.node)
                    .and_then(|index| return disambiguators.get(index).cloned().flatten());
                let segment = match disambiguator {
                    None => (*name).to_string(),
                    Some(Disambiguator::Hash(hash)) => format!("{name}-{hash}"),
                    Some(Disambiguator::Kind(kind)) => {
                        let tag = child.primary_language().map_or("swift", SourceLanguage::link_tag);
                        format!("{name}-{tag}.{kind}")
                    },
                };
                let path = format!("{prefix}/{segment}");

                if let Some(symbol) = child.symbol.as_ref().filter(|_| return self.is_primary(element.node)) {
                    paths.insert(symbol.clone(), path.clone());
                }
                self.collect_canonical_paths(element.node, &path, paths);
            }
        }
    }

    /// Mutable container spelled `name` under `parent`, created on demand.
    fn container_mut(&mut self, parent: NodeId, name: &str) -> Option<&mut DisambiguationContainer> {
        return self
            .nodes
            .get_mut(parent.0)
            .map(|n| return n.children.entry(name.to_string()).or_default());
    }

    /// Path of node names from the module down, such as `/Kit/Kind`.
    /// The root renders as `/`.
    pub fn display_path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| return self.node(c)) {
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        if names.is_empty() {
            return "/".to_string();
        }
        names.reverse();
        return format!("/{}", names.join("/"));
    }

    /// Render the tree with each child's minimal disambiguation, for debugging.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (label, module) in self.labelled_children(Self::ROOT) {
            let _ = writeln!(out, "{label}");
            self.dump_children(module, "", &mut out);
        }
        return out;
    }

    /// Children of `id` as indented tree lines.
    fn dump_children(&self, id: NodeId, indent: &str, out: &mut String) {
        let children = self.labelled_children(id);
        let count = children.len();
        for (index, (label, child)) in children.into_iter().enumerate() {
            let is_last = index.saturating_add(1) == count;
            let (branch, continuation) = if is_last { ("╰ ", "  ") } else { ("├ ", "│ ") };
            let _ = writeln!(out, "{indent}{branch}{label}");
            self.dump_children(child, &format!("{indent}{continuation}"), out);
        }
    }

    /// Reassemble a hierarchy from decoded parts. Callers validate indices.
    pub(crate) fn from_parts(nodes: Vec<Node>, primary_nodes: BTreeMap<String, NodeId>) -> Self {
        let mut symbol_nodes: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(symbol) = &node.symbol {
                symbol_nodes.entry(symbol.clone()).or_default().push(NodeId(index));
            }
        }
        return Self { nodes, primary_nodes, symbol_nodes };
    }

    /// Whether `id` is the primary node of its symbol. Sparse nodes count as primary.
    fn is_primary(&self, id: NodeId) -> bool {
        return self.node(id).is_some_and(|node| {
            return node
                .symbol
                .as_ref()
                .is_none_or(|symbol| return self.primary_nodes.get(symbol) == Some(&id));
        });
    }

    /// Children of `id` labelled `name` or `name-<disambiguator>`, sorted by label.
    fn labelled_children(&self, id: NodeId) -> Vec<(String, NodeId)> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        let mut labelled: Vec<(String, NodeId)> = node
            .children
            .iter()
            .flat_map(|(name, container)| {
                return container.minimal_disambiguators().into_iter().map(move |(child, disambiguator)| {
                    let label = match disambiguator {
                        Some(d) => format!("{name}-{}", d.text()),
                        None => name.clone(),
                    };
                    return (label, child);
                });
            })
            .collect();
        labelled.sort();
        return labelled;
    }

    /// Empty hierarchy holding only the root.
    pub fn new() -> Self {
        return Self {
            nodes: vec![Node::new("", None, None)],
            primary_nodes: BTreeMap::new(),
            symbol_nodes: BTreeMap::new(),
        };
    }

    /// Node by handle.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        return self.nodes.get(id.0);
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        return self.nodes.len();
    }

    /// All nodes in arena order, root first.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        return self.nodes.iter().enumerate().map(|(index, node)| return (NodeId(index), node));
    }

    /// Primary node of a symbol.
    pub fn primary_node(&self, precise_id: &str) -> Option<NodeId> {
        return self.primary_nodes.get(precise_id).copied();
    }

    /// Primary node of every symbol, by precise identifier.
    pub const fn primary_nodes(&self) -> &BTreeMap<String, NodeId> {
        return &self.primary_nodes;
    }

    /// Append a node and return its handle.
    fn push_node(&mut self, parent: NodeId, name: &str, symbol: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, Some(parent), symbol));
        return id;
    }

    /// `id` followed by the other spellings of its symbol, so that a walk
    /// through one language's spelling also sees the children of the other.
    /// Sparse nodes and the root only spell themselves.
    pub fn spellings(&self, id: NodeId) -> Vec<NodeId> {
        let mut spellings = vec![id];
        let others = self
            .node(id)
            .and_then(|node| return node.symbol.as_ref())
            .and_then(|symbol| return self.symbol_nodes.get(symbol));
        if let Some(others) = others {
            spellings.extend(others.iter().copied().filter(|other| return *other != id));
        }
        return spellings;
    }
}

/// What the hierarchy records about one spelling of a symbol.
#[derive(Debug, Clone, Copy)]
pub struct SymbolSpelling<'a> {
    /// Stable hash of the precise identifier.
    pub hash: &'a str,
    /// Kind identifier.
    pub kind: &'a str,
    /// Language of this spelling.
    pub language: &'a SourceLanguage,
    /// Precise identifier.
    pub precise_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::{PathHierarchy, SymbolSpelling};
    use crate::hasher::stable_hash;
    use crate::types::SourceLanguage;

    fn add(h: &mut PathHierarchy, parent: super::NodeId, name: &str, id: &str, kind: &str) -> super::NodeId {
        let hash = stable_hash(id);
        h.add_symbol_node(parent, name, SymbolSpelling { hash: &hash, kind, language: &SourceLanguage::Swift, precise_id: id })
    }

    #[test]
    fn canonical_paths_disambiguate_case_insensitive_collisions() {
        let mut h = PathHierarchy::new();
        let module = add(&mut h, PathHierarchy::ROOT, "Kit", "Kit", "module");
        let kinds = add(&mut h, module, "Kinds", "s:Kinds", "enum");
        add(&mut h, kinds, "something", "s:case", "enum.case");
        add(&mut h, kinds, "something", "s:property", "property");
        add(&mut h, kinds, "Something", "s:alias", "typealias");
        let caps = add(&mut h, module, "Caps", "s:Caps", "struct");
        add(&mut h, caps, "something", "s:lower", "property");
        add(&mut h, caps, "someThing", "s:upper", "property");

        let paths = h.canonical_paths();
        assert_eq!(paths["Kit"], "/Kit");
        assert_eq!(paths["s:case"], "/Kit/Kinds/something-swift.enum.case");
        assert_eq!(paths["s:property"], "/Kit/Kinds/something-swift.property");
        assert_eq!(paths["s:alias"], "/Kit/Kinds/Something-swift.typealias");
        assert_eq!(paths["s:lower"], format!("/Kit/Caps/something-{}", stable_hash("s:lower")));
        assert_eq!(paths["s:upper"], format!("/Kit/Caps/someThing-{}", stable_hash("s:upper")));
    }

    #[test]
    fn sparse_nodes_are_upgraded_in_place() {
        let mut h = PathHierarchy::new();
        let module = add(&mut h, PathHierarchy::ROOT, "Kit", "Kit", "module");
        let sparse = h.add_sparse_node(module, "Outer", &SourceLanguage::Swift);
        let upgraded = add(&mut h, module, "Outer", "s:Outer", "struct");

        assert_eq!(sparse, upgraded);
        assert_eq!(h.node(upgraded).unwrap().symbol.as_deref(), Some("s:Outer"));
        assert_eq!(h.node(module).unwrap().children["Outer"].len(), 1);
    }

    #[test]
    fn display_path_names_the_chain() {
        let mut h = PathHierarchy::new();
        let module = add(&mut h, PathHierarchy::ROOT, "Kit", "Kit", "module");
        let kinds = add(&mut h, module, "Kinds", "s:Kinds", "enum");
        assert_eq!(h.display_path(kinds), "/Kit/Kinds");
        assert_eq!(h.display_path(PathHierarchy::ROOT), "/");
    }

    #[test]
    fn spellings_list_every_node_of_the_symbol() {
        let mut h = PathHierarchy::new();
        let module = add(&mut h, PathHierarchy::ROOT, "Kit", "Kit", "module");
        let swift = add(&mut h, module, "Widget", "c:Widget", "class");
        let hash = stable_hash("c:Widget");
        let objc = h.add_symbol_node(module, "KITWidget", SymbolSpelling {
            hash: &hash,
            kind: "class",
            language: &SourceLanguage::ObjectiveC,
            precise_id: "c:Widget",
        });

        assert_eq!(h.spellings(swift), [swift, objc]);
        assert_eq!(h.spellings(objc), [objc, swift]);
        assert_eq!(h.spellings(module), [module]);
        assert_eq!(h.spellings(PathHierarchy::ROOT), [PathHierarchy::ROOT]);
    }

    #[test]
    fn dump_shows_disambiguated_children() {
        let mut h = PathHierarchy::new();
        let module = add(&mut h, PathHierarchy::ROOT, "Kit", "Kit", "module");
        add(&mut h, module, "thing", "s:a", "enum.case");
        add(&mut h, module, "thing", "s:b", "property");
        add(&mut h, module, "Other", "s:c", "struct");

        assert_eq!(h.dump(), "Kit\n├ Other\n├ thing-enum.case\n╰ thing-property\n");
    }
}
