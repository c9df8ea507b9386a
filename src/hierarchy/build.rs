//! Construction of the path hierarchy from the symbol store.

use std::collections::{BTreeSet, HashMap};

use super::{NodeId, PathHierarchy, SymbolSpelling};
use crate::hasher::stable_hash;
use crate::symbol::{Symbol, SymbolStore};
use crate::types::{SourceLanguage, SymbolKind};

/// `memberOf` edges by the language of the graph they came from:
/// `(language, member) -> container`.
pub type MemberOfTable = HashMap<(SourceLanguage, String), String>;

/// Build the hierarchy for every symbol in `store`.
///
/// Each language's spellings are inserted in turn, Swift first, shortest
/// paths first. A symbol's parent is its `memberOf` container in that
/// language when the container's spelling matches the path, then the symbol
/// at the path prefix, then a sparse node standing in for a missing one. A
/// spelling that matches a node the symbol already has is merged into it.
pub fn build(store: &SymbolStore, member_of: &MemberOfTable) -> PathHierarchy {
    let mut hierarchy = PathHierarchy::new();

    let mut modules: HashMap<&str, NodeId> = HashMap::new();
    for (_, symbol) in store.iter().filter(|(_, s)| return s.kind == SymbolKind::Module) {
        for language in symbol.names.keys() {
            let hash = stable_hash(&symbol.precise_id);
            let node = hierarchy.add_symbol_node(PathHierarchy::ROOT, &symbol.module, spelling(symbol, &hash, language));
            modules.insert(&symbol.module, node);
        }
    }

    let mut languages: Vec<&SourceLanguage> =
        store.iter().flat_map(|(_, s)| return s.names.keys()).collect::<BTreeSet<_>>().into_iter().collect();
    languages.sort_by_key(|language| return **language != SourceLanguage::Swift);

    for language in languages {
        insert_language(&mut hierarchy, store, member_of, language, &mut modules);
    }

    tracing::debug!(nodes = hierarchy.node_count(), symbols = hierarchy.primary_nodes().len(), "built path hierarchy");
    return hierarchy;
}

/// Insert every spelling in `language`.
fn insert_language<'s>(
    hierarchy: &mut PathHierarchy,
    store: &'s SymbolStore,
    member_of: &MemberOfTable,
    language: &SourceLanguage,
    modules: &mut HashMap<&'s str, NodeId>,
) {
    let mut spelled: Vec<(&Symbol, &[String])> = store
        .iter()
        .filter(|(_, s)| return s.kind != SymbolKind::Module)
        .filter_map(|(_, s)| return s.names.get(language).map(|path| return (s, path.as_slice())))
        .filter(|(_, path)| return !path.is_empty())
        .collect();
    spelled.sort_by(|(a, a_path), (b, b_path)| {
        return (a.module.as_str(), a_path.len(), *a_path, a.precise_id.as_str())
            .cmp(&(b.module.as_str(), b_path.len(), *b_path, b.precise_id.as_str()));
    });

    let mut by_path: HashMap<(&str, &[String]), NodeId> = HashMap::new();
    let mut language_nodes: HashMap<&str, NodeId> = HashMap::new();

    for (symbol, path) in spelled {
        let Some((name, prefix)) = path.split_last() else {
            continue;
        };
        let module = *modules.entry(symbol.module.as_str()).or_insert_with(|| {
            return hierarchy.add_sparse_node(PathHierarchy::ROOT, &symbol.module, language);
        });

        let container = member_of
            .get(&(language.clone(), symbol.precise_id.clone()))
            .and_then(|target| {
                return language_nodes.get(target.as_str()).copied().or_else(|| return hierarchy.primary_node(target));
            })
            .filter(|parent| {
                let parent_name = hierarchy.node(*parent).map(|n| return n.name.as_str());
                return prefix.last().map(String::as_str) == parent_name;
            });
        let parent = container
            .or_else(|| return by_path.get(&(symbol.module.as_str(), prefix)).copied())
            .unwrap_or_else(|| return sparse_chain(hierarchy, module, &symbol.module, path, language, &mut by_path));

        let hash = stable_hash(&symbol.precise_id);
        let node = hierarchy.add_symbol_node(parent, name, spelling(symbol, &hash, language));
        by_path.entry((symbol.module.as_str(), path)).or_insert(node);
        language_nodes.insert(&symbol.precise_id, node);
    }
}

/// Create (or reuse) sparse nodes for every prefix of `path` that no symbol
/// spells, and return the node for the full prefix.
fn sparse_chain<'p>(
    hierarchy: &mut PathHierarchy,
    module_node: NodeId,
    module: &'p str,
    path: &'p [String],
    language: &SourceLanguage,
    by_path: &mut HashMap<(&'p str, &'p [String]), NodeId>,
) -> NodeId {
    let mut parent = module_node;
    let prefix_len = path.len().saturating_sub(1);
    for end in 1..=prefix_len {
        let (Some(prefix), Some(name)) = (path.get(..end), path.get(end.saturating_sub(1))) else {
            break;
        };
        parent = match by_path.get(&(module, prefix)) {
            Some(existing) => *existing,
            None => {
                let node = hierarchy.add_sparse_node(parent, name, language);
                by_path.insert((module, prefix), node);
                node
            },
        };
    }
    return parent;
}

/// The hierarchy's view of one spelling.
fn spelling<'a>(symbol: &'a Symbol, hash: &'a str, language: &'a SourceLanguage) -> SymbolSpelling<'a> {
    return SymbolSpelling {
        hash,
        kind: symbol.kind.identifier(),
        language,
        precise_id: &symbol.precise_id,
    };
}
