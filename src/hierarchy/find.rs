//! The path walk: one component at a time from a starting node, with
//! structured errors that carry enough to build fix-it solutions.

use super::disambiguation::{DisambiguationContainer, Disambiguator, Lookup};
use super::path::{ParsedLink, PathComponent};
use super::{NodeId, PathHierarchy};
use crate::types::SourceLanguage;

/// A colliding node and the suffix that selects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Minimal suffix for this node among its siblings.
    pub disambiguation: Option<Disambiguator>,
    /// The node.
    pub node: NodeId,
}

/// Why a walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Several nodes match the component.
    Ambiguous {
        /// Matching nodes.
        candidates: Vec<Candidate>,
        /// The component that matched several nodes.
        component: PathComponent,
        /// Node whose children were searched.
        parent: NodeId,
    },
    /// The spelling doesn't exist, but siblings carry the given suffix.
    DoesNotExist {
        /// The component that wasn't found.
        component: PathComponent,
        /// Node whose children were searched.
        parent: NodeId,
        /// Sibling spellings the author probably meant.
        siblings: Vec<String>,
    },
    /// The spelling exists but no node there matches the suffix.
    InvalidDisambiguation {
        /// Every node at the spelling.
        candidates: Vec<Candidate>,
        /// The component with the unmatched suffix.
        component: PathComponent,
        /// Node whose children were searched.
        parent: NodeId,
    },
    /// Nothing at this spelling.
    NotFound {
        /// The component that wasn't found.
        component: PathComponent,
        /// Similar sibling spellings.
        near_misses: Vec<String>,
        /// Node whose children were searched.
        parent: NodeId,
    },
}

/// Walk `link` and return the node it names.
///
/// Absolute links start at the modules. Relative links start at the nearest
/// of `start` and its ancestors that has the first component as a child,
/// and report failures from `start` when none does.
///
/// # Errors
///
/// Returns the first component that doesn't select exactly one node.
pub fn find_node(hierarchy: &PathHierarchy, link: &ParsedLink, start: Option<NodeId>) -> Result<NodeId, PathError> {
    let components = link.components();
    let mut current = match components.first() {
        Some(first) if !link.is_absolute() => relative_origin(hierarchy, first, start),
        _ => PathHierarchy::ROOT,
    };

    let mut remaining = components.iter().peekable();
    while let Some(component) = remaining.next() {
        current = lookup_child(hierarchy, current, component, remaining.peek().copied())?;
    }
    return Ok(current);
}

/// Whether `node`, in any of its spellings, has a child the component could
/// select.
fn has_child_for(hierarchy: &PathHierarchy, node: NodeId, component: &PathComponent) -> bool {
    return hierarchy.spellings(node).into_iter().filter_map(|id| return hierarchy.node(id)).any(|n| {
        return n.has_child(&component.full) || (component.disambiguation.is_some() && n.has_child(&component.name));
    });
}

/// Whether `node` carries a spelling in `language`.
fn has_language(hierarchy: &PathHierarchy, node: NodeId, language: &SourceLanguage) -> bool {
    return hierarchy.node(node).is_some_and(|n| return n.languages.contains(language));
}

/// Whether two spellings differ only in their argument list, as `init` and
/// `init()` or `something(_:)` and `something(argument:)` do.
fn is_same_base_name(a: &str, b: &str) -> bool {
    let base = |s: &str| return s.split('(').next().unwrap_or(s).to_string();
    return base(a) == base(b);
}

/// Whether `candidate` is close enough to `name` to suggest.
fn is_similar(name: &str, candidate: &str) -> bool {
    return strsim::levenshtein(name, candidate) <= name.len().max(3) / 3;
}

/// Resolve one component among the children of `parent`. `next` is used to
/// narrow collisions at intermediate components.
///
/// The children of `parent` are searched first, then those of the symbol's
/// other language spellings.
fn lookup_child(
    hierarchy: &PathHierarchy,
    parent: NodeId,
    component: &PathComponent,
    next: Option<&PathComponent>,
) -> Result<NodeId, PathError> {
    for spelling in hierarchy.spellings(parent) {
        let Some(node) = hierarchy.node(spelling) else {
            continue;
        };
        if let Some(container) = node.children.get(&component.full) {
            return select(hierarchy, spelling, container, component, false, next);
        }
        let suffixed = node.children.get(&component.name).filter(|_| return component.disambiguation.is_some());
        if let Some(container) = suffixed {
            return select(hierarchy, spelling, container, component, true, next);
        }
    }
    return Err(not_found(hierarchy, parent, component));
}

/// Sibling spellings to suggest for a component that doesn't exist.
fn not_found(hierarchy: &PathHierarchy, parent: NodeId, component: &PathComponent) -> PathError {
    let Some(node) = hierarchy.node(parent) else {
        return PathError::NotFound { component: component.clone(), near_misses: Vec::new(), parent };
    };
    let is_candidate = |name: &str| return is_same_base_name(name, &component.name) || is_similar(&component.name, name);

    if let Some(disambiguation) = &component.disambiguation {
        let with_suffix = |n: NodeId, l: &SourceLanguage| return has_language(hierarchy, n, l);
        let siblings = ranked(
            &component.name,
            node.children
                .iter()
                .filter(|(_, container)| return container.has_match(disambiguation, &with_suffix))
                .map(|(name, _)| return name.as_str())
                .filter(|name| return is_candidate(name)),
        );
        if !siblings.is_empty() {
            return PathError::DoesNotExist { component: component.clone(), parent, siblings };
        }
    }

    let near_misses = ranked(&component.name, node.children.keys().map(String::as_str).filter(|name| return is_candidate(name)));
    return PathError::NotFound { component: component.clone(), near_misses, parent };
}

/// Spellings ordered by edit distance from `name`, then alphabetically.
fn ranked<'a>(name: &str, spellings: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut scored: Vec<(usize, &str)> = spellings.map(|s| return (strsim::levenshtein(name, s), s)).collect();
    scored.sort_unstable();
    return scored.into_iter().map(|(_, s)| return s.to_string()).collect();
}

/// Nearest of `start` and its ancestors that has a child for `first`.
fn relative_origin(hierarchy: &PathHierarchy, first: &PathComponent, start: Option<NodeId>) -> NodeId {
    let origin = start.unwrap_or(PathHierarchy::ROOT);
    let mut candidate = Some(origin);
    while let Some(id) = candidate {
        if has_child_for(hierarchy, id, first) {
            return id;
        }
        candidate = hierarchy.node(id).and_then(|n| return n.parent);
    }
    return origin;
}

/// Pick one node out of a container, applying the component's suffix when
/// the spelling alone matched.
fn select(
    hierarchy: &PathHierarchy,
    parent: NodeId,
    container: &DisambiguationContainer,
    component: &PathComponent,
    use_suffix: bool,
    next: Option<&PathComponent>,
) -> Result<NodeId, PathError> {
    let suffix = component.disambiguation.as_ref().filter(|_| return use_suffix);
    let with_language = |n: NodeId, l: &SourceLanguage| return has_language(hierarchy, n, l);

    return match container.find(suffix, &with_language) {
        Lookup::Found(node) => Ok(node),
        Lookup::Ambiguous(nodes) => {
            if let Some(next) = next {
                let narrowed: Vec<NodeId> =
                    nodes.iter().copied().filter(|n| return has_child_for(hierarchy, *n, next)).collect();
                if let [only] = narrowed.as_slice() {
                    return Ok(*only);
                }
            }
            Err(PathError::Ambiguous {
                candidates: candidates(container, |node| return nodes.contains(&node)),
                component: component.clone(),
                parent,
            })
        },
        Lookup::NoMatch => Err(PathError::InvalidDisambiguation {
            candidates: candidates(container, |_| return true),
            component: component.clone(),
            parent,
        }),
    };
}

/// Container entries passing `keep`, with their minimal disambiguators.
fn candidates(container: &DisambiguationContainer, keep: impl Fn(NodeId) -> bool) -> Vec<Candidate> {
    return container
        .minimal_disambiguators()
        .into_iter()
        .filter(|(node, _)| return keep(*node))
        .map(|(node, disambiguation)| return Candidate { disambiguation, node })
        .collect();
}
