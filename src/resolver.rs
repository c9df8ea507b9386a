//! Link resolution over a path hierarchy, with fix-it solutions for links
//! that don't name exactly one symbol.
//!
//! The walk is shared. [`LocalResolver`] answers from a live
//! [`DocumentationContext`]; [`ExternalResolver`] answers from a snapshot and
//! the linkable-element summaries of another build.

use std::collections::HashMap;
use std::path::Path;

use crate::context::DocumentationContext;
use crate::diagnostics::{Diagnostic, Problem, Replacement, Severity, Solution};
use crate::error::Error;
use crate::hierarchy::find::{Candidate, PathError, find_node};
use crate::hierarchy::path::{PathComponent, parse_link};
use crate::hierarchy::{NodeId, PathHierarchy};
use crate::snapshot::{LinkDestinationSummary, LinkResolutionSnapshot, read_summaries};
use crate::types::ResolvedReference;

/// Category of a link that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Several symbols match.
    Ambiguous,
    /// The spelling doesn't exist but a sibling with the suffix does.
    DoesNotExist,
    /// The suffix matches none of the symbols at the spelling.
    InvalidDisambiguation,
    /// The link can't be parsed, or names a page that isn't a symbol.
    InvalidReference,
    /// A component doesn't exist.
    PathComponentNotFound,
}

impl FailureKind {
    /// Diagnostic identifier for this kind.
    pub const fn identifier(self) -> &'static str {
        return match self {
            Self::Ambiguous => "symref.link.Ambiguous",
            Self::DoesNotExist => "symref.link.DoesNotExist",
            Self::InvalidDisambiguation => "symref.link.InvalidDisambiguation",
            Self::InvalidReference => "symref.link.InvalidReference",
            Self::PathComponentNotFound => "symref.link.PathComponentNotFound",
        };
    }
}

/// A link that didn't resolve, with fixes ordered for presentation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResolutionFailure {
    /// Category.
    pub kind: FailureKind,
    /// One-line description.
    pub message: String,
    /// Candidate fixes; replacement columns index into the authored link.
    pub solutions: Vec<Solution>,
}

impl ResolutionFailure {
    /// A failure with no solutions.
    fn bare(kind: FailureKind, message: String) -> Self {
        return Self { kind, message, solutions: Vec::new() };
    }

    /// Report as a problem about `authored`.
    pub fn to_problem(&self, authored: &str) -> Problem {
        return Problem {
            diagnostic: Diagnostic {
                identifier: self.kind.identifier().to_string(),
                severity: Severity::Error,
                source: Some(authored.to_string()),
                summary: self.message.clone(),
            },
            solutions: self.solutions.clone(),
        };
    }
}

/// What a resolver needs from the documentation set it resolves into.
pub trait HierarchySource {
    /// The tree links are walked through.
    fn hierarchy(&self) -> &PathHierarchy;

    /// Text shown next to a candidate: its declaration, else its title.
    fn hint(&self, node: NodeId) -> Option<String>;

    /// Canonical reference of the symbol at `node`.
    fn reference_for(&self, node: NodeId) -> Option<ResolvedReference>;

    /// Resolve an authored link. Relative links are looked up from the
    /// symbol `from` names, and then from its ancestors.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionFailure`] when the link doesn't name exactly
    /// one symbol.
    fn resolve(&self, authored: &str, from: Option<&str>) -> Result<ResolvedReference, ResolutionFailure> {
        let link = parse_link(authored).map_err(|message| return ResolutionFailure::bare(FailureKind::InvalidReference, message))?;
        let start = from.and_then(|precise_id| return self.hierarchy().primary_node(precise_id));
        let node = find_node(self.hierarchy(), &link, start).map_err(|error| return describe(self, &error))?;

        return self.reference_for(node).ok_or_else(|| {
            let path = self.hierarchy().display_path(node);
            return ResolutionFailure::bare(
                FailureKind::InvalidReference,
                format!("'{authored}' names '{path}', which has no documentation page"),
            );
        });
    }
}

/// Resolver over a documentation set that isn't loaded, rebuilt from its
/// snapshot and summaries.
#[derive(Debug, Clone)]
pub struct ExternalResolver {
    /// Rebuilt tree.
    hierarchy: PathHierarchy,
    /// Summaries by precise identifier.
    summaries: HashMap<String, LinkDestinationSummary>,
}

impl ExternalResolver {
    /// Rebuild from a decoded snapshot and its summaries.
    ///
    /// # Errors
    ///
    /// Returns `Error::SnapshotCorrupt` if the snapshot's hierarchy is
    /// inconsistent.
    pub fn new(snapshot: LinkResolutionSnapshot, summaries: Vec<LinkDestinationSummary>) -> Result<Self, Error> {
        let hierarchy = snapshot.into_hierarchy()?;
        let summaries = summaries.into_iter().map(|s| return (s.precise_id.clone(), s)).collect();
        return Ok(Self { hierarchy, summaries });
    }

    /// Read a snapshot file and a summaries file.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`LinkResolutionSnapshot::read`],
    /// [`read_summaries`], and [`Self::new`].
    pub fn read(snapshot: &Path, summaries: &Path) -> Result<Self, Error> {
        return Self::new(LinkResolutionSnapshot::read(snapshot)?, read_summaries(summaries)?);
    }

    /// Summary of the symbol at `node`.
    fn summary(&self, node: NodeId) -> Option<&LinkDestinationSummary> {
        let precise_id = self.hierarchy.node(node)?.symbol.as_ref()?;
        return self.summaries.get(precise_id);
    }
}

impl HierarchySource for ExternalResolver {
    fn hierarchy(&self) -> &PathHierarchy {
        return &self.hierarchy;
    }

    fn hint(&self, node: NodeId) -> Option<String> {
        return self.summary(node).map(|s| return s.hint().to_string());
    }

    fn reference_for(&self, node: NodeId) -> Option<ResolvedReference> {
        return self.summary(node).map(|s| return s.reference.clone());
    }
}

/// Resolver over the documentation set being built.
#[derive(Debug, Clone, Copy)]
pub struct LocalResolver<'c> {
    /// The built context.
    context: &'c DocumentationContext,
}

impl<'c> LocalResolver<'c> {
    /// Resolve against `context`.
    pub const fn new(context: &'c DocumentationContext) -> Self {
        return Self { context };
    }

    /// Precise identifier of the symbol at `node`.
    fn precise_id(&self, node: NodeId) -> Option<&'c str> {
        return self.context.hierarchy().node(node)?.symbol.as_deref();
    }
}

impl HierarchySource for LocalResolver<'_> {
    fn hierarchy(&self) -> &PathHierarchy {
        return self.context.hierarchy();
    }

    fn hint(&self, node: NodeId) -> Option<String> {
        let symbol = self.context.store().symbol(self.precise_id(node)?)?;
        return Some(symbol.hint().to_string());
    }

    fn reference_for(&self, node: NodeId) -> Option<ResolvedReference> {
        return self.context.reference(self.precise_id(node)?).cloned();
    }
}

/// Collision message. Matches without a disambiguator are sparse nodes that
/// no suffix selects, so they get no solution and are counted here instead.
fn ambiguous_message(component: &PathComponent, at: &str, candidates: &[Candidate]) -> String {
    let unselectable = candidates.iter().filter(|c| return c.disambiguation.is_none()).count();
    if unselectable == 0 {
        return format!("'{}' is ambiguous at '{at}'", component.full);
    }
    let verb = if unselectable == 1 { "has" } else { "have" };
    return format!(
        "'{}' is ambiguous at '{at}'; {unselectable} of the {} matches {verb} no documentation page",
        component.full,
        candidates.len()
    );
}

/// Turn a walk error into a message and solutions.
fn describe<S: HierarchySource + ?Sized>(source: &S, error: &PathError) -> ResolutionFailure {
    let hierarchy = source.hierarchy();
    return match error {
        PathError::Ambiguous { candidates, component, parent } => {
            let at = hierarchy.display_path(*parent);
            let suffix_applied = hierarchy.node(*parent).is_some_and(|n| return !n.has_child(&component.full));
            let solutions = if suffix_applied && component.disambiguation.is_some() {
                replace_solutions(source, component, candidates)
            } else {
                insert_solutions(source, component, candidates)
            };
            ResolutionFailure { kind: FailureKind::Ambiguous, message: ambiguous_message(component, &at, candidates), solutions }
        },
        PathError::DoesNotExist { component, parent, siblings } => {
            let at = hierarchy.display_path(*parent);
            let solutions = siblings
                .iter()
                .map(|sibling| {
                    return Solution {
                        replacements: vec![Replacement {
                            end: component.name_range.end,
                            start: component.name_range.start,
                            text: sibling.clone(),
                        }],
                        summary: format!("Replace '{}' with '{sibling}'", component.name),
                    };
                })
                .collect();
            ResolutionFailure {
                kind: FailureKind::DoesNotExist,
                message: format!("'{}' doesn't exist at '{at}'", component.full),
                solutions,
            }
        },
        PathError::InvalidDisambiguation { candidates, component, parent } => {
            let at = hierarchy.display_path(*parent);
            let Some(suffix) = &component.disambiguation else {
                return ResolutionFailure {
                    kind: FailureKind::Ambiguous,
                    message: ambiguous_message(component, &at, candidates),
                    solutions: insert_solutions(source, component, candidates),
                };
            };
            let solutions = match candidates.as_slice() {
                [only] => vec![Solution {
                    replacements: vec![Replacement { end: suffix.range.end, start: suffix.range.start, text: String::new() }],
                    summary: format!("Remove '{}' for\n'{}'", suffix.text, hint_or_name(source, only.node, component)),
                }],
                _ => replace_solutions(source, component, candidates),
            };
            ResolutionFailure {
                kind: FailureKind::InvalidDisambiguation,
                message: format!("'{}' isn't a disambiguation for '{}' at '{at}'", suffix.text, component.name),
                solutions,
            }
        },
        PathError::NotFound { component, near_misses, parent } => {
            let at = hierarchy.display_path(*parent);
            let solutions = near_misses
                .iter()
                .map(|near| {
                    return Solution {
                        replacements: vec![Replacement {
                            end: component.range.end,
                            start: component.range.start,
                            text: near.clone(),
                        }],
                        summary: format!("Replace '{}' with '{near}'", component.full),
                    };
                })
                .collect();
            ResolutionFailure {
                kind: FailureKind::PathComponentNotFound,
                message: format!("'{}' doesn't exist at '{at}'", component.full),
                solutions,
            }
        },
    };
}

/// Hint for a candidate, falling back to the spelling for sparse nodes.
fn hint_or_name<S: HierarchySource + ?Sized>(source: &S, node: NodeId, component: &PathComponent) -> String {
    return source.hint(node).unwrap_or_else(|| return component.name.clone());
}

/// One "Insert" solution per candidate, placing the suffix after the spelling.
fn insert_solutions<S: HierarchySource + ?Sized>(source: &S, component: &PathComponent, candidates: &[Candidate]) -> Vec<Solution> {
    let at = component.name_range.end;
    return sorted_solutions(source, component, candidates, |d, hint| {
        return Solution {
            replacements: vec![Replacement { end: at, start: at, text: format!("-{d}") }],
            summary: format!("Insert '{d}' for\n'{hint}'"),
        };
    });
}

/// One "Replace" solution per candidate, rewriting the suffix.
fn replace_solutions<S: HierarchySource + ?Sized>(source: &S, component: &PathComponent, candidates: &[Candidate]) -> Vec<Solution> {
    let Some(suffix) = &component.disambiguation else {
        return insert_solutions(source, component, candidates);
    };
    return sorted_solutions(source, component, candidates, |d, hint| {
        return Solution {
            replacements: vec![Replacement { end: suffix.range.end, start: suffix.range.start, text: format!("-{d}") }],
            summary: format!("Replace '{}' with '{d}' for\n'{hint}'", suffix.text),
        };
    });
}

/// Build one solution per candidate that has a disambiguator, ordered by
/// hint and then by disambiguator.
fn sorted_solutions<S: HierarchySource + ?Sized>(
    source: &S,
    component: &PathComponent,
    candidates: &[Candidate],
    make: impl Fn(&str, &str) -> Solution,
) -> Vec<Solution> {
    let mut keyed: Vec<(String, String)> = candidates
        .iter()
        .filter_map(|candidate| {
            let disambiguator = candidate.disambiguation.as_ref()?.text().to_string();
            return Some((hint_or_name(source, candidate.node, component), disambiguator));
        })
        .collect();
    keyed.sort();
    return keyed.iter().map(|(hint, d)| return make(d, hint)).collect();
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{FailureKind, HierarchySource};
    use crate::hasher::stable_hash;
    use crate::hierarchy::{NodeId, PathHierarchy, SymbolSpelling};
    use crate::snapshot::{LinkResolutionSnapshot, SerializedElement, SerializedNode};
    use crate::types::{ResolvedReference, SourceLanguage};

    /// A bare hierarchy whose hints are the precise identifiers.
    struct Fixture {
        hierarchy: PathHierarchy,
    }

    impl HierarchySource for Fixture {
        fn hierarchy(&self) -> &PathHierarchy {
            &self.hierarchy
        }

        fn hint(&self, node: NodeId) -> Option<String> {
            self.hierarchy.node(node)?.symbol.clone()
        }

        fn reference_for(&self, node: NodeId) -> Option<ResolvedReference> {
            let precise_id = self.hierarchy.node(node)?.symbol.as_ref()?;
            let paths: BTreeMap<String, String> = self.hierarchy.canonical_paths();
            Some(ResolvedReference {
                bundle_id: "org.example.Kit".to_string(),
                language: SourceLanguage::Swift,
                path: format!("/documentation{}", paths.get(precise_id)?),
            })
        }
    }

    fn add(h: &mut PathHierarchy, parent: NodeId, name: &str, id: &str, kind: &str) -> NodeId {
        let hash = stable_hash(id);
        h.add_symbol_node(parent, name, SymbolSpelling { hash: &hash, kind, language: &SourceLanguage::Swift, precise_id: id })
    }

    fn fixture() -> Fixture {
        let mut h = PathHierarchy::new();
        let module = add(&mut h, PathHierarchy::ROOT, "Kit", "Kit", "module");
        let kinds = add(&mut h, module, "Kinds", "s:Kinds", "enum");
        add(&mut h, kinds, "thing", "b-case", "enum.case");
        add(&mut h, kinds, "thing", "a-property", "property");
        add(&mut h, kinds, "only", "s:only", "property");
        Fixture { hierarchy: h }
    }

    #[test]
    fn resolves_to_the_canonical_reference() {
        let f = fixture();
        let reference = f.resolve("/Kit/Kinds/thing-enum.case", None).unwrap();
        assert_eq!(reference.path, "/documentation/Kit/Kinds/thing-swift.enum.case");
        assert_eq!(f.resolve("thing-property", Some("s:only")).unwrap().path, "/documentation/Kit/Kinds/thing-swift.property");
    }

    #[test]
    fn ambiguity_offers_sorted_insertions() {
        let f = fixture();
        let failure = f.resolve("/Kit/Kinds/thing", None).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Ambiguous);
        assert_eq!(failure.message, "'thing' is ambiguous at '/Kit/Kinds'");
        let summaries: Vec<_> = failure.solutions.iter().map(|s| s.summary.as_str()).collect();
        assert_eq!(summaries, ["Insert 'property' for\n'a-property'", "Insert 'enum.case' for\n'b-case'"]);
        assert_eq!(failure.solutions[0].apply("/Kit/Kinds/thing"), "/Kit/Kinds/thing-property");
    }

    #[test]
    fn ambiguity_counts_matches_without_a_page() {
        let f = fixture();
        let mut snapshot = LinkResolutionSnapshot::from_hierarchy("org.example.Kit", &f.hierarchy);
        let kinds = snapshot.hierarchy.nodes.iter().position(|n| n.name == "Kinds").unwrap();
        let sparse = snapshot.hierarchy.nodes.len();
        snapshot.hierarchy.nodes.push(SerializedNode {
            children: Vec::new(),
            languages: vec![SourceLanguage::Swift],
            name: "thing".to_string(),
            symbol: None,
        });
        snapshot.hierarchy.nodes[kinds].children.push(SerializedElement {
            hash: None,
            kind: None,
            name: "thing".to_string(),
            node: sparse,
        });
        let f = Fixture { hierarchy: snapshot.into_hierarchy().unwrap() };

        let failure = f.resolve("/Kit/Kinds/thing", None).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Ambiguous);
        assert_eq!(failure.message, "'thing' is ambiguous at '/Kit/Kinds'; 1 of the 3 matches has no documentation page");
        assert_eq!(failure.solutions.len(), 2);
    }

    #[test]
    fn wrong_suffix_offers_replacements() {
        let f = fixture();
        let failure = f.resolve("/Kit/Kinds/thing-class", None).unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidDisambiguation);
        assert_eq!(failure.message, "'class' isn't a disambiguation for 'thing' at '/Kit/Kinds'");
        assert_eq!(failure.solutions[1].apply("/Kit/Kinds/thing-class"), "/Kit/Kinds/thing-enum.case");
    }

    #[test]
    fn wrong_suffix_on_a_single_symbol_offers_removal() {
        let f = fixture();
        let failure = f.resolve("/Kit/Kinds/only-method", None).unwrap_err();
        assert_eq!(failure.solutions.len(), 1);
        assert_eq!(failure.solutions[0].summary, "Remove 'method' for\n's:only'");
        assert_eq!(failure.solutions[0].apply("/Kit/Kinds/only-method"), "/Kit/Kinds/only");
    }

    #[test]
    fn unparseable_links_are_invalid_references() {
        let f = fixture();
        assert_eq!(f.resolve("", None).unwrap_err().kind, FailureKind::InvalidReference);
    }

    #[test]
    fn problems_carry_the_link_identifier() {
        let f = fixture();
        let problem = f.resolve("/Kit/Nope", None).unwrap_err().to_problem("/Kit/Nope");
        assert_eq!(problem.diagnostic.identifier, "symref.link.PathComponentNotFound");
        assert_eq!(problem.diagnostic.summary, "'Nope' doesn't exist at '/Kit'");
        assert_eq!(problem.diagnostic.source.as_deref(), Some("/Kit/Nope"));
    }
}
