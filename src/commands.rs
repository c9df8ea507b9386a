//! CLI commands for symref: resolve, snapshot, merge, dump.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;
use symref::config::Config;
use symref::context::{ContextOptions, DocumentationContext};
use symref::diagnostics::{self, DiagnosticCollector, Problem};
use symref::error::Error;
use symref::graph;
use symref::resolver::{ExternalResolver, HierarchySource};
use symref::snapshot::write_summaries;
use symref::symbol::{Symbol, TopicGraph};

/// File the snapshot command writes the hierarchy to.
pub const HIERARCHY_FILE: &str = "link-hierarchy.json";

/// File the snapshot command writes the summaries to.
pub const SUMMARIES_FILE: &str = "linkable-entities.json";

/// Where the symbol graphs come from and how to build the context.
/// Empty or unset fields fall back to `.symref.toml`.
pub struct Inputs {
    /// Bundle identifier override.
    pub bundle_id: Option<String>,
    /// Explicit config file instead of `./.symref.toml`.
    pub config: Option<PathBuf>,
    /// Symbol graph files or directories.
    pub graphs: Vec<PathBuf>,
    /// Keep documentation inherited from other modules.
    pub inherit_docs: bool,
}

/// Merged model as the merge command prints it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeReport<'c> {
    /// Problems the merge reported.
    problems: &'c [Problem],
    /// Every symbol after merging.
    symbols: Vec<&'c Symbol>,
    /// Curation edges.
    topic_graph: &'c TopicGraph,
}

/// Print the path hierarchy with disambiguated names.
///
/// # Errors
///
/// Returns errors from config loading or symbol graph loading.
pub fn dump(inputs: &Inputs) -> Result<ExitCode, Error> {
    let (context, problems) = load_context(inputs)?;
    print_problems(&problems);
    print!("{}", context.hierarchy().dump());
    return Ok(ExitCode::SUCCESS);
}

/// Build the context described by `inputs`, returning the problems the
/// pass reported alongside it.
///
/// # Errors
///
/// Returns errors from config loading or symbol graph loading.
fn load_context(inputs: &Inputs) -> Result<(DocumentationContext, Vec<Problem>), Error> {
    let config = match &inputs.config {
        Some(path) => Config::load_file(path)?,
        None => Config::load(Path::new("."))?,
    };
    let paths = if inputs.graphs.is_empty() { config.symbol_graphs.clone() } else { inputs.graphs.clone() };
    let graphs = graph::load_all(&paths)?;

    let options = ContextOptions {
        bundle_id: inputs.bundle_id.clone().unwrap_or_else(|| return config.bundle_id().to_string()),
        inherit_docs: inputs.inherit_docs || config.inherit_docs,
    };
    let mut engine = DiagnosticCollector::new();
    let context = DocumentationContext::build(&graphs, &options, &mut engine);
    return Ok((context, engine.into_problems()));
}

/// Merge relationships and print the resulting model as JSON.
/// Exits 1 when the merge reported problems.
///
/// # Errors
///
/// Returns errors from config loading, symbol graph loading, or JSON
/// serialization.
pub fn merge(inputs: &Inputs) -> Result<ExitCode, Error> {
    let (context, problems) = load_context(inputs)?;
    let report = MergeReport {
        problems: &problems,
        symbols: context.store().iter().map(|(_, symbol)| return symbol).collect(),
        topic_graph: context.topic_graph(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    print_problems(&problems);
    if problems.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    return Ok(ExitCode::from(1));
}

/// Print problems as markdown on stderr.
fn print_problems(problems: &[Problem]) {
    for problem in problems {
        diagnostics::print_problem(problem);
    }
}

/// Resolve each link, printing its reference or its problem.
/// Exits 1 when any link fails. Merge problems printed beforehand don't
/// change the exit code.
fn resolve_all(source: &impl HierarchySource, links: &[String], from: Option<&str>) -> ExitCode {
    let mut failures = 0_u32;
    for link in links {
        match source.resolve(link, from) {
            Ok(reference) => println!("{link} -> {reference}"),
            Err(failure) => {
                failures = failures.saturating_add(1);
                diagnostics::print_problem(&failure.to_problem(link));
            },
        }
    }

    if failures > 0 {
        eprintln!("{failures} of {} links failed to resolve", links.len());
        return ExitCode::from(1);
    }
    return ExitCode::SUCCESS;
}

/// Resolve links against the symbol graphs in `inputs`.
///
/// # Errors
///
/// Returns errors from config loading or symbol graph loading.
pub fn resolve_local(inputs: &Inputs, links: &[String], from: Option<&str>) -> Result<ExitCode, Error> {
    let (context, problems) = load_context(inputs)?;
    print_problems(&problems);
    return Ok(resolve_all(&context.local_resolver(), links, from));
}

/// Resolve links against another build's snapshot and summaries.
///
/// # Errors
///
/// Returns errors from reading or validating the snapshot or summaries.
pub fn resolve_external(snapshot: &Path, summaries: &Path, links: &[String], from: Option<&str>) -> Result<ExitCode, Error> {
    let resolver = ExternalResolver::read(snapshot, summaries)?;
    return Ok(resolve_all(&resolver, links, from));
}

/// Write the hierarchy snapshot and linkable-element summaries to `output`.
///
/// # Errors
///
/// Returns errors from config loading, symbol graph loading, or writing the
/// output files.
pub fn snapshot(inputs: &Inputs, output: &Path) -> Result<ExitCode, Error> {
    let (context, problems) = load_context(inputs)?;
    print_problems(&problems);

    std::fs::create_dir_all(output)?;
    context.snapshot().write(&output.join(HIERARCHY_FILE))?;
    let summaries = context.linkable_summaries();
    write_summaries(&output.join(SUMMARIES_FILE), &summaries)?;

    println!("Wrote {} linkable symbols to {}", summaries.len(), output.display());
    return Ok(ExitCode::SUCCESS);
}
