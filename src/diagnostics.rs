//! Problem reporting: the content contract shared by the relationship merger
//! and link resolution, the collector passes append to, and markdown
//! rendering for the command line.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::Error;

/// ANSI bold, used for markdown headings on a terminal.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Identifier of a relationship whose endpoint is not in the symbol store.
pub const SYMBOL_NOT_FOUND: &str = "symref.relationship.SymbolNotFound";
/// Identifier of a relationship target that can't form a reference path.
pub const INVALID_RELATIONSHIP_REFERENCE: &str = "symref.relationship.InvalidReference";

/// What went wrong, independent of any fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Machine-stable identifier such as `symref.link.Ambiguous`.
    pub identifier: String,
    /// How serious the problem is.
    pub severity: Severity,
    /// Where the problem was found, such as the authored link text.
    pub source: Option<String>,
    /// One-line human-readable summary.
    pub summary: String,
}

/// Collects problems during a pass. Passes only append; the caller reads the
/// result once the pass is over.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    /// Problems in emission order.
    problems: Vec<Problem>,
}

impl DiagnosticCollector {
    /// Empty collector.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Record a problem.
    pub fn emit(&mut self, problem: Problem) {
        tracing::debug!(identifier = %problem.diagnostic.identifier, "{}", problem.diagnostic.summary);
        self.problems.push(problem);
    }

    /// Consume the collector.
    pub fn into_problems(self) -> Vec<Problem> {
        return self.problems;
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        return self.problems.is_empty();
    }

    /// Number of recorded problems.
    pub fn len(&self) -> usize {
        return self.problems.len();
    }

    /// Recorded problems, in emission order.
    pub fn problems(&self) -> &[Problem] {
        return &self.problems;
    }
}

/// A diagnostic and the ways to fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    /// What went wrong.
    pub diagnostic: Diagnostic,
    /// Candidate fixes, most likely first.
    pub solutions: Vec<Solution>,
}

impl Problem {
    /// A relationship names a symbol the store doesn't have.
    pub fn symbol_not_found(precise_id: &str) -> Self {
        return Self {
            diagnostic: Diagnostic {
                identifier: SYMBOL_NOT_FOUND.to_string(),
                severity: Severity::Warning,
                source: None,
                summary: format!("Symbol with identifier '{precise_id}' couldn't be found"),
            },
            solutions: Vec::new(),
        };
    }

    /// A relationship target can't be turned into a reference path.
    pub fn invalid_relationship_reference(precise_id: &str) -> Self {
        return Self {
            diagnostic: Diagnostic {
                identifier: INVALID_RELATIONSHIP_REFERENCE.to_string(),
                severity: Severity::Warning,
                source: None,
                summary: format!("Relationship symbol path '{precise_id}' isn't valid"),
            },
            solutions: Vec::new(),
        };
    }
}

/// A text edit within the source of a problem. Columns are byte offsets into
/// the source text; `start == end` inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    /// End column, exclusive.
    pub end: usize,
    /// Start column.
    pub start: usize,
    /// Text to put in the range.
    pub text: String,
}

/// Severity of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The input is wrong and the result is missing something.
    Error,
    /// The result is usable but degraded.
    Warning,
}

/// One way to fix a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    /// Edits that, applied together, fix the problem.
    pub replacements: Vec<Replacement>,
    /// Human-readable description of the fix.
    pub summary: String,
}

impl Solution {
    /// Apply the edits to `text`. Edits that fall outside the text or split
    /// a character are skipped.
    pub fn apply(&self, text: &str) -> String {
        let mut edits: Vec<&Replacement> = self.replacements.iter().collect();
        edits.sort_by(|a, b| return b.start.cmp(&a.start));

        let mut out = text.to_string();
        for edit in edits {
            if edit.start <= edit.end && out.is_char_boundary(edit.start) && out.is_char_boundary(edit.end) && edit.end <= out.len() {
                out.replace_range(edit.start..edit.end, &edit.text);
            }
        }
        return out;
    }
}

/// Print markdown to stderr, bolding headings.
fn print_markdown(md: &str) {
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    print_markdown(&render_error(e));
}

/// Render a problem as markdown with bold headings and print to stderr.
pub fn print_problem(problem: &Problem) {
    print_markdown(&render_problem(problem));
}

/// Render an error as a structured markdown diagnostic.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Check the `--config` path, or remove it to use `.symref.toml`.
", path.display()),

        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),

        Error::NoSymbolGraphs { .. } => format!("\
# Error: No Symbol Graphs

{e}

## Fix

Pass `--graph <FILE-OR-DIR>`, or list paths under `symbol_graphs` in `.symref.toml`.
"),

        Error::SnapshotCorrupt { reason } => format!("\
# Error: Snapshot Corrupt

{reason}

## Fix

Regenerate the snapshot:

    symref snapshot --output <DIR>
"),

        Error::SnapshotVersion { expected, found } => format!("\
# Error: Snapshot Version

The snapshot was written with schema version {found}; this build reads version {expected}.

## Fix

Regenerate the snapshot with this version of symref.
"),

        Error::Io(err) => format!("\
# Error: I/O

{err}
"),
        Error::Json(err) => format!("\
# Error: Invalid JSON

{err}
"),
        Error::TomlDe(err) => format!("\
# Error: Invalid TOML

{err}
"),
    };
}

/// Render a problem as markdown: the summary, the source it was found in,
/// and one bullet per solution showing the fixed text when there is one.
pub fn render_problem(problem: &Problem) -> String {
    let heading = match problem.diagnostic.severity {
        Severity::Error => "Error",
        Severity::Warning => "Warning",
    };
    let mut out = format!("\
# {heading}: {}

{}
", problem.diagnostic.identifier, problem.diagnostic.summary);

    if let Some(source) = &problem.diagnostic.source {
        let _ = write!(out, "\n    {source}\n");
    }

    if !problem.solutions.is_empty() {
        out.push_str("\n## Fix\n\n");
        for solution in &problem.solutions {
            let summary = solution.summary.replace('\n', " ");
            match &problem.diagnostic.source {
                Some(source) if !solution.replacements.is_empty() => {
                    let _ = writeln!(out, "- {summary}: `{}`", solution.apply(source));
                },
                _ => {
                    let _ = writeln!(out, "- {summary}");
                },
            }
        }
    }

    return out;
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticCollector, Problem, Replacement, Severity, Solution, render_problem};

    #[test]
    fn collector_keeps_emission_order() {
        let mut engine = DiagnosticCollector::new();
        engine.emit(Problem::symbol_not_found("a"));
        engine.emit(Problem::invalid_relationship_reference("b c"));

        let summaries: Vec<_> = engine.problems().iter().map(|p| p.diagnostic.summary.as_str()).collect();
        assert_eq!(summaries, ["Symbol with identifier 'a' couldn't be found", "Relationship symbol path 'b c' isn't valid"]);
        assert!(engine.problems().iter().all(|p| p.diagnostic.severity == Severity::Warning));
    }

    #[test]
    fn solution_applies_insertions_and_replacements() {
        let solution = Solution {
            replacements: vec![
                Replacement { end: 4, start: 4, text: "-enum".to_string() },
                Replacement { end: 9, start: 5, text: "Case".to_string() },
            ],
            summary: String::new(),
        };
        assert_eq!(solution.apply("Kind/case"), "Kind-enum/Case");
    }

    #[test]
    fn solution_skips_out_of_range_edits() {
        let solution = Solution {
            replacements: vec![Replacement { end: 40, start: 30, text: "x".to_string() }],
            summary: String::new(),
        };
        assert_eq!(solution.apply("short"), "short");
    }

    #[test]
    fn render_problem_shows_fixed_links() {
        let mut problem = Problem::symbol_not_found("x");
        problem.diagnostic.severity = Severity::Error;
        problem.diagnostic.source = Some("/Kit/thing".to_string());
        problem.solutions.push(Solution {
            replacements: vec![Replacement { end: 10, start: 10, text: "-enum.case".to_string() }],
            summary: "Insert 'enum.case' for\n'case thing'".to_string(),
        });

        let md = render_problem(&problem);
        assert!(md.starts_with("# Error: symref.relationship.SymbolNotFound"), "{md}");
        assert!(md.contains("- Insert 'enum.case' for 'case thing': `/Kit/thing-enum.case`"), "{md}");
    }
}
