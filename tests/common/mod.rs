use std::path::{Path, PathBuf};

use symref::context::{ContextOptions, DocumentationContext};
use symref::diagnostics::DiagnosticCollector;
use symref::graph;

pub const BUNDLE_ID: &str = "org.swift.MixedFramework";

pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mixed")
}

/// Context over the Swift and Objective-C graphs of the mixed fixture.
pub fn mixed_context() -> (DocumentationContext, DiagnosticCollector) {
    let graphs = graph::load_all(&[fixture_dir().join("graphs")]).unwrap();
    let options = ContextOptions { bundle_id: BUNDLE_ID.to_string(), inherit_docs: false };
    let mut engine = DiagnosticCollector::new();
    let context = DocumentationContext::build(&graphs, &options, &mut engine);
    (context, engine)
}
