//! Symbol path hierarchy, link disambiguation, and relationship merging for
//! documentation compilers.
//!
//! A [`context::DocumentationContext`] ingests symbol graphs, merges their
//! relationships into the symbol model, and builds the [`hierarchy`] that
//! authored links resolve against. Links into another documentation set
//! resolve through a [`snapshot`] of its hierarchy with
//! [`resolver::ExternalResolver`], which answers exactly as the local
//! resolver would.

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod hasher;
pub mod hierarchy;
pub mod merger;
pub mod resolver;
pub mod snapshot;
pub mod symbol;
pub mod types;

pub use error::Error;
