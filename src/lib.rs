//! # Weft Template Compiler
//!
//! Compiles hybrid markup templates (markup mixed with server-side host
//! expressions and client-side script) into a semantic token stream, the set
//! of utility attributes templates reference, and one bundled client script
//! for every component with interactive behavior.
//!
//! The grammar is external: anything implementing [`TemplateParser`] produces
//! the [`ParseNode`] tree every consumer walks.
//!
//! ## Pipeline Invariants
//!
//! 1. **One traversal**: every consumer is a [`HandlerTable`] over the same
//!    tree. Handlers run post-order; unhandled kinds fall back to
//!    [`visitor::default_handler`].
//!
//! 2. **Lossless tokens**: semantic tokens are contiguous and their texts
//!    concatenate to the input. Untyped text reaching the merger is
//!    `WEFT-ERR-UNTYPED-FRAGMENT`.
//!
//! 3. **Deterministic identifiers**: a component's identifier depends only on
//!    its declared name and exact source bytes.
//!
//! 4. **Unique bindings**: `ref`/`refall` names are unique per component
//!    (`WEFT-ERR-DUPLICATE-BINDING`).
//!
//! 5. **Scoped failures**: grammar and binding errors abort one file; a
//!    bundler failure aborts only bundling; the scratch tree is removed on
//!    every exit path.

pub mod bundle;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod html;
pub mod identity;
pub mod lexer;
pub mod merge;
pub mod pipeline;
pub mod sublexers;
pub mod token;
pub mod tokenizer;
pub mod tree;
pub mod visitor;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod extractor_tests;
#[cfg(test)]
mod visitor_tests;

pub use bundle::{BundleOutcome, Bundler};
pub use collector::{AttributeSet, Collector, RegexCollector, TreeCollector};
pub use config::{BuildConfig, BundlerConfig};
pub use discovery::{discover_sources, SourceFile};
pub use error::{CompileError, Result, SourceLocation};
pub use extractor::{ComponentDescriptor, ComponentScriptExtractor, Dependency};
pub use html::{HtmlAttributeTable, StandardHtmlAttributes};
pub use pipeline::{BuildPipeline, BuildReport};
pub use token::{Category, SemanticToken, SubLanguage};
pub use tokenizer::{SemanticTokenizer, TokenStream};
pub use tree::{rules, ParseError, ParseNode, TemplateParser};
pub use visitor::{HandlerTable, Value};
