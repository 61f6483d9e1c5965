//! Stylesheet build pipeline for assetline.
//!
//! For each source file the [`Pipeline`]:
//!
//! 1. skips partials (`_name.scss`) and files opting out through their
//!    leading comment (`@compile: false`, legacy `@ignore`);
//! 2. compiles the source with a [`StylesheetCompiler`], searching the
//!    configured include paths, the owning module and the application root;
//! 3. rewrites `url(...)` and `@import` references in the output into
//!    absolute module-qualified URLs.
//!
//! [`GrassCompiler`] is the default compiler. Tests and embedders can supply
//! their own implementation.

mod compiler;
mod pipeline;
mod skip;

pub use compiler::{CompileError, CompileOptions, CompiledCss, GrassCompiler, StylesheetCompiler};
pub use pipeline::{Outcome, Pipeline, PipelineError, PipelineSettings};
pub use skip::{SkipReason, should_skip};
