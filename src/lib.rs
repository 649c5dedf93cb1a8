#![forbid(unsafe_code)]
//! Pull managed text content from a content API and write it as localization files.
//!
//! Text items (strings that belong to a project), components (a shared library of
//! reusable strings) and variables are fetched according to a [`ProjectConfig`] and
//! written as one of several formats:
//!
//! - **JSON**: one flat object per project and variant, plus `variables.json`
//! - **Android** `strings.xml`, **iOS** `.strings`/`.stringsdict` and **ICU** JSON,
//!   rendered by the API
//! - **Swift**: a generated Swift source file
//! - **i18next / vue-i18n** driver modules on top of JSON output
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use textsync::{FsWriter, HttpContentApi, Pipeline, ProjectConfig, RequestContext};
//!
//! # async fn run() -> Result<(), textsync::Error> {
//! let config: ProjectConfig = r#"{
//!     "projects": [{ "id": "p1" }],
//!     "outputs": [{ "format": "json", "outDir": "./locales", "framework": "i18next" }]
//! }"#
//! .parse()?;
//!
//! let ctx = RequestContext::new(textsync::client::DEFAULT_API_HOST, "api-token");
//! let pipeline = Pipeline::new(Arc::new(HttpContentApi::new()), Arc::new(FsWriter));
//! let report = pipeline.run(&ctx, &config).await?;
//! for path in report.written() {
//!     println!("wrote {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codegen;
pub mod config;
pub mod driver;
pub mod error;
pub mod expand;
pub mod fetch;
pub mod filter;
pub mod formats;
pub mod pipeline;
pub mod types;
pub mod writer;

// Re-export most used types for easy consumption
pub use crate::{
    client::{ContentApi, HttpContentApi, RequestContext, TokenSource},
    config::{Output, ProjectConfig, RichText},
    error::Error,
    formats::OutputFormat,
    pipeline::{OutputReport, Pipeline, RunReport},
    types::{Component, FileContent, OutputFile, TextItem, Variable},
    writer::{FileWriter, FsWriter},
};
