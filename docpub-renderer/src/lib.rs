//! # docpub-renderer
//!
//! Converts markdown sources into standalone HTML pages for remotes that
//! cannot render markdown themselves.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docpub_core::DocumentMetadata;
//! use docpub_renderer::{Converter, HtmlConverter};
//!
//! fn publish_preview() {
//!     if let Ok(converter) = HtmlConverter::new(".", "target/docpub", None) {
//!         let doc = DocumentMetadata::new("README.md", "Readme");
//!         if let Ok(path) = converter.convert(&doc) {
//!             println!("{}", path.display());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod converter;
pub mod engine;
pub mod error;

pub use context::PageContext;
pub use converter::{Converter, HtmlConverter};
pub use engine::{markdown_to_html, TemplateEngine};
pub use error::ConversionError;
