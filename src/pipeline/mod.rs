//! Pipeline stages for résumé-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the two heavyweight collaborators (the browser and
//! the PDF writer) can be faked.
//!
//! ## Data Flow
//!
//! ```text
//! load ──▶ preprocess ──▶ template ──▶ export ──▶ brand
//! (parse+schema) (summary/website) (HTML) (Chromium) (lopdf)
//! ```
//!
//! 1. [`load`]: read the file, parse as JSON then JSON5, validate through
//!    [`schema`]
//! 2. [`preprocess`]: render `summary` markdown and structure `website` URLs
//!    anywhere in the tree
//! 3. [`template`]: handlebars with the [`crate::helpers`] bindings
//! 4. [`export`]: HTML → PDF through the [`export::PdfExporter`] trait
//! 5. [`brand`]: stamp the branding bar on every page, in place
//!
//! [`input`] holds the path precondition and file I/O shared by the stages.

pub mod brand;
pub mod export;
pub mod input;
pub mod load;
pub mod preprocess;
pub mod schema;
pub mod template;
