//! Branding: stamp a solid bar along the bottom of every PDF page.
//!
//! ## Geometry
//!
//! PDF user space has its origin at the bottom-left and 72 units per inch.
//! The first page's height fixes the scale for the whole document: the page
//! is taken to be `reference_page_height_inches` tall, so one inch is
//! `height / reference` units and the bar is `bar_height_inches` of those.
//! Each bar then spans the full width of its own page, starting at that
//! page's media box origin. For a 612×792 letter page with the defaults the
//! bar is 612×18.
//!
//! ## Content isolation
//!
//! A page's existing content streams are wrapped in a `q`/`Q` pair and the
//! bar is appended after them, so the bar is drawn in default user space
//! whatever graphics state the original content leaves behind. The original
//! streams are referenced, never rewritten.
//!
//! ## Why spawn_blocking?
//!
//! Parsing and serialising the PDF is synchronous CPU work; running it on the
//! blocking pool keeps the async runtime responsive.

use crate::config::BrandingConfig;
use crate::error::Resume2PdfError;
use crate::pipeline::input::{map_read_error, require_absolute};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bound on `Parent` hops when resolving an inherited media box.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// A page's media box in PDF user-space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PageGeometry {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Build from a four-number `MediaBox` array, normalising corner order.
    ///
    /// `page` is the 1-based page number used in errors.
    pub fn from_media_box(page: usize, values: &[Object]) -> Result<Self, Resume2PdfError> {
        let invalid = |detail: String| Resume2PdfError::InvalidMediaBox { page, detail };
        if values.len() != 4 {
            return Err(invalid(format!("expected 4 numbers, got {}", values.len())));
        }
        let mut n = [0.0f64; 4];
        for (slot, value) in n.iter_mut().zip(values) {
            *slot = match value {
                Object::Integer(v) => *v as f64,
                Object::Real(v) => f64::from(*v),
                other => return Err(invalid(format!("non-numeric entry {other:?}"))),
            };
        }
        let geometry = Self {
            x0: n[0].min(n[2]),
            y0: n[1].min(n[3]),
            x1: n[0].max(n[2]),
            y1: n[1].max(n[3]),
        };
        if geometry.width() <= 0.0 || geometry.height() <= 0.0 {
            return Err(invalid(format!(
                "degenerate box {}×{}",
                geometry.width(),
                geometry.height()
            )));
        }
        Ok(geometry)
    }
}

/// The filled rectangle drawn on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrandingBar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Fill as normalised RGB.
    pub color: (f32, f32, f32),
}

impl BrandingBar {
    /// A bar of `height` units across the bottom of `page`.
    pub fn for_page(page: &PageGeometry, height: f64, color: (f32, f32, f32)) -> Self {
        Self {
            x: page.x0,
            y: page.y0,
            width: page.width(),
            height,
            color,
        }
    }

    /// Content-stream operators: fill, no stroke, own graphics state.
    pub fn operations(&self) -> Vec<Operation> {
        let (r, g, b) = self.color;
        vec![
            Operation::new("q", vec![]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new(
                "re",
                vec![
                    (self.x as f32).into(),
                    (self.y as f32).into(),
                    (self.width as f32).into(),
                    (self.height as f32).into(),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]
    }

    pub fn encode(&self) -> Result<Vec<u8>, lopdf::Error> {
        Content {
            operations: self.operations(),
        }
        .encode()
    }
}

/// Bar height in PDF units for a document whose first page is `page_height` tall.
pub fn bar_height(page_height: f64, config: &BrandingConfig) -> f64 {
    page_height / config.reference_page_height_inches * config.bar_height_inches
}

/// Resolve a page's media box, following `Parent` links and references.
pub fn page_geometry(
    doc: &Document,
    page_number: usize,
    page_id: ObjectId,
) -> Result<PageGeometry, Resume2PdfError> {
    let invalid = |detail: String| Resume2PdfError::InvalidMediaBox {
        page: page_number,
        detail,
    };
    let mut node = page_id;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        let dict = doc.get_dictionary(node).map_err(|e| invalid(e.to_string()))?;
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let values = resolve(doc, media_box)
                .and_then(Object::as_array)
                .map_err(|e| invalid(e.to_string()))?;
            return PageGeometry::from_media_box(page_number, values);
        }
        node = match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => parent,
            Err(_) => return Err(invalid("no MediaBox on the page or its ancestors".into())),
        };
    }
    Err(invalid("Parent chain too deep".into()))
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> lopdf::Result<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

/// The page's content streams as a flat list of objects.
fn existing_contents(doc: &Document, page_id: ObjectId) -> lopdf::Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };
    if let Object::Array(items) = contents {
        return Ok(items.clone());
    }
    match resolve(doc, contents)? {
        Object::Array(items) => Ok(items.clone()),
        _ => Ok(vec![contents.clone()]),
    }
}

/// Append `bar` to a page, wrapping the existing content in `q`/`Q`.
fn stamp_page(doc: &mut Document, page_id: ObjectId, bar: &BrandingBar) -> lopdf::Result<()> {
    let existing = existing_contents(doc, page_id)?;
    let bar_id = doc.add_object(Stream::new(dictionary! {}, bar.encode()?));

    let contents = if existing.is_empty() {
        vec![Object::Reference(bar_id)]
    } else {
        let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let restore_id = doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));
        let mut all = Vec::with_capacity(existing.len() + 3);
        all.push(Object::Reference(save_id));
        all.extend(existing);
        all.push(Object::Reference(restore_id));
        all.push(Object::Reference(bar_id));
        all
    };

    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Draw the branding bar on every page of `doc`. Returns the page count.
///
/// `source` only labels errors.
pub fn brand_document(
    doc: &mut Document,
    config: &BrandingConfig,
    source: &Path,
) -> Result<usize, Resume2PdfError> {
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let Some(&first) = pages.first() else {
        return Err(Resume2PdfError::EmptyPdf {
            path: source.to_path_buf(),
        });
    };

    let height = bar_height(page_geometry(doc, 1, first)?.height(), config);
    let color = config.rgb();
    debug!("Branding bar height: {height:.2} units");

    for (index, &page_id) in pages.iter().enumerate().rev() {
        let geometry = page_geometry(doc, index + 1, page_id)?;
        let bar = BrandingBar::for_page(&geometry, height, color);
        stamp_page(doc, page_id, &bar).map_err(|e| annotation_error(source, e))?;
    }
    Ok(pages.len())
}

/// Brand the PDF at `path` in place. Returns the page count.
///
/// The result is written to a sibling temp file and renamed over `path`.
pub async fn brand(path: &Path, config: &BrandingConfig) -> Result<usize, Resume2PdfError> {
    require_absolute(path, "PDF path")?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| map_read_error(path.to_path_buf(), e))?;

    let source = path.to_path_buf();
    let config = *config;
    let (branded, pages) = tokio::task::spawn_blocking(move || brand_bytes(&bytes, &config, &source))
        .await
        .map_err(|e| Resume2PdfError::Internal(format!("Branding task panicked: {}", e)))??;

    write_atomic(path, &branded).await?;
    info!("Branded {} page(s) of {}", pages, path.display());
    Ok(pages)
}

/// Brand an in-memory PDF, returning the new bytes and the page count.
pub fn brand_bytes(
    bytes: &[u8],
    config: &BrandingConfig,
    source: &Path,
) -> Result<(Vec<u8>, usize), Resume2PdfError> {
    let mut doc = Document::load_mem(bytes).map_err(|e| annotation_error(source, e))?;
    let pages = brand_document(&mut doc, config, source)?;
    let mut out = Vec::with_capacity(bytes.len() + 512);
    doc.save_to(&mut out)
        .map_err(|e| annotation_error(source, e))?;
    Ok((out, pages))
}

/// Number of pages in the PDF at `path`.
pub async fn page_count(path: &Path) -> Result<usize, Resume2PdfError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| map_read_error(path.to_path_buf(), e))?;
    let source = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        Document::load_mem(&bytes)
            .map(|doc| doc.get_pages().len())
            .map_err(|e| annotation_error(&source, e))
    })
    .await
    .map_err(|e| Resume2PdfError::Internal(format!("PDF inspection task panicked: {}", e)))?
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Resume2PdfError> {
    let write_failed = |source: std::io::Error| Resume2PdfError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let tmp_path = tmp_sibling(path);
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_failed)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_failed(e));
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".branding.tmp");
    path.with_file_name(name)
}

fn annotation_error(path: &Path, e: impl std::fmt::Display) -> Resume2PdfError {
    Resume2PdfError::Annotation {
        path: path.to_path_buf(),
        detail: e.to_string(),
    }
}
