use std::collections::BTreeMap;

use engine_logging::{engine_debug, engine_warn};
use lopdf::{Document, Encoding, Object, ObjectId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("the file could not be read as a PDF ({0})")]
    Unreadable(String),
    #[error("page {page} could not be read ({message})")]
    Page { page: u32, message: String },
}

pub trait TextExtractor: Send + Sync {
    /// Returns the document's text, one line per page, or fails as a whole.
    fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError>;
}

/// Thousandths of a text-space unit; `TJ` gaps wider than this separate words.
const WORD_GAP: f32 = 100.0;

/// Per-page access to a document's text layer.
pub trait PageTextLayer {
    fn page_count(&self) -> u32;
    /// Text fragments of a 1-based page, in extraction order.
    fn page_fragments(&self, page: u32) -> Result<Vec<String>, ExtractionError>;
}

/// Joins each page's fragments with a single space and terminates every page
/// with a newline. Any page error aborts the whole document.
pub fn assemble_text(layer: &dyn PageTextLayer) -> Result<String, ExtractionError> {
    let pages = layer.page_count();
    let mut text = String::new();
    for page in 1..=pages {
        let fragments = layer.page_fragments(page)?;
        text.push_str(&fragments.join(" "));
        text.push('\n');
    }
    engine_debug!("Assembled {} pages into {} bytes", pages, text.len());
    Ok(text)
}

/// Pure-Rust extractor over the PDF text layer. No OCR: image-only pages
/// yield empty lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        let layer = LopdfTextLayer::load(pdf)?;
        assemble_text(&layer)
    }
}

struct LopdfTextLayer {
    document: Document,
    page_ids: Vec<ObjectId>,
}

impl LopdfTextLayer {
    fn load(pdf: &[u8]) -> Result<Self, ExtractionError> {
        let document = Document::load_mem(pdf).map_err(|err| {
            engine_warn!("PDF load failed: {}", err);
            ExtractionError::Unreadable(err.to_string())
        })?;
        let page_ids = document.get_pages().into_values().collect();
        Ok(Self { document, page_ids })
    }

    fn font_encodings(&self, page_id: ObjectId) -> lopdf::Result<BTreeMap<Vec<u8>, Encoding<'_>>> {
        self.document
            .get_page_fonts(page_id)?
            .into_iter()
            .map(|(name, font)| {
                font.get_font_encoding(&self.document)
                    .map(|encoding| (name, encoding))
            })
            .collect()
    }

    /// Each string shown by `Tj`, `TJ`, `'` or `"` is one fragment.
    fn shown_strings(&self, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
        let encodings = self.font_encodings(page_id)?;
        let content = self.document.get_and_decode_page_content(page_id)?;

        let mut current = None;
        let mut fragments = Vec::new();
        for operation in &content.operations {
            let shown = match operation.operator.as_str() {
                "Tf" => {
                    current = operation
                        .operands
                        .first()
                        .and_then(|name| name.as_name().ok())
                        .and_then(|name| encodings.get(name));
                    continue;
                }
                "Tj" | "TJ" | "'" => operation.operands.first(),
                "\"" => operation.operands.get(2),
                _ => continue,
            };
            if let Some(operand) = shown {
                let text = shown_text(current, operand)?;
                let text = text.trim();
                if !text.is_empty() {
                    fragments.push(text.to_string());
                }
            }
        }
        Ok(fragments)
    }
}

fn decode(encoding: Option<&Encoding<'_>>, bytes: &[u8]) -> lopdf::Result<String> {
    match encoding {
        Some(encoding) => Document::decode_text(encoding, bytes),
        None => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Text of one show operand. Inside a `TJ` array a large negative
/// adjustment stands for a word gap.
fn shown_text(encoding: Option<&Encoding<'_>>, operand: &Object) -> lopdf::Result<String> {
    match operand {
        Object::String(bytes, _) => decode(encoding, bytes),
        Object::Array(items) => {
            let mut text = String::new();
            for item in items {
                match item {
                    Object::String(bytes, _) => text.push_str(&decode(encoding, bytes)?),
                    Object::Integer(gap) if *gap < -WORD_GAP as i64 => text.push(' '),
                    Object::Real(gap) if *gap < -WORD_GAP => text.push(' '),
                    _ => {}
                }
            }
            Ok(text)
        }
        _ => Ok(String::new()),
    }
}

impl PageTextLayer for LopdfTextLayer {
    fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    fn page_fragments(&self, page: u32) -> Result<Vec<String>, ExtractionError> {
        let page_id = self
            .page_ids
            .get(page.saturating_sub(1) as usize)
            .copied()
            .ok_or_else(|| ExtractionError::Page {
                page,
                message: "page out of range".to_string(),
            })?;
        self.shown_strings(page_id)
            .map_err(|err| ExtractionError::Page {
                page,
                message: err.to_string(),
            })
    }
}
