//! PDF text extraction using lopdf and pdf-extract.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace};

use super::{Result, TextSource};
use crate::error::PdfError;

/// PDF text extractor using lopdf for loading and pdf-extract for text.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF from bytes.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract works on bytes, so hand it the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    /// Get the number of pages in the loaded PDF.
    pub fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    /// Extract text from the loaded PDF, one page per block, pages joined
    /// by newlines.
    ///
    /// pdf-extract panics on some documents lopdf accepts (a text operator
    /// with no font selected, a missing MediaBox). Those panics are caught
    /// and reported as [`PdfError::TextExtraction`].
    pub fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
        }))
        .map_err(|payload| {
            PdfError::TextExtraction(format!("text extractor panicked: {}", panic_message(&*payload)))
        })?
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        // pdf-extract stops at the first page it cannot render
        let expected = self.page_count() as usize;
        if pages.len() < expected {
            return Err(PdfError::TextExtraction(format!(
                "text stopped at page {} of {}",
                pages.len() + 1,
                expected
            )));
        }

        let text = pages.join("\n");
        trace!("Extracted {} chars from {} pages", text.len(), pages.len());
        Ok(text)
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSource for PdfExtractor {
    fn read_text(&self, path: &Path) -> Result<String> {
        let data = fs::read(path)?;

        // Each file gets a fresh document; `self` stays reusable across a run
        let mut extractor = PdfExtractor::new();
        extractor.load(&data)?;
        extractor.extract_text()
    }
}
