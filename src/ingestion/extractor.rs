//! Text extraction from uploaded document bytes
//!
//! Extraction never touches the network. PDF extraction runs on a helper
//! thread with a hard timeout so a pathological file cannot wedge the
//! ingestion path.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::FileKind;

/// Maximum time to spend extracting text from a single PDF.
const PDF_EXTRACT_TIMEOUT_SECS: u64 = 60;

/// Plain text recovered from a document, plus what we learned on the way.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub kind: FileKind,
    pub text: String,
    /// Page count for paginated formats, `None` for flat text files.
    pub pages: Option<u32>,
}

/// Stateless extractor dispatching on detected file kind.
pub struct TextExtractor;

impl TextExtractor {
    /// Extract plain text from raw document bytes.
    ///
    /// The kind is detected from the filename extension, falling back to
    /// content sniffing for PDFs delivered without a useful name. A document
    /// that yields no text at all is not an error here; whitespace-only
    /// output counts as no text.
    pub fn extract(filename: &str, data: &[u8]) -> Result<ExtractedText> {
        let kind = Self::detect_kind(filename, data)?;
        let mut extracted = match kind {
            FileKind::Pdf => Self::extract_pdf(filename, data)?,
            FileKind::Text | FileKind::Markdown => ExtractedText {
                kind,
                text: Self::extract_plain(data),
                pages: None,
            },
        };
        // Blank pages come back as bare newlines; downstream treats the
        // document as empty rather than chunking whitespace.
        if extracted.text.trim().is_empty() {
            extracted.text.clear();
        }
        Ok(extracted)
    }

    fn detect_kind(filename: &str, data: &[u8]) -> Result<FileKind> {
        if let Some(kind) = FileKind::from_name(filename) {
            return Ok(kind);
        }
        if data.starts_with(b"%PDF-") {
            return Ok(FileKind::Pdf);
        }
        Err(Error::extraction(
            filename,
            "unsupported file type (expected .pdf, .txt, or .md)",
        ))
    }

    fn extract_plain(data: &[u8]) -> String {
        String::from_utf8_lossy(data).replace("\r\n", "\n")
    }

    fn extract_pdf(filename: &str, data: &[u8]) -> Result<ExtractedText> {
        if !data.starts_with(b"%PDF-") {
            return Err(Error::extraction(
                filename,
                "not a valid PDF (missing %PDF- header)",
            ));
        }

        // Structural validation up front gives much better error messages
        // than letting the text extractor fail mid-parse.
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::extraction(filename, format!("corrupt or unreadable PDF: {e}")))?;
        if doc.is_encrypted() {
            return Err(Error::extraction(
                filename,
                "encrypted PDF documents are not supported",
            ));
        }
        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(Error::extraction(filename, "PDF contains no pages"));
        }
        drop(doc);

        let pages = Self::extract_pdf_pages_with_timeout(filename, data)?;
        let text = Self::cleanup_pdf_text(&pages.join("\n"));

        Ok(ExtractedText {
            kind: FileKind::Pdf,
            text,
            pages: Some(page_count),
        })
    }

    /// Run pdf-extract on a helper thread so we can bail out after a fixed
    /// timeout. The library is synchronous and has no cancellation hook, so
    /// on timeout the thread is left to finish in the background.
    fn extract_pdf_pages_with_timeout(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let (tx, rx) = mpsc::channel();
        let bytes = data.to_vec();

        thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem_by_pages(&bytes);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(PDF_EXTRACT_TIMEOUT_SECS)) {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(Error::extraction(
                filename,
                format!("failed to extract text: {e}"),
            )),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::extraction(
                filename,
                format!("text extraction timed out after {PDF_EXTRACT_TIMEOUT_SECS}s"),
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::extraction(
                filename,
                "text extraction thread terminated unexpectedly",
            )),
        }
    }

    /// Normalize extractor artifacts: ligatures, smart punctuation, NUL bytes.
    fn cleanup_pdf_text(text: &str) -> String {
        text.replace('\u{FB00}', "ff")
            .replace('\u{FB01}', "fi")
            .replace('\u{FB02}', "fl")
            .replace('\u{FB03}', "ffi")
            .replace('\u{FB04}', "ffl")
            .replace(['\u{2018}', '\u{2019}'], "'")
            .replace(['\u{201C}', '\u{201D}'], "\"")
            .replace(['\u{2013}', '\u{2014}'], "-")
            .replace('\u{0}', "")
            .replace("\r\n", "\n")
    }
}
