//! PDF text extraction
//!
//! `TextExtraction` wraps any `PageExtractor`, joins page text and reports an
//! empty document as an error of its own: a scanned or image-only PDF must
//! not look like legislation with no obligations in it.

use crate::error::ExtractorError;
use lopdf::Document;
use oblige_domain::{PageExtractor, TextError};
use std::sync::Arc;
use tracing::{debug, info};

/// Join page text, each non-empty page followed by a newline
pub fn assemble_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages.iter().map(AsRef::as_ref).filter(|page| !page.is_empty()) {
        text.push_str(page);
        text.push('\n');
    }
    text
}

/// Empty-aware text extraction over a page extractor
#[derive(Clone)]
pub struct TextExtraction {
    pages: Arc<dyn PageExtractor>,
}

impl TextExtraction {
    /// Wrap a page extractor
    pub fn new(pages: Arc<dyn PageExtractor>) -> Self {
        Self { pages }
    }

    /// Extract the full text of a document.
    ///
    /// # Errors
    ///
    /// - `ExtractionFailed` when the page extractor fails
    /// - `EmptyDocumentText` when the joined text is blank
    pub fn extract_text(&self, document: &[u8]) -> Result<String, ExtractorError> {
        let pages = self.pages.extract_pages(document)?;
        let text = assemble_pages(&pages);

        if text.trim().is_empty() {
            info!(pages = pages.len(), "Document produced no text");
            return Err(ExtractorError::EmptyDocumentText);
        }

        debug!(pages = pages.len(), chars = text.len(), "Extracted document text");
        Ok(text)
    }

    /// Run `extract_text` on the blocking thread pool
    pub async fn extract_text_blocking(&self, document: Vec<u8>) -> Result<String, ExtractorError> {
        let extraction = self.clone();
        tokio::task::spawn_blocking(move || extraction.extract_text(&document))
            .await
            .map_err(|e| ExtractorError::ExtractionFailed(format!("Task join error: {}", e)))?
    }
}

/// Page extractor backed by `lopdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl PageExtractor for LopdfExtractor {
    fn extract_pages(&self, document: &[u8]) -> Result<Vec<String>, TextError> {
        let doc = Document::load_mem(document)
            .map_err(|e| TextError(format!("failed to load PDF: {}", e)))?;

        doc.get_pages()
            .into_keys()
            .map(|page_number| {
                doc.extract_text(&[page_number]).map_err(|e| {
                    TextError(format!("failed to extract page {}: {}", page_number, e))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPages(Result<Vec<String>, TextError>);

    impl PageExtractor for FixedPages {
        fn extract_pages(&self, _document: &[u8]) -> Result<Vec<String>, TextError> {
            self.0.clone()
        }
    }

    fn extraction(pages: Result<Vec<&str>, &str>) -> TextExtraction {
        let pages = pages
            .map(|pages| pages.into_iter().map(String::from).collect())
            .map_err(|e| TextError(e.to_string()));
        TextExtraction::new(Arc::new(FixedPages(pages)))
    }

    #[test]
    fn test_assemble_pages_skips_empty() {
        assert_eq!(assemble_pages(&["one", "", "two"]), "one\ntwo\n");
        assert_eq!(assemble_pages::<&str>(&[]), "");
    }

    #[test]
    fn test_extract_text_joins_pages() {
        let text = extraction(Ok(vec!["Page one.", "", "Page three."]))
            .extract_text(b"pdf")
            .unwrap();
        assert_eq!(text, "Page one.\nPage three.\n");
    }

    #[test]
    fn test_whitespace_only_document_is_empty() {
        let err = extraction(Ok(vec!["", "   ", "\n\t"]))
            .extract_text(b"pdf")
            .unwrap_err();
        assert_eq!(err, ExtractorError::EmptyDocumentText);
    }

    #[test]
    fn test_zero_page_document_is_empty() {
        let err = extraction(Ok(vec![])).extract_text(b"pdf").unwrap_err();
        assert_eq!(err, ExtractorError::EmptyDocumentText);
    }

    #[test]
    fn test_page_extractor_failure_propagates() {
        let err = extraction(Err("corrupt xref")).extract_text(b"pdf").unwrap_err();
        assert_eq!(err, ExtractorError::ExtractionFailed("corrupt xref".to_string()));
    }

    #[tokio::test]
    async fn test_extract_text_blocking() {
        let text = extraction(Ok(vec!["Operators must register."]))
            .extract_text_blocking(b"pdf".to_vec())
            .await
            .unwrap();
        assert_eq!(text, "Operators must register.\n");
    }

    #[test]
    fn test_lopdf_rejects_garbage() {
        let result = LopdfExtractor.extract_pages(b"definitely not a pdf");
        assert!(result.is_err());
    }

    #[test]
    fn test_lopdf_extracts_generated_document() {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Operators must register")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let pages = LopdfExtractor.extract_pages(&bytes).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("Operators must register"));
    }
}
