//! Shared test helpers.

use doctree::Document;
use doctree::raw::{EngineError, Raw, RawDocument, TextEngine};

/// A minimal engine over JSON, enough to exercise the raw boundary. JSON
/// has no comments or layout styles, so headers and style hints do not
/// survive rendering; the body does.
pub struct JsonEngine;

impl TextEngine for JsonEngine {
    fn parse(&self, text: &str) -> Result<RawDocument, EngineError> {
        let body: Raw =
            serde_json::from_str(text).map_err(|err| EngineError::Parse(err.to_string()))?;
        Ok(RawDocument::new(body))
    }

    fn render(&self, doc: &RawDocument) -> Result<String, EngineError> {
        serde_json::to_string_pretty(&doc.body).map_err(|err| EngineError::Render(err.to_string()))
    }
}

/// Parses a JSON document, panicking on failure.
pub fn doc_from_json(text: &str) -> Document {
    Document::parse_with(&JsonEngine, text).expect("test JSON parses")
}
