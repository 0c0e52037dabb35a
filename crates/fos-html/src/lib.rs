//! fOS HTML Parser
//!
//! HTML5 parsing built on html5ever, producing a `fos_dom::Document`, and
//! outerHTML serialization of the (possibly annotated) result.

mod parser;
mod serializer;

pub use fos_dom::Document;
pub use parser::HtmlParser;
pub use serializer::HtmlSerializer;

/// Parse an HTML string into a document
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Serialize a whole document back to markup
pub fn serialize(document: &Document) -> String {
    HtmlSerializer::new().serialize_inner(document.tree(), document.tree().root())
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build DOM: {0}")]
    Dom(#[from] fos_dom::DomError),
}
