//! Error types for DIDL-Lite parsing

use thiserror::Error;

/// Errors that can occur while parsing DIDL-Lite documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document is not well-formed XML
    #[error("XML deserialization failed: {0}")]
    XmlDeserializationFailed(String),

    /// Well-formed XML that is not a DIDL-Lite document
    #[error("Invalid XML structure: {0}")]
    InvalidXmlStructure(String),

    /// A mandatory field of an object is absent
    #[error("Missing required element: {0}")]
    MissingRequiredElement(String),
}

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
