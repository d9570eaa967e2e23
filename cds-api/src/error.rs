use cds_didl::ParseError as DidlParseError;
use soap_client::SoapError;
use thiserror::Error;

/// High-level API errors for ContentDirectory operations
///
/// This enum abstracts away the underlying SOAP communication details and
/// gives meaningful errors for the failure scenarios of browsing a media
/// server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection timeouts, DNS resolution failures, unreachable servers and
    /// HTTP errors that carry no SOAP fault.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    ///
    /// The server answered, but the envelope or the DIDL-Lite document in it
    /// could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by the server, with its UPnP error code
    ///
    /// Common ContentDirectory codes are 701 (no such object), 709 (bad sort
    /// criteria), 711 (restricted object) and 720 (cannot process request).
    #[error("SOAP fault {0}: {}", soap_client::fault_description(*.0))]
    SoapFault(u16),

    /// The server's counters disagree with the content it returned
    ///
    /// Negative counters, or a page that claims objects of which none could
    /// be parsed.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The server does not implement the requested action
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Convert from SoapError to ApiError
impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            status @ SoapError::Status { .. } => ApiError::NetworkError(status.to_string()),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault(code) => ApiError::SoapFault(code),
        }
    }
}

/// Convert from a DIDL-Lite document error to ApiError
impl From<DidlParseError> for ApiError {
    fn from(error: DidlParseError) -> Self {
        ApiError::ParseError(error.to_string())
    }
}
