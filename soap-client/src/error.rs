//! Errors raised while talking to a ContentDirectory control endpoint

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SoapError {
    /// Connection, timeout or I/O failure before a response was read
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// Non-success HTTP status without a readable SOAP fault
    #[error("HTTP status {status} for {action}")]
    Status { action: String, status: u16 },

    /// Response body is not the expected envelope
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// UPnP error reported in a SOAP fault
    #[error("SOAP fault {0}: {}", fault_description(*.0))]
    Fault(u16),
}

impl SoapError {
    /// UPnP error code when the server answered with a fault
    pub fn fault_code(&self) -> Option<u16> {
        match self {
            SoapError::Fault(code) => Some(*code),
            _ => None,
        }
    }

    /// Whether the request never got a usable answer from the server
    pub fn is_transport(&self) -> bool {
        matches!(self, SoapError::Network(_) | SoapError::Status { .. })
    }
}

/// Meaning of the UPnP error codes a ContentDirectory reports
pub fn fault_description(code: u16) -> &'static str {
    match code {
        401 => "invalid action",
        402 => "invalid args",
        501 => "action failed",
        701 => "no such object",
        702 => "invalid CurrentTagValue",
        703 => "invalid NewTagValue",
        704 => "required tag",
        705 => "read-only tag",
        706 => "parameter mismatch",
        708 => "unsupported or invalid search criteria",
        709 => "unsupported or invalid sort criteria",
        710 => "no such container",
        711 => "restricted object",
        712 => "bad metadata",
        713 => "restricted parent object",
        720 => "cannot process the request",
        _ => "unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_display_names_the_code() {
        assert_eq!(SoapError::Fault(701).to_string(), "SOAP fault 701: no such object");
        assert_eq!(SoapError::Fault(999).to_string(), "SOAP fault 999: unknown error");
    }

    #[test]
    fn test_fault_code() {
        assert_eq!(SoapError::Fault(711).fault_code(), Some(711));
        assert_eq!(SoapError::Parse("x".into()).fault_code(), None);
    }

    #[test]
    fn test_is_transport() {
        let status = SoapError::Status {
            action: "Browse".to_string(),
            status: 404,
        };
        assert!(status.is_transport());
        assert!(SoapError::Network("refused".into()).is_transport());
        assert!(!SoapError::Fault(701).is_transport());
    }
}
