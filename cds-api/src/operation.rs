use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::error::ApiError;
use crate::service::Service;

/// Base trait for all ContentDirectory operations
///
/// Each UPnP action is a zero-sized type implementing this trait; the
/// associated types give the typed request and response and the constants
/// identify the SOAP action.
pub trait CdsOperation {
    /// The request type for this operation
    type Request: Serialize;

    /// The response type for this operation
    type Response: for<'de> Deserialize<'de>;

    /// The UPnP service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Build the argument elements placed inside the action element
    ///
    /// String arguments must be XML-escaped.
    fn build_payload(request: &Self::Request) -> String;

    /// Parse the `<ActionResponse>` element into the typed response
    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError>;
}

/// Text of a direct child of a response element
pub(crate) fn child_text(xml: &Element, name: &str) -> Option<String> {
    xml.get_child(name)
        .and_then(|e| e.get_text())
        .map(|t| t.into_owned())
}
