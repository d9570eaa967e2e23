//! GetSearchCapabilities operation for ContentDirectory service

use serde::{Deserialize, Serialize};
use xmltree::Element;

use super::split_capabilities;
use crate::operation::child_text;
use crate::{ApiError, CdsOperation, Service};

/// GetSearchCapabilities operation
pub struct GetSearchCapabilitiesOperation;

/// Request for GetSearchCapabilities operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetSearchCapabilitiesRequest;

/// Response for GetSearchCapabilities operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetSearchCapabilitiesResponse {
    #[serde(rename = "SearchCaps")]
    pub search_caps: Vec<String>,
}

impl CdsOperation for GetSearchCapabilitiesOperation {
    type Request = GetSearchCapabilitiesRequest;
    type Response = GetSearchCapabilitiesResponse;

    const SERVICE: Service = Service::ContentDirectory;
    const ACTION: &'static str = "GetSearchCapabilities";

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let raw = child_text(xml, "SearchCaps").unwrap_or_default();
        Ok(GetSearchCapabilitiesResponse {
            search_caps: split_capabilities(&raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_search_capabilities_wildcard() {
        let xml = Element::parse(
            r#"<GetSearchCapabilitiesResponse><SearchCaps>*</SearchCaps></GetSearchCapabilitiesResponse>"#.as_bytes(),
        )
        .unwrap();
        let result = GetSearchCapabilitiesOperation::parse_response(&xml).unwrap();
        assert_eq!(result.search_caps, vec!["*"]);
    }
}
