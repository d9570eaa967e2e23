//! GetSortCapabilities operation for ContentDirectory service

use serde::{Deserialize, Serialize};
use xmltree::Element;

use super::split_capabilities;
use crate::operation::child_text;
use crate::{ApiError, CdsOperation, Service};

/// GetSortCapabilities operation
pub struct GetSortCapabilitiesOperation;

/// Request for GetSortCapabilities operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetSortCapabilitiesRequest;

/// Response for GetSortCapabilities operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetSortCapabilitiesResponse {
    /// Properties usable in `SortCriteria`; empty when sorting is unsupported
    #[serde(rename = "SortCaps")]
    pub sort_caps: Vec<String>,
}

impl CdsOperation for GetSortCapabilitiesOperation {
    type Request = GetSortCapabilitiesRequest;
    type Response = GetSortCapabilitiesResponse;

    const SERVICE: Service = Service::ContentDirectory;
    const ACTION: &'static str = "GetSortCapabilities";

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let raw = child_text(xml, "SortCaps").unwrap_or_default();
        Ok(GetSortCapabilitiesResponse {
            sort_caps: split_capabilities(&raw),
        })
    }
}
