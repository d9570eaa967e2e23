//! GetSystemUpdateID operation for ContentDirectory service

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::operation::child_text;
use crate::{ApiError, CdsOperation, Service};

/// GetSystemUpdateID operation
pub struct GetSystemUpdateIdOperation;

/// Request for GetSystemUpdateID operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetSystemUpdateIdRequest;

/// Response for GetSystemUpdateID operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetSystemUpdateIdResponse {
    /// Server-wide change counter, bumped on every catalog modification
    #[serde(rename = "Id")]
    pub id: u32,
}

impl CdsOperation for GetSystemUpdateIdOperation {
    type Request = GetSystemUpdateIdRequest;
    type Response = GetSystemUpdateIdResponse;

    const SERVICE: Service = Service::ContentDirectory;
    const ACTION: &'static str = "GetSystemUpdateID";

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let id = child_text(xml, "Id")
            .ok_or_else(|| ApiError::ParseError("Missing Id element".to_string()))?;

        let id = id
            .trim()
            .parse::<u32>()
            .map_err(|_| ApiError::ParseError(format!("Invalid Id value: {}", id)))?;

        Ok(GetSystemUpdateIdResponse { id })
    }
}
