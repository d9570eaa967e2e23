//! Browse operation for ContentDirectory service

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::operation::child_text;
use crate::{ApiError, CdsOperation, Service};

/// Browse operation
pub struct BrowseOperation;

/// What a Browse request returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrowseFlag {
    /// The object itself, with its full metadata
    BrowseMetadata,
    /// The direct children of a container
    BrowseDirectChildren,
}

impl BrowseFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowseFlag::BrowseMetadata => "BrowseMetadata",
            BrowseFlag::BrowseDirectChildren => "BrowseDirectChildren",
        }
    }
}

/// Request for Browse operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseRequest {
    pub object_id: String,
    pub browse_flag: BrowseFlag,
    pub filter: String,
    pub starting_index: u32,
    /// 0 asks for every remaining object
    pub requested_count: u32,
    pub sort_criteria: String,
}

impl BrowseRequest {
    /// Children of `object_id` with every property and server ordering
    pub fn children(object_id: impl Into<String>, starting_index: u32, requested_count: u32) -> Self {
        Self {
            object_id: object_id.into(),
            browse_flag: BrowseFlag::BrowseDirectChildren,
            filter: "*".to_string(),
            starting_index,
            requested_count,
            sort_criteria: String::new(),
        }
    }

    /// Full metadata of `object_id`
    pub fn metadata(object_id: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            browse_flag: BrowseFlag::BrowseMetadata,
            filter: filter.into(),
            starting_index: 0,
            requested_count: 0,
            sort_criteria: String::new(),
        }
    }
}

/// Response for Browse operation
///
/// Counters are kept signed: a missing or unparseable counter is stored as
/// `-1` so that [`BrowseResponse::is_malformed`] catches it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrowseResponse {
    /// DIDL-Lite document, already unescaped
    #[serde(rename = "Result")]
    pub result: String,
    #[serde(rename = "NumberReturned")]
    pub number_returned: i64,
    #[serde(rename = "TotalMatches")]
    pub total_matches: i64,
    #[serde(rename = "UpdateID")]
    pub update_id: i64,
}

impl BrowseResponse {
    /// Whether any counter is negative
    pub fn is_malformed(&self) -> bool {
        self.number_returned < 0 || self.total_matches < 0 || self.update_id < 0
    }
}

impl CdsOperation for BrowseOperation {
    type Request = BrowseRequest;
    type Response = BrowseResponse;

    const SERVICE: Service = Service::ContentDirectory;
    const ACTION: &'static str = "Browse";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<ObjectID>{}</ObjectID><BrowseFlag>{}</BrowseFlag><Filter>{}</Filter><StartingIndex>{}</StartingIndex><RequestedCount>{}</RequestedCount><SortCriteria>{}</SortCriteria>",
            escape(&request.object_id),
            request.browse_flag.as_str(),
            escape(&request.filter),
            request.starting_index,
            request.requested_count,
            escape(&request.sort_criteria),
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let counter = |name: &str| {
            child_text(xml, name)
                .and_then(|t| t.trim().parse::<i64>().ok())
                .unwrap_or(-1)
        };

        Ok(BrowseResponse {
            result: child_text(xml, "Result").unwrap_or_default(),
            number_returned: counter("NumberReturned"),
            total_matches: counter("TotalMatches"),
            update_id: counter("UpdateID"),
        })
    }
}
