//! ContentDirectory service operations
//!
//! Operations for listing and managing the media catalog of a UPnP
//! MediaServer.

mod browse;
mod destroy_object;
mod get_search_capabilities;
mod get_sort_capabilities;
mod get_system_update_id;

pub use browse::{BrowseFlag, BrowseOperation, BrowseRequest, BrowseResponse};
pub use destroy_object::{DestroyObjectOperation, DestroyObjectRequest, DestroyObjectResponse};
pub use get_search_capabilities::{
    GetSearchCapabilitiesOperation, GetSearchCapabilitiesRequest, GetSearchCapabilitiesResponse,
};
pub use get_sort_capabilities::{
    GetSortCapabilitiesOperation, GetSortCapabilitiesRequest, GetSortCapabilitiesResponse,
};
pub use get_system_update_id::{
    GetSystemUpdateIdOperation, GetSystemUpdateIdRequest, GetSystemUpdateIdResponse,
};

/// Split a comma separated capability list
pub(crate) fn split_capabilities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
