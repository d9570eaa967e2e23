//! ContentDirectory operations
//!
//! One module per UPnP action, following the service they belong to.

pub mod content_directory;

pub use content_directory::{
    BrowseFlag, BrowseOperation, BrowseRequest, BrowseResponse, DestroyObjectOperation,
    GetSearchCapabilitiesOperation, GetSortCapabilitiesOperation, GetSystemUpdateIdOperation,
};
