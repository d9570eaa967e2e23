//! Navigator configuration
//!
//! Everything the navigator would otherwise read from global settings is
//! passed in through [`NavigatorConfig`].

use cds_api::DEFAULT_PAGE_SIZE;

use crate::error::{NavigatorError, Result};

/// Configuration for a [`crate::Navigator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Object id listed by the bottom context
    /// Default: "0"
    pub root_object_id: String,

    /// Browse filter for listings
    /// Default: "*"
    pub filter: String,

    /// Browse sort criteria; empty keeps server order
    /// Default: ""
    pub sort_criteria: String,

    /// Objects requested per Browse call
    /// Default: 10
    pub page_size: u32,

    /// Browse filter for single-object metadata requests
    /// Default: "*"
    pub metadata_filter: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            root_object_id: "0".to_string(),
            filter: "*".to_string(),
            sort_criteria: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            metadata_filter: "*".to_string(),
        }
    }
}

impl NavigatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small pages and a reduced property set, for slow servers and links
    pub fn low_bandwidth() -> Self {
        Self {
            filter: "dc:title,upnp:class,res,res@protocolInfo".to_string(),
            page_size: 5,
            ..Default::default()
        }
    }

    /// Large pages, for fast local servers with big containers
    pub fn bulk() -> Self {
        Self {
            page_size: 100,
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.root_object_id.is_empty() {
            return Err(NavigatorError::Configuration(
                "Root object id must not be empty".to_string(),
            ));
        }

        if self.page_size == 0 {
            return Err(NavigatorError::Configuration(
                "Page size must be greater than 0".to_string(),
            ));
        }

        if self.filter.is_empty() || self.metadata_filter.is_empty() {
            return Err(NavigatorError::Configuration(
                "Browse filters must not be empty, use \"*\" for every property".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_root_object_id(mut self, id: impl Into<String>) -> Self {
        self.root_object_id = id.into();
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_sort_criteria(mut self, sort_criteria: impl Into<String>) -> Self {
        self.sort_criteria = sort_criteria.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_metadata_filter(mut self, filter: impl Into<String>) -> Self {
        self.metadata_filter = filter.into();
        self
    }
}
