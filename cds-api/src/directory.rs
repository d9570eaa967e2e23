//! The seam between browsing logic and a concrete media server.

use tracing::info;

use crate::operations::content_directory::{
    DestroyObjectRequest, GetSearchCapabilitiesRequest, GetSortCapabilitiesRequest,
    GetSystemUpdateIdRequest,
};
use crate::operations::{
    BrowseOperation, BrowseRequest, BrowseResponse, DestroyObjectOperation,
    GetSearchCapabilitiesOperation, GetSortCapabilitiesOperation, GetSystemUpdateIdOperation,
};
use crate::{ApiError, CdsClient, Result};

/// A remote catalog that can be browsed.
///
/// Implemented over SOAP by [`MediaServer`]; the pager and the navigator
/// only see this trait, so tests can serve catalogs from memory.
pub trait ContentDirectory: Send + Sync {
    /// Identity of the server, copied into every parsed object
    fn server_id(&self) -> &str;

    /// One Browse call
    fn browse(&self, request: &BrowseRequest) -> Result<BrowseResponse>;

    /// Remove an object from the catalog
    fn destroy_object(&self, object_id: &str) -> Result<()>;

    /// Whether the server implements DestroyObject at all
    fn supports_destroy(&self) -> bool;
}

/// A discovered MediaServer's ContentDirectory service
#[derive(Debug, Clone)]
pub struct MediaServer {
    server_id: String,
    control_url: String,
    supports_destroy: bool,
    client: CdsClient,
}

impl MediaServer {
    /// Server identified by `server_id` (usually the device UDN) whose
    /// ContentDirectory control endpoint is `control_url`
    pub fn new(server_id: impl Into<String>, control_url: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            control_url: control_url.into(),
            supports_destroy: false,
            client: CdsClient::new(),
        }
    }

    /// Declare whether the service description lists DestroyObject
    pub fn with_destroy_support(mut self, supported: bool) -> Self {
        self.supports_destroy = supported;
        self
    }

    pub fn with_client(mut self, client: CdsClient) -> Self {
        self.client = client;
        self
    }

    pub fn control_url(&self) -> &str {
        &self.control_url
    }

    pub fn system_update_id(&self) -> Result<u32> {
        let response = self
            .client
            .execute::<GetSystemUpdateIdOperation>(&self.control_url, &GetSystemUpdateIdRequest)?;
        Ok(response.id)
    }

    pub fn sort_capabilities(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .execute::<GetSortCapabilitiesOperation>(&self.control_url, &GetSortCapabilitiesRequest)?;
        Ok(response.sort_caps)
    }

    pub fn search_capabilities(&self) -> Result<Vec<String>> {
        let response = self.client.execute::<GetSearchCapabilitiesOperation>(
            &self.control_url,
            &GetSearchCapabilitiesRequest,
        )?;
        Ok(response.search_caps)
    }
}

impl ContentDirectory for MediaServer {
    fn server_id(&self) -> &str {
        &self.server_id
    }

    fn browse(&self, request: &BrowseRequest) -> Result<BrowseResponse> {
        self.client
            .execute::<BrowseOperation>(&self.control_url, request)
    }

    fn destroy_object(&self, object_id: &str) -> Result<()> {
        if !self.supports_destroy {
            return Err(ApiError::Unsupported("DestroyObject".to_string()));
        }

        let request = DestroyObjectRequest {
            object_id: object_id.to_string(),
        };
        self.client
            .execute::<DestroyObjectOperation>(&self.control_url, &request)?;

        info!(server_id = %self.server_id, object_id, "object destroyed");
        Ok(())
    }

    fn supports_destroy(&self) -> bool {
        self.supports_destroy
    }
}
