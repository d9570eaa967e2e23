use soap_client::SoapClient;
use tracing::debug;

use crate::{CdsOperation, Result};

/// A client for executing ContentDirectory operations against media servers
///
/// Bridges the stateless operation definitions and actual network requests.
/// It uses the soap-client crate for the underlying SOAP communication.
#[derive(Debug, Clone, Default)]
pub struct CdsClient {
    soap_client: SoapClient,
}

impl CdsClient {
    /// Create a new client with default HTTP timeouts
    pub fn new() -> Self {
        Self {
            soap_client: SoapClient::new(),
        }
    }

    /// Create a client with a custom SOAP client (for custom timeouts)
    pub fn with_soap_client(soap_client: SoapClient) -> Self {
        Self { soap_client }
    }

    /// Execute an operation against a service control URL
    ///
    /// # Arguments
    /// * `control_url` - Full control URL of the service, from the device description
    /// * `request` - The operation request data
    ///
    /// # Example
    /// ```rust,no_run
    /// use cds_api::CdsClient;
    /// use cds_api::operations::{BrowseOperation, BrowseRequest};
    ///
    /// let client = CdsClient::new();
    /// let request = BrowseRequest::children("0", 0, 10);
    /// let response = client.execute::<BrowseOperation>(
    ///     "http://192.168.1.20:8200/ctl/ContentDir",
    ///     &request,
    /// )?;
    /// println!("{} of {}", response.number_returned, response.total_matches);
    /// # Ok::<(), cds_api::ApiError>(())
    /// ```
    pub fn execute<Op: CdsOperation>(
        &self,
        control_url: &str,
        request: &Op::Request,
    ) -> Result<Op::Response> {
        let service_info = Op::SERVICE.info();
        let payload = Op::build_payload(request);

        debug!(control_url, action = Op::ACTION, "executing operation");

        let xml = self
            .soap_client
            .call(control_url, service_info.service_uri, Op::ACTION, &payload)?;

        Op::parse_response(&xml)
    }
}
