/// UPnP services this crate talks to on a media server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// ContentDirectory service - browse and manage the media catalog
    ContentDirectory,
}

/// Static information about a UPnP service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// The UPnP service URI used in SOAP requests
    pub service_uri: &'static str,
}

impl Service {
    /// Get the name of this service as a string
    pub fn name(&self) -> &'static str {
        match self {
            Service::ContentDirectory => "ContentDirectory",
        }
    }

    /// Get the service information for this service
    ///
    /// Control URLs are not part of it: media servers publish them in their
    /// device description, so they come from discovery.
    pub fn info(&self) -> ServiceInfo {
        match self {
            Service::ContentDirectory => ServiceInfo {
                service_uri: "urn:schemas-upnp-org:service:ContentDirectory:1",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_directory_info() {
        let info = Service::ContentDirectory.info();
        assert_eq!(info.service_uri, "urn:schemas-upnp-org:service:ContentDirectory:1");
        assert_eq!(Service::ContentDirectory.name(), "ContentDirectory");
    }
}
