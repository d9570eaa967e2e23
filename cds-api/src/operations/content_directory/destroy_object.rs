//! DestroyObject operation for ContentDirectory service

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::{ApiError, CdsOperation, Service};

/// DestroyObject operation
pub struct DestroyObjectOperation;

/// Request for DestroyObject operation
#[derive(Debug, Clone, Serialize)]
pub struct DestroyObjectRequest {
    pub object_id: String,
}

/// Response for DestroyObject operation
#[derive(Debug, Deserialize)]
pub struct DestroyObjectResponse;

impl CdsOperation for DestroyObjectOperation {
    type Request = DestroyObjectRequest;
    type Response = DestroyObjectResponse;

    const SERVICE: Service = Service::ContentDirectory;
    const ACTION: &'static str = "DestroyObject";

    fn build_payload(request: &Self::Request) -> String {
        format!("<ObjectID>{}</ObjectID>", escape(&request.object_id))
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(DestroyObjectResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroy_object_payload_construction() {
        let request = DestroyObjectRequest {
            object_id: "64$2".to_string(),
        };

        let payload = DestroyObjectOperation::build_payload(&request);
        assert_eq!(payload, "<ObjectID>64$2</ObjectID>");
    }

    #[test]
    fn test_destroy_object_response_parsing() {
        let xml = Element::parse(r#"<DestroyObjectResponse></DestroyObjectResponse>"#.as_bytes()).unwrap();
        assert!(DestroyObjectOperation::parse_response(&xml).is_ok());
    }
}
