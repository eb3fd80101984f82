/// Cognito Identity client speaking the AWS JSON 1.1 protocol
use crate::{
    config::ResolverConfig,
    error::{CredsError, CredsResult},
    federation::{FederationClient, GetIdResponse},
    identity::CredentialEnvelope,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CONTENT_TYPE_AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityService";

#[derive(Debug, Serialize)]
struct GetIdRequest<'a> {
    #[serde(rename = "IdentityPoolId")]
    identity_pool_id: &'a str,
}

#[derive(Debug, Serialize)]
struct GetCredentialsForIdentityRequest<'a> {
    #[serde(rename = "IdentityId", skip_serializing_if = "Option::is_none")]
    identity_id: Option<&'a str>,
}

/// Error body returned by the service on non-2xx responses
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Unsigned Cognito Identity client
///
/// `GetId` and `GetCredentialsForIdentity` on unauthenticated pools need no
/// caller credentials, so requests carry no signature.
#[derive(Clone)]
pub struct CognitoIdentityClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl CognitoIdentityClient {
    /// Build a client for the configured region or custom endpoint
    pub fn new(config: &ResolverConfig) -> CredsResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("guest-credentials/", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| CredsError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: config.federation_endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<B: Serialize, R: DeserializeOwned>(&self, operation: &str, body: &B) -> CredsResult<R> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_AMZ_JSON));
        let target = HeaderValue::from_str(&format!("{}.{}", TARGET_PREFIX, operation))
            .map_err(|e| CredsError::Internal(format!("Invalid operation name: {}", e)))?;
        headers.insert("X-Amz-Target", target);

        debug!("Cognito {} -> {}", operation, self.endpoint);

        let response = self
            .http_client
            .post(&self.endpoint)
            .headers(headers)
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(service_error(status, &bytes));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Map an error response to a federation error
fn service_error(status: reqwest::StatusCode, body: &[u8]) -> CredsError {
    let parsed: Option<ServiceErrorBody> = serde_json::from_slice(body).ok();

    let code = parsed
        .as_ref()
        .and_then(|b| b.error_type.as_deref())
        // Types may be namespaced, e.g. "com.amazon...#NotAuthorizedException"
        .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let message = parsed
        .and_then(|b| b.message)
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

    CredsError::federation(code, message)
}

#[async_trait]
impl FederationClient for CognitoIdentityClient {
    async fn get_id(&self, identity_pool_id: &str) -> CredsResult<GetIdResponse> {
        self.call("GetId", &GetIdRequest { identity_pool_id }).await
    }

    async fn get_credentials_for_identity(
        &self,
        identity_id: Option<&str>,
    ) -> CredsResult<CredentialEnvelope> {
        self.call(
            "GetCredentialsForIdentity",
            &GetCredentialsForIdentityRequest { identity_id },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_absent_identity_is_omitted() {
        let body = serde_json::to_string(&GetCredentialsForIdentityRequest { identity_id: None }).unwrap();
        assert_eq!(body, "{}");

        let body = serde_json::to_string(&GetCredentialsForIdentityRequest {
            identity_id: Some("us-east-1:abc"),
        })
        .unwrap();
        assert_eq!(body, r#"{"IdentityId":"us-east-1:abc"}"#);
    }

    #[test]
    fn test_service_error_parsing() {
        let body = br#"{"__type":"com.amazonaws.cognito.identity#ResourceNotFoundException","message":"IdentityPool 'x' not found."}"#;
        match service_error(StatusCode::BAD_REQUEST, body) {
            CredsError::Federation { code, message } => {
                assert_eq!(code, "ResourceNotFoundException");
                assert_eq!(message, "IdentityPool 'x' not found.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_service_error_with_capitalized_message() {
        let body = br#"{"__type":"NotAuthorizedException","Message":"Unauthenticated access is not supported"}"#;
        match service_error(StatusCode::BAD_REQUEST, body) {
            CredsError::Federation { code, message } => {
                assert_eq!(code, "NotAuthorizedException");
                assert_eq!(message, "Unauthenticated access is not supported");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_service_error_non_json_body() {
        match service_error(StatusCode::BAD_GATEWAY, b"upstream down") {
            CredsError::Federation { code, message } => {
                assert_eq!(code, "HTTP 502");
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = ResolverConfig::new("pool").with_region("ap-southeast-2");
        let client = CognitoIdentityClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "https://cognito-identity.ap-southeast-2.amazonaws.com/");
    }
}
