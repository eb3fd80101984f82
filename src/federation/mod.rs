/// Identity federation service access
///
/// The resolver only needs two calls from the federation service; they are
/// expressed as a trait so tests and alternate transports can stand in for
/// the Cognito client.

pub mod cognito;

pub use cognito::CognitoIdentityClient;

use crate::{error::CredsResult, identity::CredentialEnvelope};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// `GetId` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetIdResponse {
    #[serde(rename = "IdentityId")]
    pub identity_id: String,
}

/// Identity federation client
#[async_trait]
pub trait FederationClient: Send + Sync {
    /// Obtain a new anonymous identity in `identity_pool_id`
    async fn get_id(&self, identity_pool_id: &str) -> CredsResult<GetIdResponse>;

    /// Exchange an identity for temporary credentials
    ///
    /// `identity_id` may be absent when no identity could be obtained; the
    /// request is sent anyway and the service decides.
    async fn get_credentials_for_identity(
        &self,
        identity_id: Option<&str>,
    ) -> CredsResult<CredentialEnvelope>;
}
