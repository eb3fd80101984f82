/// Credential Resolver - Orchestrates identity and credential lookup with caching
use crate::{
    config::{ResolverConfig, DEFAULT_FILE_STORE_PATH},
    error::CredsResult,
    federation::{CognitoIdentityClient, FederationClient},
    identity::{CacheMiss, CredentialEnvelope, Credentials, DefaultKeyDeriver, KeyDeriver},
    metrics,
    storage::{FileStore, KeyValueStore},
};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Resolves temporary credentials for an anonymous identity
///
/// Never fails outward: every internal error is logged and the caller sees
/// either credentials or `None`.
#[derive(Clone)]
pub struct CredentialResolver {
    config: ResolverConfig,
    identity_store: Arc<dyn KeyValueStore>,
    credentials_store: Arc<dyn KeyValueStore>,
    keys: Arc<dyn KeyDeriver>,
    federation: Option<Arc<dyn FederationClient>>,
}

impl CredentialResolver {
    /// Create a resolver backed by the default file store
    pub fn new(config: ResolverConfig) -> CredsResult<Self> {
        config.validate()?;

        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::new(PathBuf::from(DEFAULT_FILE_STORE_PATH)));

        Ok(Self {
            config,
            identity_store: Arc::clone(&store),
            credentials_store: store,
            keys: Arc::new(DefaultKeyDeriver),
            federation: None,
        })
    }

    /// Use one store for both the identity handle and the credential record
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.identity_store = Arc::clone(&store);
        self.credentials_store = store;
        self
    }

    pub fn with_identity_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.identity_store = store;
        self
    }

    pub fn with_credentials_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.credentials_store = store;
        self
    }

    pub fn with_key_deriver(mut self, keys: Arc<dyn KeyDeriver>) -> Self {
        self.keys = keys;
        self
    }

    /// Use a specific federation client instead of building a Cognito client
    pub fn with_federation_client(mut self, client: Arc<dyn FederationClient>) -> Self {
        self.federation = Some(client);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve credentials, from cache when still valid
    ///
    /// Resolution order:
    /// 1. Cached credential record, if its expiration is in the future
    /// 2. Stored identity handle, or a new one from `GetId`
    /// 3. `GetCredentialsForIdentity`, persisting the response
    pub async fn resolve(&self) -> Option<Credentials> {
        let pool_id = self.config.identity_pool_id.as_str();
        let creds_key = self.keys.credentials_key(pool_id);
        let identity_key = self.keys.identity_key(pool_id);

        let mut identity_id = self.stored_identity(&identity_key).await;

        match self.cached_credentials(&creds_key).await {
            Ok(envelope) => {
                metrics::record_cache_lookup("hit");
                if self.config.debug {
                    debug!(pool = pool_id, "Credential cache hit");
                }
                return Some(envelope.credentials);
            }
            Err(reason) => {
                metrics::record_cache_lookup(reason.as_str());
                if self.config.debug {
                    debug!(pool = pool_id, reason = reason.as_str(), "Credential cache miss");
                }
            }
        }

        let client = self.federation_client()?;

        if identity_id.is_none() {
            match client.get_id(pool_id).await {
                Ok(response) => {
                    metrics::record_federation_request("GetId", true);
                    if self.config.debug {
                        debug!(pool = pool_id, identity = %response.identity_id, "Obtained identity id");
                    }
                    self.persist(&*self.identity_store, &identity_key, &response.identity_id)
                        .await;
                    identity_id = Some(response.identity_id);
                }
                Err(e) => {
                    metrics::record_federation_request("GetId", false);
                    error!(pool = pool_id, "Failed to get identity id: {}", e);
                }
            }
        }

        match client
            .get_credentials_for_identity(identity_id.as_deref())
            .await
        {
            Ok(envelope) => {
                metrics::record_federation_request("GetCredentialsForIdentity", true);
                match envelope.to_json() {
                    Ok(json) => self.persist(&*self.credentials_store, &creds_key, &json).await,
                    Err(e) => warn!("Failed to serialize credential record: {}", e),
                }
                return Some(envelope.credentials);
            }
            Err(e) => {
                metrics::record_federation_request("GetCredentialsForIdentity", false);
                error!(pool = pool_id, "Failed to get credentials for identity: {}", e);
            }
        }

        None
    }

    /// Stored identity handle; unreadable or empty counts as absent
    async fn stored_identity(&self, key: &str) -> Option<String> {
        match self.identity_store.get(key).await {
            Ok(value) => value.filter(|id| !id.is_empty()),
            Err(e) => {
                warn!("Failed to read identity id {}: {}", key, e);
                None
            }
        }
    }

    /// Cached credential record if it is still valid
    async fn cached_credentials(&self, key: &str) -> Result<CredentialEnvelope, CacheMiss> {
        let raw = match self.credentials_store.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                if self.config.debug {
                    debug!("Failed to read cached credentials {}: {}", key, e);
                }
                return Err(CacheMiss::Unreadable);
            }
        };

        CredentialEnvelope::from_cache(raw.as_deref(), Utc::now())
    }

    fn federation_client(&self) -> Option<Arc<dyn FederationClient>> {
        if let Some(client) = &self.federation {
            return Some(Arc::clone(client));
        }

        match CognitoIdentityClient::new(&self.config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                error!("Failed to create federation client: {}", e);
                None
            }
        }
    }

    /// Write-through that never fails the resolution
    async fn persist(&self, store: &dyn KeyValueStore, key: &str, value: &str) {
        if let Err(e) = store.set(key, value).await {
            warn!("Failed to persist {}: {}", key, e);
        }
    }
}

/// Resolve credentials once with the default file store
///
/// Returns `None` if the configuration is invalid or no credentials could be
/// obtained.
pub async fn resolve(config: ResolverConfig) -> Option<Credentials> {
    match CredentialResolver::new(config) {
        Ok(resolver) => resolver.resolve().await,
        Err(e) => {
            error!("Invalid resolver configuration: {}", e);
            None
        }
    }
}
