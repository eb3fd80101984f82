/// Cache key derivation for identity handles and credential records

/// Prefix for the identity handle entry
pub const IDENTITY_KEY_PREFIX: &str = "__identity-id.";

/// Prefix for the credential record entry
pub const CREDENTIALS_KEY_PREFIX: &str = "__identity-credentials.";

/// Maps an identity pool id to the storage keys used for it
///
/// Implementations must be pure: the same pool id always yields the same keys.
pub trait KeyDeriver: Send + Sync {
    /// Key holding the raw identity handle
    fn identity_key(&self, identity_pool_id: &str) -> String;

    /// Key holding the serialized credential record
    fn credentials_key(&self, identity_pool_id: &str) -> String;
}

/// Fixed-prefix keys, compatible with records written by browser clients
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKeyDeriver;

impl KeyDeriver for DefaultKeyDeriver {
    fn identity_key(&self, identity_pool_id: &str) -> String {
        format!("{}{}", IDENTITY_KEY_PREFIX, identity_pool_id)
    }

    fn credentials_key(&self, identity_pool_id: &str) -> String {
        format!("{}{}", CREDENTIALS_KEY_PREFIX, identity_pool_id)
    }
}

/// Default keys scoped under an application namespace
///
/// Lets several applications share one store without clobbering each
/// other's identities for the same pool.
#[derive(Debug, Clone)]
pub struct NamespacedKeyDeriver {
    namespace: String,
}

impl NamespacedKeyDeriver {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl KeyDeriver for NamespacedKeyDeriver {
    fn identity_key(&self, identity_pool_id: &str) -> String {
        format!("{}:{}", self.namespace, DefaultKeyDeriver.identity_key(identity_pool_id))
    }

    fn credentials_key(&self, identity_pool_id: &str) -> String {
        format!("{}:{}", self.namespace, DefaultKeyDeriver.credentials_key(identity_pool_id))
    }
}
