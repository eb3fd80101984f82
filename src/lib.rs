//! Guest Credentials
//!
//! Obtains temporary credentials for an anonymous Cognito identity and
//! caches the identity handle and credentials in a pluggable key-value
//! store, so repeated calls skip the network until the credentials expire.
//!
//! ```rust,ignore
//! use guest_credentials::{ResolverConfig, CredentialResolver, storage::MemoryStore};
//! use std::sync::Arc;
//!
//! let resolver = CredentialResolver::new(ResolverConfig::new("us-east-1:pool-id"))?
//!     .with_store(Arc::new(MemoryStore::new()));
//!
//! match resolver.resolve().await {
//!     Some(creds) => println!("access key {}", creds.access_key_id),
//!     None => eprintln!("no credentials, try again later"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod federation;
pub mod identity;
pub mod metrics;
pub mod storage;

pub use config::{ResolverConfig, StoreConfig};
pub use error::{CredsError, CredsResult};
pub use federation::{CognitoIdentityClient, FederationClient, GetIdResponse};
pub use identity::{
    resolve, CacheMiss, CredentialEnvelope, CredentialResolver, Credentials, DefaultKeyDeriver,
    KeyDeriver, NamespacedKeyDeriver,
};
pub use storage::KeyValueStore;
