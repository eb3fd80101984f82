/// End-to-end resolution through the Cognito client and persistent stores
mod common;

use common::{epoch_from_now, FakeCognito, POOL_ID};
use guest_credentials::{
    storage::{FileStore, SqliteStore},
    CredentialResolver, KeyValueStore, ResolverConfig,
};
use std::sync::Arc;
use tempfile::tempdir;

const IDENTITY_KEY: &str = "__identity-id.us-east-1:11111111-2222-3333-4444-555555555555";
const CREDS_KEY: &str = "__identity-credentials.us-east-1:11111111-2222-3333-4444-555555555555";

fn resolver(endpoint: &str, store: Arc<dyn KeyValueStore>) -> CredentialResolver {
    CredentialResolver::new(ResolverConfig::new(POOL_ID).with_endpoint(endpoint))
        .unwrap()
        .with_store(store)
}

#[tokio::test]
async fn test_second_resolve_served_from_file_cache() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let fake = FakeCognito::new(Some("us-east-1:identity-1"), Some(epoch_from_now(3600)));
    let endpoint = common::spawn(fake.clone()).await;

    let first = resolver(&endpoint, Arc::new(FileStore::new(path.clone())))
        .resolve()
        .await
        .expect("credentials from federation");
    assert_eq!(
        fake.targets(),
        vec![
            "AWSCognitoIdentityService.GetId",
            "AWSCognitoIdentityService.GetCredentialsForIdentity"
        ]
    );

    // A fresh resolver over the same file behaves like a page reload
    let second = resolver(&endpoint, Arc::new(FileStore::new(path.clone())))
        .resolve()
        .await
        .expect("credentials from cache");
    assert_eq!(first, second);
    assert_eq!(fake.targets().len(), 2);

    let store = FileStore::new(path);
    assert_eq!(
        store.get(IDENTITY_KEY).await.unwrap(),
        Some("us-east-1:identity-1".to_string())
    );
    let record: serde_json::Value =
        serde_json::from_str(&store.get(CREDS_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(record["IdentityId"], "us-east-1:identity-1");
    assert!(record["Credentials"]["Expiration"].is_string());
}

#[tokio::test]
async fn test_expired_credentials_refetched_with_stored_identity() {
    let fake = FakeCognito::new(Some("us-east-1:identity-1"), Some(epoch_from_now(-1)));
    let endpoint = common::spawn(fake.clone()).await;
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::in_memory().await.unwrap());

    // Issued credentials are already expired, so nothing is ever a cache hit
    assert!(resolver(&endpoint, store.clone()).resolve().await.is_some());
    assert!(resolver(&endpoint, store.clone()).resolve().await.is_some());

    assert_eq!(
        fake.targets(),
        vec![
            "AWSCognitoIdentityService.GetId",
            "AWSCognitoIdentityService.GetCredentialsForIdentity",
            "AWSCognitoIdentityService.GetCredentialsForIdentity"
        ]
    );
    let requests = fake.requests();
    assert_eq!(requests[2].body["IdentityId"], "us-east-1:identity-1");
}

#[tokio::test]
async fn test_identity_failure_degrades_to_anonymous_request() {
    let dir = tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path().join("store.json")));
    let fake = FakeCognito::new(None, Some(epoch_from_now(3600)));
    let endpoint = common::spawn(fake.clone()).await;

    let creds = resolver(&endpoint, store.clone()).resolve().await;
    assert!(creds.is_some());

    let requests = fake.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].body, serde_json::json!({}));
    assert_eq!(store.get(IDENTITY_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_total_failure_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let fake = FakeCognito::new(None, None);
    let endpoint = common::spawn(fake.clone()).await;

    let creds = resolver(&endpoint, Arc::new(FileStore::new(path.clone())))
        .resolve()
        .await;

    assert!(creds.is_none());
    assert_eq!(fake.targets().len(), 2);
    assert!(!path.exists());
}
