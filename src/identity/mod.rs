/// Identity Credential System
///
/// Resolves an anonymous identity handle within a Cognito identity pool,
/// exchanges it for temporary credentials and caches both in a pluggable
/// key-value store.

pub mod keys;
pub mod resolver;

pub use keys::{DefaultKeyDeriver, KeyDeriver, NamespacedKeyDeriver};
pub use resolver::{resolve, CredentialResolver};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temporary access credentials issued for an identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_key: String,
    pub session_token: String,
    #[serde(with = "expiration")]
    pub expiration: DateTime<Utc>,
}

impl Credentials {
    /// Credentials are usable only while their expiration is strictly in the future
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration > now
    }
}

/// Persisted credential record
///
/// Wraps the credentials together with every other field of the
/// `GetCredentialsForIdentity` response so the record is stored as returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialEnvelope {
    #[serde(rename = "Credentials")]
    pub credentials: Credentials,
    #[serde(rename = "IdentityId", default, skip_serializing_if = "Option::is_none")]
    pub identity_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CredentialEnvelope {
    /// Interpret a raw cached value, reporting why it can't be used
    pub fn from_cache(raw: Option<&str>, now: DateTime<Utc>) -> Result<Self, CacheMiss> {
        let raw = raw.ok_or(CacheMiss::Absent)?;
        let envelope: CredentialEnvelope =
            serde_json::from_str(raw).map_err(|_| CacheMiss::Malformed)?;

        if envelope.credentials.is_valid_at(now) {
            Ok(envelope)
        } else {
            Err(CacheMiss::Expired)
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Reason a cached credential record could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMiss {
    /// Nothing stored under the credentials key
    Absent,
    /// The store failed to read
    Unreadable,
    /// Stored value is not a valid record
    Malformed,
    /// Record expiration is at or before now
    Expired,
}

impl CacheMiss {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMiss::Absent => "absent",
            CacheMiss::Unreadable => "unreadable",
            CacheMiss::Malformed => "malformed",
            CacheMiss::Expired => "expired",
        }
    }
}

/// Expiration timestamps
///
/// The federation service sends epoch seconds; cached records use RFC 3339.
/// Both are accepted on read, RFC 3339 is written.
mod expiration {
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Seconds(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Seconds(secs) => {
                if !secs.is_finite() {
                    return Err(de::Error::custom("non-finite expiration"));
                }
                Utc.timestamp_millis_opt((secs * 1000.0).round() as i64)
                    .single()
                    .ok_or_else(|| de::Error::custom(format!("expiration out of range: {}", secs)))
            }
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| de::Error::custom(format!("Invalid timestamp: {}", e))),
        }
    }
}
