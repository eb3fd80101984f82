/// In-process fake of the Cognito Identity JSON API
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const POOL_ID: &str = "us-east-1:11111111-2222-3333-4444-555555555555";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub target: String,
    pub content_type: String,
    pub body: Value,
}

/// Canned behavior for the fake service
pub struct FakeCognito {
    /// Identity handed out by GetId; `None` makes GetId fail
    pub identity_id: Option<String>,
    /// Expiration (epoch seconds) of issued credentials; `None` makes the call fail
    pub expiration: Option<f64>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeCognito {
    pub fn new(identity_id: Option<&str>, expiration: Option<f64>) -> Arc<Self> {
        Arc::new(Self {
            identity_id: identity_id.map(str::to_string),
            expiration,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn targets(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.target.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn service_error(kind: &str, message: &str) -> (StatusCode, String) {
    (
        StatusCode::BAD_REQUEST,
        json!({ "__type": kind, "message": message }).to_string(),
    )
}

async fn handle(
    State(fake): State<Arc<FakeCognito>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let target = header(&headers, "x-amz-target");
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

    fake.requests.lock().unwrap().push(RecordedRequest {
        target: target.clone(),
        content_type: header(&headers, "content-type"),
        body: body.clone(),
    });

    match target.as_str() {
        "AWSCognitoIdentityService.GetId" => match &fake.identity_id {
            Some(id) => (StatusCode::OK, json!({ "IdentityId": id }).to_string()),
            None => service_error(
                "com.amazonaws.cognito.identity#ResourceNotFoundException",
                "IdentityPool not found.",
            ),
        },
        "AWSCognitoIdentityService.GetCredentialsForIdentity" => match fake.expiration {
            Some(expiration) => (
                StatusCode::OK,
                json!({
                    "IdentityId": body.get("IdentityId").cloned(),
                    "Credentials": {
                        "AccessKeyId": "ASIAFAKEACCESSKEY",
                        "SecretKey": "fake-secret-key",
                        "SessionToken": "fake-session-token",
                        "Expiration": expiration,
                    }
                })
                .to_string(),
            ),
            None => service_error("NotAuthorizedException", "Access to Identity is forbidden."),
        },
        _ => service_error("UnknownOperationException", "Unknown operation"),
    }
}

/// Start the fake service on an ephemeral port and return its endpoint URL
pub async fn spawn(fake: Arc<FakeCognito>) -> String {
    let app = Router::new().route("/", post(handle)).with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/", addr)
}

/// Epoch seconds `offset` seconds from now
pub fn epoch_from_now(offset: i64) -> f64 {
    (chrono::Utc::now().timestamp() + offset) as f64
}
