//! Google Cloud credentials
//!
//! Four modes are supported: an API key passed as the `key` query
//! parameter, a pre-issued OAuth access token, a token obtained from the
//! GCE metadata server, or a token exchanged for a JWT signed with a
//! service account key. Fetched tokens are cached until shortly before
//! they expire.

use std::path::Path;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Refresh cached tokens this long before they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime of a signed assertion, the maximum Google accepts
const ASSERTION_TTL_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
    expires_in: u64,
}

/// An access token and when it expires
#[derive(Debug, Clone)]
pub struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Service account key file (the JSON downloaded from the Cloud console)
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json)
            .map_err(|e| PipelineError::Auth(format!("Invalid service account key: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Auth(format!("Cannot read service account key {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

/// Credentials for Google REST APIs
pub enum GoogleAuth {
    ApiKey(String),
    StaticToken(String),
    Metadata {
        client: Client,
        endpoint: String,
        cached: Mutex<Option<CachedToken>>,
    },
    ServiceAccount {
        client: Client,
        email: String,
        token_uri: String,
        header: Header,
        signing_key: EncodingKey,
        cached: Mutex<Option<CachedToken>>,
    },
}

impl GoogleAuth {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    pub fn static_token(token: impl Into<String>) -> Self {
        Self::StaticToken(token.into())
    }

    /// Fetch tokens from the metadata server at `endpoint`
    pub fn metadata(client: Client, endpoint: impl Into<String>) -> Self {
        Self::Metadata {
            client,
            endpoint: endpoint.into(),
            cached: Mutex::new(None),
        }
    }

    /// Exchange RS256 assertions signed with `key` at its token URI
    pub fn service_account(client: Client, key: ServiceAccountKey) -> Result<Self, PipelineError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            PipelineError::Auth(format!("Invalid service account private key: {}", e))
        })?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = key.private_key_id;

        Ok(Self::ServiceAccount {
            client,
            email: key.client_email,
            token_uri: key.token_uri,
            header,
            signing_key,
            cached: Mutex::new(None),
        })
    }

    /// Attach credentials to `request`
    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, PipelineError> {
        match self {
            Self::ApiKey(key) => Ok(request.query(&[("key", key.as_str())])),
            Self::StaticToken(token) => Ok(request.bearer_auth(token)),
            Self::Metadata {
                client,
                endpoint,
                cached,
            } => {
                let token = Self::metadata_token(client, endpoint, cached).await?;
                Ok(request.bearer_auth(token))
            }
            Self::ServiceAccount {
                client,
                email,
                token_uri,
                header,
                signing_key,
                cached,
            } => {
                let token =
                    Self::service_account_token(client, email, token_uri, header, signing_key, cached)
                        .await?;
                Ok(request.bearer_auth(token))
            }
        }
    }

    async fn metadata_token(
        client: &Client,
        endpoint: &str,
        cached: &Mutex<Option<CachedToken>>,
    ) -> Result<String, PipelineError> {
        if let Some(token) = fresh_token(cached) {
            return Ok(token);
        }

        let response = client
            .get(endpoint)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| PipelineError::Auth(format!("Metadata server unreachable: {}", e)))?;

        Ok(store_token(cached, read_token(response, "Metadata server").await?))
    }

    async fn service_account_token(
        client: &Client,
        email: &str,
        token_uri: &str,
        header: &Header,
        signing_key: &EncodingKey,
        cached: &Mutex<Option<CachedToken>>,
    ) -> Result<String, PipelineError> {
        if let Some(token) = fresh_token(cached) {
            return Ok(token);
        }

        let assertion = sign_assertion(email, token_uri, header, signing_key)?;
        let response = client
            .post(token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| PipelineError::Auth(format!("Token endpoint unreachable: {}", e)))?;

        Ok(store_token(cached, read_token(response, "Token endpoint").await?))
    }
}

fn fresh_token(cached: &Mutex<Option<CachedToken>>) -> Option<String> {
    cached
        .lock()
        .as_ref()
        .filter(|entry| entry.expires_at > Instant::now() + REFRESH_MARGIN)
        .map(|entry| entry.token.clone())
}

fn store_token(cached: &Mutex<Option<CachedToken>>, token: AccessToken) -> String {
    *cached.lock() = Some(CachedToken {
        token: token.access_token.clone(),
        expires_at: Instant::now() + Duration::from_secs(token.expires_in),
    });
    token.access_token
}

async fn read_token(response: Response, origin: &str) -> Result<AccessToken, PipelineError> {
    if !response.status().is_success() {
        return Err(PipelineError::Auth(format!(
            "{} returned {}",
            origin,
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| PipelineError::Auth(format!("Invalid access token from {}: {}", origin, e)))
}

fn sign_assertion(
    email: &str,
    token_uri: &str,
    header: &Header,
    signing_key: &EncodingKey,
) -> Result<String, PipelineError> {
    let iat = chrono::Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: email,
        scope: CLOUD_PLATFORM_SCOPE,
        aud: token_uri,
        iat,
        exp: iat + ASSERTION_TTL_SECS,
    };

    jsonwebtoken::encode(header, &claims, signing_key)
        .map_err(|e| PipelineError::Auth(format!("Cannot sign token assertion: {}", e)))
}

impl std::fmt::Debug for GoogleAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("GoogleAuth::ApiKey(..)"),
            Self::StaticToken(_) => f.write_str("GoogleAuth::StaticToken(..)"),
            Self::Metadata { endpoint, .. } => write!(f, "GoogleAuth::Metadata({})", endpoint),
            Self::ServiceAccount { email, .. } => write!(f, "GoogleAuth::ServiceAccount({})", email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_api_key_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("key", "AIza-test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let auth = GoogleAuth::api_key("AIza-test");
        let request = auth
            .authorize(Client::new().get(server.uri()))
            .await
            .unwrap();
        assert!(request.send().await.unwrap().status().is_success());
    }

    #[tokio::test]
    async fn test_metadata_token_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token"))
            .and(header("Metadata-Flavor", "Google"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.test",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let auth = GoogleAuth::metadata(client.clone(), format!("{}/token", server.uri()));

        for _ in 0..2 {
            let request = auth.authorize(client.get("http://localhost/")).await.unwrap();
            let built = request.build().unwrap();
            assert_eq!(
                built.headers()["authorization"].to_str().unwrap(),
                "Bearer ya29.test"
            );
        }
    }

    #[tokio::test]
    async fn test_metadata_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let auth = GoogleAuth::metadata(Client::new(), server.uri());
        let err = auth
            .authorize(Client::new().get("http://localhost/"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Auth(_)));
    }

    const TEST_PRIVATE_KEY: &str = include_str!("../testdata/service_account_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../testdata/service_account_pub.pem");

    fn service_account_key(token_uri: &str) -> ServiceAccountKey {
        ServiceAccountKey::from_json(
            &serde_json::json!({
                "type": "service_account",
                "client_email": "lia-voice@lia-tutor.iam.gserviceaccount.com",
                "private_key_id": "k1",
                "private_key": TEST_PRIVATE_KEY,
                "token_uri": token_uri,
            })
            .to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_service_account_exchanges_signed_assertion() {
        let server = MockServer::start().await;
        let token_uri = format!("{}/token", server.uri());
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.sa",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let auth = GoogleAuth::service_account(client.clone(), service_account_key(&token_uri)).unwrap();

        for _ in 0..2 {
            let request = auth.authorize(client.get("http://localhost/")).await.unwrap();
            let built = request.build().unwrap();
            assert_eq!(
                built.headers()["authorization"].to_str().unwrap(),
                "Bearer ya29.sa"
            );
        }

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        let assertion = body
            .split('&')
            .find_map(|pair| pair.strip_prefix("assertion="))
            .unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[token_uri.as_str()]);
        let decoded = decode::<serde_json::Value>(
            assertion,
            &DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.header.kid.as_deref(), Some("k1"));
        assert_eq!(decoded.claims["iss"], "lia-voice@lia-tutor.iam.gserviceaccount.com");
        assert_eq!(decoded.claims["scope"], CLOUD_PLATFORM_SCOPE);
        assert_eq!(
            decoded.claims["exp"].as_i64().unwrap() - decoded.claims["iat"].as_i64().unwrap(),
            ASSERTION_TTL_SECS
        );
    }

    #[tokio::test]
    async fn test_service_account_rejected_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant"
            })))
            .mount(&server)
            .await;

        let auth = GoogleAuth::service_account(Client::new(), service_account_key(&server.uri())).unwrap();
        let err = auth
            .authorize(Client::new().get("http://localhost/"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Auth(_)));
    }

    #[test]
    fn test_service_account_key_validation() {
        let missing_key = ServiceAccountKey::from_json(r#"{"client_email": "a@b.iam.gserviceaccount.com"}"#);
        assert!(matches!(missing_key, Err(PipelineError::Auth(_))));

        let key = ServiceAccountKey::from_json(
            r#"{"client_email": "a@b.iam.gserviceaccount.com", "private_key": "not a pem"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(matches!(
            GoogleAuth::service_account(Client::new(), key),
            Err(PipelineError::Auth(_))
        ));
    }

    #[test]
    fn test_service_account_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "client_email": "lia@p.iam.gserviceaccount.com",
                "private_key": TEST_PRIVATE_KEY,
            })
            .to_string(),
        )
        .unwrap();

        let key = ServiceAccountKey::from_file(&path).unwrap();
        assert_eq!(key.client_email, "lia@p.iam.gserviceaccount.com");
        assert!(ServiceAccountKey::from_file(dir.path().join("absent.json")).is_err());
    }
}
