// src/services/auth_service.rs
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing;

use crate::{errors::RelayError as AppError, state::ServiceAccount};

const SCOPES: &str = "https://www.googleapis.com/auth/firebase.messaging https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertions are valid for one hour, Google's maximum.
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// OAuth2 access tokens for the Firebase service account.
///
/// One instance is shared by the Firestore and FCM clients; the cached token
/// is the only state shared between requests.
pub struct GoogleAuth {
    account: ServiceAccount,
    signing_key: EncodingKey,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl GoogleAuth {
    /// Fails when the private key is not a valid RSA PEM, which is fatal at
    /// startup.
    pub fn new(account: ServiceAccount, client: reqwest::Client) -> Result<Self, AppError> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| AppError::ConfigurationError(format!("Invalid FIREBASE_PRIVATE_KEY: {}", e)))?;

        Ok(Self {
            account,
            signing_key,
            client,
            cached: Mutex::new(None),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.account.project_id
    }

    pub async fn access_token(&self) -> Result<String, AppError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!("Requesting new access token for {}", self.account.client_email);
        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);

        Ok(value)
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: SCOPES,
            aud: &self.account.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.account.private_key_id.clone();

        Ok(encode(&header, &claims, &self.signing_key)?)
    }

    async fn fetch_token(&self) -> Result<CachedToken, AppError> {
        let now = Utc::now();
        let assertion = self.signed_assertion(now)?;

        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Token exchange failed ({}): {}", status, error_text);
            return Err(AppError::FirebaseAuth(format!("token endpoint returned {}: {}", status, error_text)));
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(private_key: &str) -> ServiceAccount {
        ServiceAccount {
            project_id: "gigigo-test".to_string(),
            private_key: private_key.to_string(),
            client_email: "relay@gigigo-test.iam.gserviceaccount.com".to_string(),
            token_uri: ServiceAccount::DEFAULT_TOKEN_URI.to_string(),
            private_key_id: None,
        }
    }

    #[test]
    fn test_rejects_invalid_private_key() {
        let result = GoogleAuth::new(account("not a pem"), reqwest::Client::new());
        assert!(matches!(result, Err(AppError::ConfigurationError(_))));
    }
}
