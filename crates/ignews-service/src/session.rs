//! Session resolution.
//!
//! Sessions are issued by the site's auth provider. This module provides:
//! - `SessionProvider` - the seam used by handlers, resolving a session from request headers
//! - `NextAuthSessionProvider` - asks the auth provider's session endpoint
//! - `JwtSessionProvider` - verifies an HS256 session token locally
//! - `SessionUser` - axum extractor yielding the signed-in user's email

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use ignews_core::Email;

use crate::error::ApiError;
use crate::state::AppState;

/// Session cookie names, secure variant first.
pub const SESSION_COOKIES: [&str; 2] = [
    "__Secure-next-auth.session-token",
    "next-auth.session-token",
];

/// A resolved session, in the auth provider's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The signed-in user.
    pub user: SessionUserInfo,
    /// When the session expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

/// User profile attached to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUserInfo {
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Errors from the session provider itself (not "no session").
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("session endpoint returned HTTP {status}")]
    Provider {
        /// HTTP status.
        status: u16,
    },

    /// The provider's answer could not be decoded.
    #[error("invalid session payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Resolves the caller's session from request headers.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve the session, or `None` if the caller is not signed in.
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError>;
}

/// Session provider that asks `GET {base}/api/auth/session`, forwarding cookies.
#[derive(Debug, Clone)]
pub struct NextAuthSessionProvider {
    client: reqwest::Client,
    base_url: String,
}

impl NextAuthSessionProvider {
    /// Create a provider for the auth site at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SessionProvider for NextAuthSessionProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        let Some(cookie) = headers.get(COOKIE).and_then(|v| v.to_str().ok()) else {
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/api/auth/session", self.base_url))
            .header(COOKIE.as_str(), cookie)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Provider {
                status: status.as_u16(),
            });
        }

        // No session is reported as `{}` (or `null` on older versions).
        let body: serde_json::Value = response.json().await?;
        match &body {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Object(map) if map.is_empty() => Ok(None),
            _ => Ok(Some(serde_json::from_value(body)?)),
        }
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub picture: Option<String>,
    /// Expiration time.
    pub exp: i64,
}

/// Session provider that verifies HS256 session tokens.
///
/// The token is read from the session cookie, or from an `Authorization: Bearer` header.
///
/// Only plain signed (JWS) tokens are accepted. The auth site's default v4
/// session cookie is an encrypted JWE token and is rejected here; such sites
/// must use [`NextAuthSessionProvider`], or issue signed tokens through a
/// custom `jwt.encode`.
#[derive(Clone)]
pub struct JwtSessionProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSessionProvider {
    /// Create a provider verifying tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };

        let claims = match decode::<SessionClaims>(&token, &self.key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                return Ok(None);
            }
        };

        Ok(Some(Session {
            user: SessionUserInfo {
                email: claims.email,
                name: claims.name,
                image: claims.picture,
            },
            expires: DateTime::from_timestamp(claims.exp, 0),
        }))
    }
}

/// Find the session token in the cookies or the `Authorization` header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, value)| SESSION_COOKIES.iter().any(|c| c == name) && !value.is_empty())
        .min_by_key(|(name, _)| SESSION_COOKIES.iter().position(|c| c == name))
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    })
}

/// The signed-in user, extracted from the request's session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// The session email.
    pub email: Email,
    /// Display name, if the session has one.
    pub name: Option<String>,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = state
            .sessions
            .resolve(&parts.headers)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        let email = session
            .user
            .email
            .as_deref()
            .and_then(|e| Email::parse(e).ok())
            .ok_or_else(|| {
                tracing::debug!("Session has no usable email");
                ApiError::Unauthorized
            })?;

        Ok(SessionUser {
            email,
            name: session.user.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn token(secret: &str, email: Option<&str>, exp: i64) -> String {
        let claims = SessionClaims {
            email: email.map(String::from),
            name: Some("Ana".into()),
            picture: None,
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_an_hour() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[test]
    fn session_token_prefers_secure_cookie() {
        let map = headers(&[(
            "cookie",
            "theme=dark; next-auth.session-token=plain; __Secure-next-auth.session-token=secure",
        )]);
        assert_eq!(session_token(&map).as_deref(), Some("secure"));
    }

    #[test]
    fn session_token_falls_back_to_bearer() {
        let map = headers(&[("authorization", "Bearer abc")]);
        assert_eq!(session_token(&map).as_deref(), Some("abc"));
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn jwt_provider_accepts_valid_token() {
        let provider = JwtSessionProvider::new("s3cret");
        let cookie = format!(
            "next-auth.session-token={}",
            token("s3cret", Some("a@x.com"), in_an_hour())
        );

        let session = provider
            .resolve(&headers(&[("cookie", cookie.as_str())]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.user.email.as_deref(), Some("a@x.com"));
        assert_eq!(session.user.name.as_deref(), Some("Ana"));
        assert!(session.expires.is_some());
    }

    #[tokio::test]
    async fn jwt_provider_rejects_bad_signature_and_expiry() {
        let provider = JwtSessionProvider::new("s3cret");

        let forged = format!("Bearer {}", token("other", Some("a@x.com"), in_an_hour()));
        assert!(provider
            .resolve(&headers(&[("authorization", forged.as_str())]))
            .await
            .unwrap()
            .is_none());

        let expired = format!("Bearer {}", token("s3cret", Some("a@x.com"), 1_000));
        assert!(provider
            .resolve(&headers(&[("authorization", expired.as_str())]))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn nextauth_provider_forwards_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/session"))
            .and(header("cookie", "next-auth.session-token=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": { "name": "Bo", "email": "b@x.com", "image": null },
                "expires": "2030-01-01T00:00:00.000Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = NextAuthSessionProvider::new(server.uri());
        let session = provider
            .resolve(&headers(&[("cookie", "next-auth.session-token=abc")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.user.email.as_deref(), Some("b@x.com"));
    }

    #[tokio::test]
    async fn nextauth_provider_empty_object_is_no_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let provider = NextAuthSessionProvider::new(server.uri());
        assert!(provider
            .resolve(&headers(&[("cookie", "a=b")]))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn nextauth_provider_skips_call_without_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let provider = NextAuthSessionProvider::new(server.uri());
        assert!(provider.resolve(&HeaderMap::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nextauth_provider_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let provider = NextAuthSessionProvider::new(server.uri());
        let err = provider
            .resolve(&headers(&[("cookie", "a=b")]))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Provider { status: 502 }));
    }
}
