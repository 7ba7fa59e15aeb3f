//! ig.news HTTP client implementation.

use reqwest::header::{ALLOW, COOKIE};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{ApiErrorResponse, SubscribeResponse};

/// ig.news API client.
#[derive(Debug, Clone)]
pub struct IgnewsClient {
    client: Client,
    base_url: String,
}

impl IgnewsClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the site (e.g., `"https://ignews.example"`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options.
    #[must_use]
    pub fn with_options(base_url: impl Into<String>, options: ClientOptions) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Start a subscription checkout for the user signed in with `session_cookie`.
    ///
    /// `session_cookie` is sent verbatim as the `Cookie` header.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` if the cookie carries no session,
    /// or another error if the request fails or the server returns an error.
    pub async fn subscribe(&self, session_cookie: &str) -> Result<SubscribeResponse, ClientError> {
        let url = format!("{}/api/subscribe", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(COOKIE, session_cookie)
            .send()
            .await?;

        let response: SubscribeResponse = self.handle_response(response).await?;
        tracing::debug!(session_id = %response.session_id, "Checkout session started");
        Ok(response)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }

        match status {
            StatusCode::UNAUTHORIZED => return Err(ClientError::Unauthorized),
            StatusCode::METHOD_NOT_ALLOWED => {
                let allow = response
                    .headers()
                    .get(ALLOW)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                return Err(ClientError::MethodNotAllowed { allow });
            }
            _ => {}
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => Err(ClientError::Api {
                code: api_error.error.code,
                message: api_error.error.message,
                status: status.as_u16(),
            }),
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COOKIE_VALUE: &str = "next-auth.session-token=abc";

    #[test]
    fn client_trims_trailing_slash() {
        let client = IgnewsClient::new("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn subscribe_forwards_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/subscribe"))
            .and(header("cookie", COOKIE_VALUE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sessionId": "cs_test" })))
            .expect(1)
            .mount(&server)
            .await;

        let response = IgnewsClient::new(server.uri())
            .subscribe(COOKIE_VALUE)
            .await
            .unwrap();
        assert_eq!(response.session_id, "cs_test");
    }

    #[tokio::test]
    async fn unauthorized_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "code": "unauthorized", "message": "A signed-in session is required" }
            })))
            .mount(&server)
            .await;

        let err = IgnewsClient::new(server.uri())
            .subscribe("")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
    }

    #[tokio::test]
    async fn method_not_allowed_reports_allow_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(405)
                    .insert_header("allow", "POST")
                    .set_body_string("Method not allowed"),
            )
            .mount(&server)
            .await;

        let err = IgnewsClient::new(server.uri())
            .subscribe(COOKIE_VALUE)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MethodNotAllowed { allow } if allow == "POST"));
    }

    #[tokio::test]
    async fn server_errors_keep_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "code": "upstream_error", "message": "The payments request failed" }
            })))
            .mount(&server)
            .await;

        let err = IgnewsClient::new(server.uri())
            .subscribe(COOKIE_VALUE)
            .await
            .unwrap_err();
        match err {
            ClientError::Api { code, status, .. } => {
                assert_eq!(code, "upstream_error");
                assert_eq!(status, 500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn plain_text_errors_fall_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = IgnewsClient::new(server.uri())
            .subscribe(COOKIE_VALUE)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 502, .. }));
    }
}
