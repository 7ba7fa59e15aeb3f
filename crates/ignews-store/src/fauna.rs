//! Fauna document database backend.
//!
//! Queries are sent as FQL wire-format JSON to the database's HTTP endpoint.
//! Users live in the `users` collection and are looked up through the
//! `user_by_email` index, whose term is the case-folded email.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use ignews_core::{CustomerId, Email, UserData, UserRecord, UserRef};

use crate::error::{Result, StoreError};
use crate::UserStore;

/// Connection settings for [`FaunaStore`].
#[derive(Debug, Clone)]
pub struct FaunaConfig {
    /// Endpoint URL (default: `https://db.fauna.com`).
    pub url: String,
    /// Database secret.
    pub secret: String,
    /// Collection holding user documents.
    pub collection: String,
    /// Index mapping case-folded email to user documents.
    pub email_index: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl FaunaConfig {
    /// Default endpoint.
    pub const DEFAULT_URL: &'static str = "https://db.fauna.com";

    /// Settings for the given secret with default endpoint and names.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            url: Self::DEFAULT_URL.to_string(),
            secret: secret.into(),
            collection: "users".to_string(),
            email_index: "user_by_email".to_string(),
            timeout_seconds: 30,
        }
    }

    /// Override the endpoint URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// User store backed by Fauna.
#[derive(Debug, Clone)]
pub struct FaunaStore {
    client: Client,
    config: FaunaConfig,
}

/// A page of query results.
#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
}

/// Successful query response envelope.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    resource: T,
}

/// Error response envelope.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    errors: Vec<QueryError>,
}

#[derive(Debug, Deserialize)]
struct QueryError {
    code: String,
    #[serde(default)]
    description: String,
}

/// A document as returned by the database.
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(rename = "ref")]
    reference: TaggedRef,
    #[serde(default)]
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct TaggedRef {
    #[serde(rename = "@ref")]
    inner: RefBody,
}

#[derive(Debug, Deserialize)]
struct RefBody {
    id: String,
}

impl FaunaStore {
    /// Create a store client.
    #[must_use]
    pub fn new(config: FaunaConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    /// `Map(Paginate(Match(Index(idx), Casefold(email)), {size: 2}), Lambda("ref", Get(Var("ref"))))`
    ///
    /// Two results are enough to tell a unique match from an ambiguous one.
    fn find_by_email_query(&self, email: &Email) -> Value {
        json!({
            "map": { "lambda": "ref", "expr": { "get": { "var": "ref" } } },
            "collection": {
                "paginate": {
                    "match": { "index": self.config.email_index },
                    "terms": { "casefold": email.as_str() }
                },
                "size": 2
            }
        })
    }

    /// `Update(Ref(Collection(coll), id), { data: { stripe_customer_id } })`
    fn set_customer_query(&self, user: &UserRef, customer_id: &CustomerId) -> Value {
        json!({
            "update": {
                "ref": { "collection": self.config.collection },
                "id": user.as_str()
            },
            "params": {
                "object": {
                    "data": {
                        "object": { "stripe_customer_id": customer_id.as_str() }
                    }
                }
            }
        })
    }

    /// Run a query and decode its `resource`.
    ///
    /// `missing` names the lookup key reported when the database answers 404.
    async fn query<T: DeserializeOwned>(&self, expr: &Value, missing: &str) -> Result<T> {
        let response = self
            .client
            .post(self.config.url.trim_end_matches('/'))
            .bearer_auth(&self.config.secret)
            .header("X-FaunaDB-API-Version", "4")
            .json(expr)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let body: QueryResponse<T> = response
                .json()
                .await
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            return Ok(body.resource);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::user_not_found(missing));
        }

        let (code, message) = match response.json::<ErrorResponse>().await {
            Ok(body) => body
                .errors
                .into_iter()
                .next()
                .map_or_else(|| ("unknown".to_string(), String::new()), |e| (e.code, e.description)),
            Err(_) => ("unknown".to_string(), format!("HTTP {status}")),
        };

        tracing::warn!(status = %status, code = %code, "Fauna query failed");

        Err(StoreError::Remote {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait]
impl UserStore for FaunaStore {
    async fn find_by_email(&self, email: &Email) -> Result<UserRecord> {
        let key = email.casefolded();
        let expr = self.find_by_email_query(email);

        tracing::debug!(index = %self.config.email_index, "Looking up user by email");

        let page: Page<Document> = self.query(&expr, &key).await?;

        let mut docs = page.data.into_iter();
        match (docs.next(), docs.next()) {
            (Some(doc), None) => {
                let reference = UserRef::new(doc.reference.inner.id)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(UserRecord::new(reference, doc.data))
            }
            (None, _) => Err(StoreError::user_not_found(key)),
            (Some(_), Some(_)) => Err(StoreError::Ambiguous {
                key,
                count: 2 + docs.count(),
            }),
        }
    }

    async fn set_stripe_customer_id(
        &self,
        user: &UserRef,
        customer_id: &CustomerId,
    ) -> Result<()> {
        let expr = self.set_customer_query(user, customer_id);

        let _: Value = self.query(&expr, user.as_str()).await?;

        tracing::debug!(user_ref = %user, customer_id = %customer_id, "Stored billing customer id");
        Ok(())
    }
}
