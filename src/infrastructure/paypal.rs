//! PayPal webhook administration over the REST API.
//!
//! Only the calls needed to keep one subscription alive are implemented:
//! OAuth2 client-credentials token exchange, then listing, creating, patching
//! and deleting webhooks.

use crate::domain::ports::{Subscription, WebhookSubscriber};
use crate::error::{Result, WebhookError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

pub const SANDBOX_API_BASE: &str = "https://api-m.sandbox.paypal.com";
pub const LIVE_API_BASE: &str = "https://api-m.paypal.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayPalCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct WebhookList {
    #[serde(default)]
    webhooks: Vec<WebhookResource>,
}

#[derive(Deserialize)]
struct WebhookResource {
    id: String,
    url: String,
    #[serde(default)]
    event_types: Vec<EventTypeEntry>,
}

impl WebhookResource {
    fn event_type_names(&self) -> BTreeSet<String> {
        self.event_types.iter().map(|e| e.name.clone()).collect()
    }
}

#[derive(Deserialize)]
struct EventTypeEntry {
    name: String,
}

#[derive(Serialize)]
struct CreateWebhook<'a> {
    url: &'a str,
    event_types: Vec<EventTypeName<'a>>,
}

#[derive(Serialize)]
struct EventTypeName<'a> {
    name: &'a str,
}

/// One JSON Patch operation, as the webhook update call expects.
#[derive(Serialize)]
struct PatchOperation<'a> {
    op: &'static str,
    path: &'static str,
    value: Vec<EventTypeName<'a>>,
}

fn event_type_names(event_types: &BTreeSet<String>) -> Vec<EventTypeName<'_>> {
    event_types
        .iter()
        .map(|name| EventTypeName { name })
        .collect()
}

pub struct PayPalWebhookSubscriber {
    http: reqwest::Client,
    api_base: String,
    credentials: PayPalCredentials,
}

impl PayPalWebhookSubscriber {
    /// Creates a subscriber against `api_base` (see [`SANDBOX_API_BASE`] and
    /// [`LIVE_API_BASE`]). Every provider call is bounded by `timeout`.
    pub fn new(api_base: &str, credentials: PayPalCredentials, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    async fn access_token(&self) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = ensure_success(response).await?.json().await?;
        Ok(token.access_token)
    }

    async fn list(&self, token: &str) -> Result<Vec<WebhookResource>> {
        let response = self
            .http
            .get(self.webhooks_url())
            .bearer_auth(token)
            .send()
            .await?;
        let list: WebhookList = ensure_success(response).await?.json().await?;
        Ok(list.webhooks)
    }

    /// Replaces the event types of webhook `webhook_id`.
    async fn replace_event_types(
        &self,
        token: &str,
        webhook_id: &str,
        event_types: &BTreeSet<String>,
    ) -> Result<()> {
        let patch = [PatchOperation {
            op: "replace",
            path: "/event_types",
            value: event_type_names(event_types),
        }];
        let response = self
            .http
            .patch(format!("{}/{}", self.webhooks_url(), webhook_id))
            .bearer_auth(token)
            .json(&patch)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    fn webhooks_url(&self) -> String {
        format!("{}/v1/notifications/webhooks", self.api_base)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(WebhookError::ProviderStatus {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl WebhookSubscriber for PayPalWebhookSubscriber {
    async fn subscribe(&self, url: &str, event_types: &BTreeSet<String>) -> Result<Subscription> {
        let token = self.access_token().await?;

        if let Some(existing) = self
            .list(&token)
            .await?
            .into_iter()
            .find(|webhook| webhook.url == url)
        {
            let updated = existing.event_type_names() != *event_types;
            if updated {
                warn!(
                    webhook_id = %existing.id,
                    subscribed = ?existing.event_type_names(),
                    wanted = ?event_types,
                    "Existing webhook subscription has stale event types, replacing them"
                );
                self.replace_event_types(&token, &existing.id, event_types).await?;
            } else {
                debug!(webhook_id = %existing.id, "Reusing existing webhook subscription");
            }
            return Ok(Subscription {
                id: existing.id,
                url: existing.url,
                created: false,
                updated,
            });
        }

        let body = CreateWebhook {
            url,
            event_types: event_type_names(event_types),
        };
        let response = self
            .http
            .post(self.webhooks_url())
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        let created: WebhookResource = ensure_success(response).await?.json().await?;

        Ok(Subscription {
            id: created.id,
            url: created.url,
            created: true,
            updated: false,
        })
    }

    async fn unsubscribe(&self, webhook_id: &str) -> Result<()> {
        let token = self.access_token().await?;
        let response = self
            .http
            .delete(format!("{}/{}", self.webhooks_url(), webhook_id))
            .bearer_auth(&token)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}
