use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use specta::Type;

use super::{pacticipant::pacticipant_link, resource_url};
use super::{Link, Pacticipant, PacticipantName};

/// Webhook attributes as submitted by a client.
///
/// Every field is optional so that validation can report all missing or
/// malformed fields at once instead of failing on the first decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
pub struct WebhookAttributes {
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub events: Option<Vec<WebhookEventAttributes>>,
    pub request: Option<WebhookRequestAttributes>,
    pub consumer: Option<PacticipantRef>,
    pub provider: Option<PacticipantRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
pub struct WebhookEventAttributes {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
pub struct WebhookRequestAttributes {
    pub method: Option<String>,
    pub url: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    /// `None` when the key is absent; an explicit `null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present_value")]
    pub body: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
pub struct PacticipantRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct WebhookEvent {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct WebhookRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct Webhook {
    pub uuid: String,
    pub description: String,
    pub enabled: bool,
    pub events: Vec<WebhookEvent>,
    pub request: WebhookRequest,
    pub consumer: Option<Pacticipant>,
    pub provider: Option<Pacticipant>,
    pub created_at: String,
    pub updated_at: String,
}

// specta 1's derive requires `rename` values to be identifiers; these keep the
// exported key names identical to the serde renames below.
const PB_CONSUMER: &str = "pb:consumer";
const PB_PROVIDER: &str = "pb:provider";

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct WebhookLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    #[specta(rename_from_path = PB_CONSUMER)]
    #[serde(rename = "pb:consumer", skip_serializing_if = "Option::is_none")]
    pub consumer: Option<Link>,
    #[specta(rename_from_path = PB_PROVIDER)]
    #[serde(rename = "pb:provider", skip_serializing_if = "Option::is_none")]
    pub provider: Option<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub description: String,
    pub enabled: bool,
    pub events: Vec<WebhookEvent>,
    pub request: WebhookRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer: Option<PacticipantName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<PacticipantName>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(rename = "_links")]
    pub links: WebhookLinks,
}

impl WebhookResponse {
    pub fn new(webhook: &Webhook, base_url: &str) -> Self {
        let name_of = |p: &Pacticipant| PacticipantName {
            name: p.name.clone(),
        };

        Self {
            description: webhook.description.clone(),
            enabled: webhook.enabled,
            events: webhook.events.clone(),
            request: webhook.request.clone(),
            consumer: webhook.consumer.as_ref().map(name_of),
            provider: webhook.provider.as_ref().map(name_of),
            created_at: webhook.created_at.clone(),
            updated_at: webhook.updated_at.clone(),
            links: WebhookLinks {
                self_link: Link {
                    href: webhook_url(base_url, &webhook.uuid),
                    title: Some(webhook.description.clone()),
                },
                consumer: webhook
                    .consumer
                    .as_ref()
                    .map(|p| pacticipant_link(p, base_url)),
                provider: webhook
                    .provider
                    .as_ref()
                    .map(|p| pacticipant_link(p, base_url)),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct WebhookListResponse {
    pub webhooks: Vec<WebhookResponse>,
}

pub fn webhook_url(base_url: &str, uuid: &str) -> String {
    resource_url(base_url, &["webhooks", uuid])
}
