use serde::{Deserialize, Serialize};
use specta::Type;
use uuid::Uuid;

use super::resource_url;

/// A named party in a contract, either consumer or provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct Pacticipant {
    pub id: Uuid,
    pub name: String,
    pub created_at: String,
}

/// A release of a consumer. `number` is only unique within its pacticipant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct Version {
    pub id: Uuid,
    pub pacticipant_id: Uuid,
    pub number: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct PacticipantName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct Link {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct PacticipantLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct PacticipantResponse {
    pub name: String,
    pub created_at: String,
    #[serde(rename = "_links")]
    pub links: PacticipantLinks,
}

impl PacticipantResponse {
    pub fn new(pacticipant: &Pacticipant, base_url: &str) -> Self {
        Self {
            name: pacticipant.name.clone(),
            created_at: pacticipant.created_at.clone(),
            links: PacticipantLinks {
                self_link: pacticipant_link(pacticipant, base_url),
            },
        }
    }
}

pub fn pacticipant_link(pacticipant: &Pacticipant, base_url: &str) -> Link {
    Link {
        href: resource_url(base_url, &["pacticipants", &pacticipant.name]),
        title: Some(pacticipant.name.clone()),
    }
}
