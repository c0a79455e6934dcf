use serde::{Deserialize, Serialize};
use specta::Type;
use uuid::Uuid;

use super::{Pacticipant, Version};

/// Stored pact row. The consumer is reachable only through `version_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct Pact {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub version_id: Uuid,
    pub json_content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Denormalized projection of a pact for callers outside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct PactView {
    pub id: Uuid,
    pub provider: Pacticipant,
    pub consumer: Pacticipant,
    pub consumer_version_number: String,
    pub consumer_version: Version,
    pub json_content: String,
    pub created_at: String,
    pub updated_at: String,
}
