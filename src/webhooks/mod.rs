mod store;
mod validation;

pub use store::{CreatedWebhook, create_webhook, find_webhook, list_webhooks};
pub use validation::{
    ALLOWED_METHODS, IdAssignment, NewWebhook, WebhookScope, generate_uuid, validate,
};
