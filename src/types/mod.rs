pub mod api_error;
pub mod pact;
pub mod pacticipant;
pub mod webhook;

use url::Url;

#[allow(unused_imports)]
pub use api_error::{ApiErrorCode, ApiErrorResponse, ValidationErrors};
#[allow(unused_imports)]
pub use pact::{Pact, PactView};
#[allow(unused_imports)]
pub use pacticipant::{
    Link, Pacticipant, PacticipantLinks, PacticipantName, PacticipantResponse, Version,
    pacticipant_link,
};
#[allow(unused_imports)]
pub use webhook::{
    PacticipantRef, Webhook, WebhookAttributes, WebhookEvent, WebhookEventAttributes,
    WebhookLinks, WebhookListResponse, WebhookRequest, WebhookRequestAttributes,
    WebhookResponse, webhook_url,
};

/// Appends `segments` to the path of `base_url`, percent-encoding each one.
///
/// Falls back to `base_url` unchanged if it is not a valid base URL;
/// `AppConfig::from_env` only accepts base URLs that parse.
pub fn resource_url(base_url: &str, segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse(base_url) else {
        return base_url.to_string();
    };
    {
        let Ok(mut path) = url.path_segments_mut() else {
            return base_url.to_string();
        };
        path.pop_if_empty().extend(segments);
    }
    url.into()
}
