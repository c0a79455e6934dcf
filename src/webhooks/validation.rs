use std::collections::BTreeMap;

use axum::http::HeaderName;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use url::Url;
use uuid::Uuid;

use crate::types::{
    PacticipantRef, ValidationErrors, WebhookAttributes, WebhookEvent, WebhookRequest,
};

pub const ALLOWED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

const MAX_UUID_LEN: usize = 128;
const MAX_EVENT_NAME_LEN: usize = 100;

/// Participant names taken from the request path. They take precedence over
/// any `consumer` / `provider` objects in the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookScope {
    pub consumer: Option<String>,
    pub provider: Option<String>,
}

/// How the webhook's identifier is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdAssignment {
    /// POST: the registry generates a fresh id.
    Generate,
    /// PUT: the id from the path is used verbatim and creation is idempotent.
    Explicit(String),
}

/// A webhook that passed validation, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWebhook {
    pub uuid: String,
    pub description: String,
    pub enabled: bool,
    pub events: Vec<WebhookEvent>,
    pub request: WebhookRequest,
    pub consumer_name: Option<String>,
    pub provider_name: Option<String>,
}

/// Validates submitted attributes, collecting every failure before returning.
pub fn validate(
    attrs: &WebhookAttributes,
    scope: &WebhookScope,
    id: &IdAssignment,
) -> Result<NewWebhook, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let uuid = match id {
        IdAssignment::Generate => generate_uuid(),
        IdAssignment::Explicit(uuid) => {
            validate_uuid(&mut errors, uuid);
            uuid.clone()
        }
    };

    let description = match attrs.description.as_deref() {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        Some(_) => {
            errors.add("description", "cannot be blank");
            String::new()
        }
        None => {
            errors.add("description", "is required");
            String::new()
        }
    };

    let events = validate_events(&mut errors, attrs);
    let request = validate_request(&mut errors, attrs);

    let consumer_name = scoped_name(
        &mut errors,
        "consumer",
        scope.consumer.as_deref(),
        attrs.consumer.as_ref(),
    );
    let provider_name = scoped_name(
        &mut errors,
        "provider",
        scope.provider.as_deref(),
        attrs.provider.as_ref(),
    );

    errors.into_result()?;

    Ok(NewWebhook {
        uuid,
        description,
        enabled: attrs.enabled.unwrap_or(true),
        events,
        request,
        consumer_name,
        provider_name,
    })
}

/// 22-character URL-safe identifier derived from a random v4 UUID.
pub fn generate_uuid() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

fn validate_uuid(errors: &mut ValidationErrors, uuid: &str) {
    if uuid.is_empty() {
        errors.add("uuid", "cannot be blank");
    } else if uuid.len() > MAX_UUID_LEN {
        errors.add("uuid", format!("must be at most {MAX_UUID_LEN} characters"));
    } else if !uuid
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        errors.add("uuid", "may only contain letters, digits, '-' and '_'");
    }
}

fn validate_events(errors: &mut ValidationErrors, attrs: &WebhookAttributes) -> Vec<WebhookEvent> {
    let Some(events) = attrs.events.as_ref() else {
        errors.add("events", "is required");
        return Vec::new();
    };
    if events.is_empty() {
        errors.add("events", "must contain at least one event");
        return Vec::new();
    }

    let mut validated = Vec::with_capacity(events.len());
    for (index, event) in events.iter().enumerate() {
        let field = format!("events[{index}].name");
        match event.name.as_deref() {
            None => errors.add(field, "is required"),
            Some(name) if !is_recognized_event_name(name.trim()) => errors.add(
                field,
                format!("'{name}' is not a recognized event name (use lowercase snake_case)"),
            ),
            Some(name) => validated.push(WebhookEvent {
                name: name.to_string(),
            }),
        }
    }
    validated
}

fn is_recognized_event_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    let Some(first) = bytes.next() else {
        return false;
    };
    name.len() <= MAX_EVENT_NAME_LEN
        && first.is_ascii_lowercase()
        && bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

fn validate_request(errors: &mut ValidationErrors, attrs: &WebhookAttributes) -> WebhookRequest {
    let mut request = WebhookRequest {
        method: String::new(),
        url: String::new(),
        headers: BTreeMap::new(),
        body: None,
    };

    let Some(attrs) = attrs.request.as_ref() else {
        errors.add("request", "is required");
        return request;
    };

    match attrs.method.as_deref() {
        None => errors.add("request.method", "is required"),
        Some(method) if method.trim().is_empty() => errors.add("request.method", "is required"),
        Some(method) => {
            let upper = method.trim().to_ascii_uppercase();
            if ALLOWED_METHODS.contains(&upper.as_str()) {
                request.method = method.to_string();
            } else {
                errors.add(
                    "request.method",
                    format!("'{method}' is not one of {}", ALLOWED_METHODS.join(", ")),
                );
            }
        }
    }

    match attrs.url.as_deref() {
        None => errors.add("request.url", "is required"),
        Some(raw) if raw.trim().is_empty() => errors.add("request.url", "is required"),
        Some(raw) => match Url::parse(raw.trim()) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
                request.url = raw.to_string();
            }
            Ok(_) => errors.add("request.url", "must be an absolute http or https URL"),
            Err(err) => errors.add("request.url", format!("is not a valid URL: {err}")),
        },
    }

    if let Some(headers) = attrs.headers.as_ref() {
        for name in headers.keys() {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                errors.add("request.headers", format!("'{name}' is not a valid header name"));
            }
        }
        request.headers = headers.clone();
    }

    request.body = attrs.body.clone();
    request
}

fn scoped_name(
    errors: &mut ValidationErrors,
    role: &str,
    from_path: Option<&str>,
    from_body: Option<&PacticipantRef>,
) -> Option<String> {
    if let Some(name) = from_path {
        let name = name.trim();
        if name.is_empty() {
            errors.add(role, "cannot be blank");
            return None;
        }
        return Some(name.to_string());
    }

    let reference = from_body?;
    match reference.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        Some(_) => {
            errors.add(format!("{role}.name"), "cannot be blank");
            None
        }
        None => {
            errors.add(format!("{role}.name"), "is required");
            None
        }
    }
}
