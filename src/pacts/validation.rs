use serde_json::Value;

use crate::types::ValidationErrors;

use super::PublishPact;

/// Checks the coordinates and content of a pact before anything is written.
///
/// The content must be a JSON object. Participant names embedded in the
/// document, when present, must agree with the coordinates it is published
/// under.
pub fn validate_publication(req: &PublishPact<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if req.provider_name.trim().is_empty() {
        errors.add("provider", "cannot be blank");
    }
    if req.consumer_name.trim().is_empty() {
        errors.add("consumer", "cannot be blank");
    }
    if req.consumer_version_number.trim().is_empty() {
        errors.add("consumer_version_number", "cannot be blank");
    }

    match serde_json::from_str::<Value>(req.json_content) {
        Ok(Value::Object(content)) => {
            check_embedded_name(&mut errors, &content, "consumer", req.consumer_name);
            check_embedded_name(&mut errors, &content, "provider", req.provider_name);
        }
        Ok(_) => errors.add("content", "must be a JSON object"),
        Err(err) => errors.add("content", format!("is not valid JSON: {err}")),
    }

    errors.into_result()
}

fn check_embedded_name(
    errors: &mut ValidationErrors,
    content: &serde_json::Map<String, Value>,
    role: &str,
    expected: &str,
) {
    let Some(embedded) = content
        .get(role)
        .and_then(|party| party.get("name"))
        .and_then(Value::as_str)
    else {
        return;
    };

    if !embedded.trim().eq_ignore_ascii_case(expected.trim()) {
        errors.add(
            format!("{role}.name"),
            format!("in pact ('{embedded}') does not match {role} name in path ('{expected}')"),
        );
    }
}
