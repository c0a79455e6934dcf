use axum::{
    body::Bytes,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::{
    error::ApiError,
    extractors::ValidPath,
    hal::Hal,
    pacts::{PublishPact, create_or_update, find_view, to_view},
    state::AppState,
    types::{PactView, pacticipant_link, resource_url},
};

type PactPath = (String, String, String);

pub async fn publish_pact_handler(
    State(state): State<AppState>,
    ValidPath((provider, consumer, version)): ValidPath<PactPath>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let content = std::str::from_utf8(&body)
        .map_err(|_| ApiError::validation("content", "must be UTF-8 encoded JSON"))?;

    let published = create_or_update(
        &state.pool,
        &PublishPact {
            provider_name: &provider,
            consumer_name: &consumer,
            consumer_version_number: &version,
            json_content: content,
        },
    )
    .await?;

    let mut conn = state.pool.acquire().await?;
    let view = to_view(&mut *conn, &published.pact).await?;
    let base_url = &state.config.base_url;
    let representation = pact_representation(&view, base_url)?;

    if !published.created {
        return Ok((StatusCode::OK, Hal(representation)).into_response());
    }

    let location = pact_url(base_url, &view);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Hal(representation)).into_response())
}

pub async fn get_pact_handler(
    State(state): State<AppState>,
    ValidPath((provider, consumer, version)): ValidPath<PactPath>,
) -> Result<Hal<Value>, ApiError> {
    let view = find_view(&state.pool, &provider, &consumer, &version)
        .await?
        .ok_or_else(|| ApiError::NotFound("pact not found".to_string()))?;

    Ok(Hal(pact_representation(&view, &state.config.base_url)?))
}

/// Stored pact content with timestamps and links merged into the top level.
fn pact_representation(view: &PactView, base_url: &str) -> Result<Value, ApiError> {
    let mut content: Value = serde_json::from_str(&view.json_content)
        .map_err(|err| ApiError::Internal(format!("stored pact is not valid JSON: {err}")))?;
    let Some(object) = content.as_object_mut() else {
        return Err(ApiError::Internal("stored pact is not a JSON object".to_string()));
    };

    object.insert("createdAt".to_string(), json!(view.created_at));
    object.insert("updatedAt".to_string(), json!(view.updated_at));
    object.insert(
        "_links".to_string(),
        json!({
            "self": { "href": pact_url(base_url, view) },
            "pb:consumer": pacticipant_link(&view.consumer, base_url),
            "pb:provider": pacticipant_link(&view.provider, base_url),
        }),
    );

    Ok(content)
}

fn pact_url(base_url: &str, view: &PactView) -> String {
    resource_url(
        base_url,
        &[
            "pacts",
            "provider",
            &view.provider.name,
            "consumer",
            &view.consumer.name,
            "version",
            &view.consumer_version_number,
        ],
    )
}
