use axum::{
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};

use crate::{
    error::ApiError,
    extractors::{ValidJson, ValidPath},
    hal::Hal,
    state::AppState,
    types::{WebhookAttributes, WebhookListResponse, WebhookResponse, webhook_url},
    webhooks::{IdAssignment, WebhookScope, create_webhook, find_webhook, list_webhooks},
};

pub async fn create_webhook_handler(
    State(state): State<AppState>,
    ValidJson(attrs): ValidJson<WebhookAttributes>,
) -> Result<Response, ApiError> {
    create(&state, &attrs, WebhookScope::default(), IdAssignment::Generate).await
}

pub async fn create_provider_consumer_webhook_handler(
    State(state): State<AppState>,
    ValidPath((provider_name, consumer_name)): ValidPath<(String, String)>,
    ValidJson(attrs): ValidJson<WebhookAttributes>,
) -> Result<Response, ApiError> {
    let scope = WebhookScope {
        consumer: Some(consumer_name),
        provider: Some(provider_name),
    };
    create(&state, &attrs, scope, IdAssignment::Generate).await
}

pub async fn create_provider_webhook_handler(
    State(state): State<AppState>,
    ValidPath(provider_name): ValidPath<String>,
    ValidJson(attrs): ValidJson<WebhookAttributes>,
) -> Result<Response, ApiError> {
    let scope = WebhookScope {
        consumer: None,
        provider: Some(provider_name),
    };
    create(&state, &attrs, scope, IdAssignment::Generate).await
}

pub async fn create_consumer_webhook_handler(
    State(state): State<AppState>,
    ValidPath(consumer_name): ValidPath<String>,
    ValidJson(attrs): ValidJson<WebhookAttributes>,
) -> Result<Response, ApiError> {
    let scope = WebhookScope {
        consumer: Some(consumer_name),
        provider: None,
    };
    create(&state, &attrs, scope, IdAssignment::Generate).await
}

/// Idempotent create under a client-chosen id. Answers 201 the first time and
/// 200 when the same attributes are submitted again.
pub async fn put_webhook_handler(
    State(state): State<AppState>,
    ValidPath(uuid): ValidPath<String>,
    ValidJson(attrs): ValidJson<WebhookAttributes>,
) -> Result<Response, ApiError> {
    create(
        &state,
        &attrs,
        WebhookScope::default(),
        IdAssignment::Explicit(uuid),
    )
    .await
}

pub async fn get_webhook_handler(
    State(state): State<AppState>,
    ValidPath(uuid): ValidPath<String>,
) -> Result<Hal<WebhookResponse>, ApiError> {
    let webhook = find_webhook(&state.pool, &uuid).await?;
    Ok(Hal(WebhookResponse::new(&webhook, &state.config.base_url)))
}

pub async fn list_webhooks_handler(
    State(state): State<AppState>,
) -> Result<Hal<WebhookListResponse>, ApiError> {
    let webhooks = list_webhooks(&state.pool).await?;
    Ok(Hal(WebhookListResponse {
        webhooks: webhooks
            .iter()
            .map(|webhook| WebhookResponse::new(webhook, &state.config.base_url))
            .collect(),
    }))
}

async fn create(
    state: &AppState,
    attrs: &WebhookAttributes,
    scope: WebhookScope,
    id: IdAssignment,
) -> Result<Response, ApiError> {
    let result = create_webhook(&state.pool, attrs, &scope, &id).await?;
    let base_url = &state.config.base_url;
    let body = WebhookResponse::new(&result.webhook, base_url);

    if !result.created {
        return Ok((StatusCode::OK, Hal(body)).into_response());
    }

    let location = webhook_url(base_url, &result.webhook.uuid);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Hal(body)).into_response())
}
