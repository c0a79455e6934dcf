use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    handlers::{
        pacticipants::get_pacticipant_handler,
        pacts::{get_pact_handler, publish_pact_handler},
        webhooks::{
            create_consumer_webhook_handler, create_provider_consumer_webhook_handler,
            create_provider_webhook_handler, create_webhook_handler, get_webhook_handler,
            list_webhooks_handler, put_webhook_handler,
        },
    },
    state::AppState,
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/webhooks",
            get(list_webhooks_handler).post(create_webhook_handler),
        )
        .route(
            "/webhooks/:uuid",
            get(get_webhook_handler).put(put_webhook_handler),
        )
        .route(
            "/webhooks/provider/:provider_name/consumer/:consumer_name",
            post(create_provider_consumer_webhook_handler),
        )
        .route(
            "/webhooks/provider/:provider_name",
            post(create_provider_webhook_handler),
        )
        .route(
            "/webhooks/consumer/:consumer_name",
            post(create_consumer_webhook_handler),
        )
        .route(
            "/pacts/provider/:provider_name/consumer/:consumer_name/version/:consumer_version",
            get(get_pact_handler).put(publish_pact_handler),
        )
        .route("/pacticipants/:name", get(get_pacticipant_handler))
        .with_state(state)
}
