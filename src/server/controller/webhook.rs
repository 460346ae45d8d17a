use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::payment::webhook::{construct_event, SIGNATURE_HEADER};
use crate::server::payment::PaymentGateway;
use crate::server::state::AppState;
use crate::server::util::time::helper::get_utc_now;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

/// Provider notifications; a paid checkout completion marks its order paid.
///
/// Redelivery of the same event is harmless, marking an order paid twice leaves it paid.
pub(crate) async fn handle_webhook<S: Store, P: PaymentGateway>(
    req: HttpRequest,
    body: web::Bytes,
    data: web::Data<AppState<S, P>>,
) -> Result<HttpResponse, ApiError> {
    let header = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("webhook delivery without {} header", SIGNATURE_HEADER);
            ApiError::Webhook
        })?;

    let event = construct_event(&body, header, data.payments().webhook_secret(), get_utc_now())
        .map_err(|e| {
            warn!("rejected webhook delivery, {}", e);
            ApiError::Webhook
        })?;

    let order_id = event.paid_order().map_err(|e| {
        warn!("webhook event {} is unusable, {}", event.id, e);
        ApiError::Webhook
    })?;

    match order_id {
        Some(order_id) => {
            if !data.store().mark_paid(order_id).await? {
                warn!("webhook event {} refers to unknown order {}", event.id, order_id);
                return Err(ApiError::Webhook);
            }
            info!("order {} paid, event {}", order_id, event.id);
        }
        None => info!("ignoring webhook event {} of type {}", event.id, event.kind),
    }

    Ok(HttpResponse::Ok().json(WebhookResponse { message: event.raw }))
}

/// The verified event echoed back to the provider
#[derive(Serialize)]
struct WebhookResponse {
    message: Value,
}
