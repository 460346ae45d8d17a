use crate::server::controller::caller::Caller;
use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::checkout::{line_quantity, CreateOrderRequest, CreateOrderResponse};
use crate::server::model::order::{NewOrder, OrderCartItem};
use crate::server::payment::{CheckoutSessionRequest, PaymentError, PaymentGateway};
use crate::server::state::AppState;
use crate::server::util::time::helper::get_utc_now;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use std::time::Duration;
use storefront::cart::Cart;
use tokio::{pin, select, time};

/// Upper bound for opening a hosted checkout session
const PAYMENT_TIMEOUT: Duration = Duration::from_secs(15);

/// Persist an unpaid order for the submitted cart and open a hosted checkout session for it
pub(crate) async fn create_order<S: Store, P: PaymentGateway>(
    caller: Caller,
    body: web::Json<CreateOrderRequest>,
    data: web::Data<AppState<S, P>>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    caller.ensure_is(body.user_id)?;
    body.validate().map_err(ApiError::BadRequest)?;
    let contact = body.contact();

    // the browser may send the same line twice
    let cart = Cart::from_items(body.cart).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    cart.items()
        .iter()
        .try_for_each(line_quantity)
        .map_err(ApiError::BadRequest)?;

    // charge what the menu says now, not what the browser cached
    let ids = cart.items().iter().map(|item| item.menu.id).collect::<Vec<_>>();
    let current = data.store().menu_items(&ids).await?;
    let cart_items = cart
        .items()
        .iter()
        .map(|item| {
            let menu = current.get(&item.menu.id).ok_or_else(|| {
                ApiError::BadRequest(format!("unknown menu item {}", item.menu.id))
            })?;
            Ok(OrderCartItem {
                menu_id: menu.id,
                name: menu.name.clone(),
                size: item.size,
                unit_price: menu.price,
                quantity: item.quantity,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let order = data
        .store()
        .create_order(NewOrder {
            user_id: body.user_id,
            contact,
            created_at: get_utc_now(),
            cart_items,
        })
        .await?;
    info!("order {} created for user {}", order.id, order.user_id);

    let request = CheckoutSessionRequest::for_order(&order, data.payment_config()).map_err(|e| {
        error!("cannot price order {}, {}", order.id, e);
        ApiError::PaymentProvider
    })?;

    let sleep = time::sleep(PAYMENT_TIMEOUT);
    pin!(sleep);
    let session = select! {
        result = data.payments().create_checkout_session(&request) => {
            result.map_err(|e| {
                warn!("checkout session for order {} failed, {}", order.id, e);
                ApiError::PaymentProvider
            })?
        },
        _ = &mut sleep => {
            warn!("timeout opening checkout session for order {}", order.id);
            return Err(ApiError::Timeout);
        }
    };
    let url = session.url.ok_or(PaymentError::MissingUrl).map_err(|e| {
        warn!("checkout session {} for order {} is unusable, {}", session.id, order.id, e);
        ApiError::PaymentProvider
    })?;

    Ok(HttpResponse::Created().json(CreateOrderResponse {
        stripe_session_url: url,
        message: "Order created".to_string(),
    }))
}
