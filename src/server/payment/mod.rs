//! Hosted checkout provider seam

pub(crate) mod stripe;
pub(crate) mod webhook;
#[cfg(test)]
pub(crate) mod fake;

use crate::server::model::config::PaymentConfig;
use crate::server::model::order::Order;
use crate::server::model::{OrderId, UserId};
use derive_more::{Display, Error};
use serde::Deserialize;
use storefront::cart::Size;
use storefront::pricing::{self, PricingError};

#[derive(Debug, Display, Error)]
pub(crate) enum PaymentError {
    #[display("invalid amount, {_0}")]
    Amount(PricingError),
    #[display("provider unreachable: {_0}")]
    Transport(#[error(not(source))] String),
    #[display("provider rejected request with status {status}: {body}")]
    Provider { status: u16, body: String },
    #[display("unreadable provider response: {_0}")]
    MalformedResponse(#[error(not(source))] String),
    #[display("provider returned a session without url")]
    MissingUrl,
    #[display("malformed signature header")]
    MalformedSignatureHeader,
    #[display("signature does not match payload")]
    InvalidSignature,
    #[display("signature timestamp outside tolerance")]
    StaleTimestamp,
    #[display("malformed event: {_0}")]
    MalformedEvent(#[error(not(source))] String),
}

impl From<PricingError> for PaymentError {
    fn from(e: PricingError) -> Self {
        PaymentError::Amount(e)
    }
}

/// One product line on the hosted checkout page, amount in minor units
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SessionLineItem {
    pub name: String,
    pub size: Size,
    pub unit_amount: i64,
    pub quantity: u32,
}

/// Everything the provider needs to open a checkout session for one order
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CheckoutSessionRequest {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub customer_email: String,
    pub currency: &'static str,
    pub line_items: Vec<SessionLineItem>,
    pub delivery_fee_amount: i64,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutSessionRequest {
    /// The only place where major-unit prices become provider minor units.
    pub fn for_order(order: &Order, config: &PaymentConfig) -> Result<Self, PaymentError> {
        let line_items = order
            .cart_items
            .iter()
            .map(|item| {
                Ok(SessionLineItem {
                    name: item.name.clone(),
                    size: item.size,
                    unit_amount: pricing::to_minor_units(item.unit_price)?,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        Ok(Self {
            order_id: order.id,
            user_id: order.user_id,
            customer_email: order.contact.email.clone(),
            currency: pricing::CURRENCY,
            line_items,
            delivery_fee_amount: pricing::to_minor_units(pricing::DELIVERY_FEE)?,
            success_url: config.success_url(order.id),
            cancel_url: config.cancel_url(order.id),
        })
    }

    /// Sum the provider will charge, in minor units
    pub fn amount_total(&self) -> i64 {
        self.line_items
            .iter()
            .map(|item| item.unit_amount * i64::from(item.quantity))
            .sum::<i64>()
            + self.delivery_fee_amount
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// A hosted checkout provider
pub(crate) trait PaymentGateway: Send + Sync + 'static {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// shared secret webhook deliveries are signed with
    fn webhook_secret(&self) -> &str;
}
