use crate::server::model::config::PaymentConfig;
use crate::server::payment::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway};
use log::{error, info};
use reqwest::Client;
use std::time::Duration;

const API_VERSION: &str = "2023-10-16";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Stripe Checkout over its REST api
pub(crate) struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
        })
    }
}

/// Stripe takes nested parameters as bracketed form keys.
pub(crate) fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("customer_email".to_string(), request.customer_email.clone()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("metadata[orderId]".to_string(), request.order_id.to_string()),
        ("metadata[userId]".to_string(), request.user_id.to_string()),
    ];
    for (i, item) in request.line_items.iter().enumerate() {
        let key = |suffix: &str| format!("line_items[{i}]{suffix}");
        form.extend([
            (key("[quantity]"), item.quantity.to_string()),
            (key("[price_data][currency]"), request.currency.to_string()),
            (key("[price_data][unit_amount]"), item.unit_amount.to_string()),
            (key("[price_data][product_data][name]"), item.name.clone()),
            (key("[price_data][product_data][description]"), item.size.to_string()),
            (key("[price_data][product_data][metadata][size]"), item.size.to_string()),
        ]);
    }
    let shipping = "shipping_options[0][shipping_rate_data]";
    form.extend([
        (format!("{shipping}[display_name]"), "Delivery fee".to_string()),
        (format!("{shipping}[type]"), "fixed_amount".to_string()),
        (format!("{shipping}[fixed_amount][amount]"), request.delivery_fee_amount.to_string()),
        (format!("{shipping}[fixed_amount][currency]"), request.currency.to_string()),
    ]);
    form
}

impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let res = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .header("Stripe-Version", API_VERSION)
            .form(&session_form(request))
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!("stripe rejected checkout session for order {}, status={}", request.order_id, status);
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let session = res
            .json::<CheckoutSession>()
            .await
            .map_err(|e| PaymentError::MalformedResponse(e.to_string()))?;
        info!(
            "opened checkout session {} for order {}, amount={} {}",
            session.id,
            request.order_id,
            request.amount_total(),
            request.currency
        );
        Ok(session)
    }

    fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::payment::SessionLineItem;
    use storefront::cart::Size;

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn form_encodes_lines_delivery_and_metadata() {
        let request = CheckoutSessionRequest {
            order_id: 42,
            user_id: 7,
            customer_email: "ana@example.com".to_string(),
            currency: "EUR",
            line_items: vec![
                SessionLineItem {
                    name: "Margherita".to_string(),
                    size: Size::Normal,
                    unit_amount: 1000,
                    quantity: 2,
                },
                SessionLineItem {
                    name: "Tiramisu".to_string(),
                    size: Size::Small,
                    unit_amount: 500,
                    quantity: 1,
                },
            ],
            delivery_fee_amount: 200,
            success_url: "http://shop.test/checkout?orderId=42&success=true".to_string(),
            cancel_url: "http://shop.test/checkout?orderId=42&canceled=true".to_string(),
        };
        let form = session_form(&request);

        assert_eq!(value(&form, "mode"), Some("payment"));
        assert_eq!(value(&form, "metadata[orderId]"), Some("42"));
        assert_eq!(value(&form, "metadata[userId]"), Some("7"));
        assert_eq!(value(&form, "line_items[0][price_data][unit_amount]"), Some("1000"));
        assert_eq!(value(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(value(&form, "line_items[1][price_data][product_data][description]"), Some("SMALL"));
        assert_eq!(
            value(&form, "shipping_options[0][shipping_rate_data][fixed_amount][amount]"),
            Some("200")
        );
        assert_eq!(value(&form, "line_items[2][quantity]"), None);
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let client = StripeClient::new(&PaymentConfig {
            secret_key: "sk".to_string(),
            webhook_secret: "whsec".to_string(),
            api_base: "https://api.stripe.com/".to_string(),
            public_url: "http://shop.test".to_string(),
        })
        .unwrap();
        assert_eq!(client.api_base, "https://api.stripe.com");
        assert_eq!(client.webhook_secret(), "whsec");
    }
}
