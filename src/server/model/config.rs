use std::net::SocketAddrV4;

/// Server configs
#[derive(Debug)]
pub(crate) struct ServerConfig {
    pub addr: SocketAddrV4,
    pub db_read_conn_str: String,
    pub db_write_conn_str: String,
    pub pool_size: usize,
    pub payment: PaymentConfig,
}

impl ServerConfig {
    pub fn new(
        addr: SocketAddrV4,
        db_read_conn_str: String,
        db_write_conn_str: String,
        pool_size: usize,
        payment: PaymentConfig,
    ) -> Self {
        Self {
            addr,
            db_read_conn_str,
            db_write_conn_str,
            pool_size,
            payment,
        }
    }
}

/// Stripe credentials and the urls customers are sent back to
#[derive(Clone)]
pub(crate) struct PaymentConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub api_base: String,
    /// public base url of the storefront, used for checkout return urls
    pub public_url: String,
}

// keep secrets out of logs
impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("api_base", &self.api_base)
            .field("public_url", &self.public_url)
            .finish_non_exhaustive()
    }
}

impl PaymentConfig {
    pub fn success_url(&self, order_id: i64) -> String {
        format!(
            "{}/checkout?orderId={}&success=true",
            self.public_url.trim_end_matches('/'),
            order_id
        )
    }

    pub fn cancel_url(&self, order_id: i64) -> String {
        format!(
            "{}/checkout?orderId={}&canceled=true",
            self.public_url.trim_end_matches('/'),
            order_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront::cart::{CheckoutOutcome, CheckoutReturn};

    fn config() -> PaymentConfig {
        PaymentConfig {
            secret_key: "sk_test_123".to_string(),
            webhook_secret: "whsec_123".to_string(),
            api_base: "https://api.stripe.com".to_string(),
            public_url: "http://localhost:3000/".to_string(),
        }
    }

    #[test]
    fn return_urls_round_trip_through_client_parser() {
        let config = config();
        assert_eq!(config.success_url(5), "http://localhost:3000/checkout?orderId=5&success=true");

        let ret: CheckoutReturn = config.cancel_url(5).parse().unwrap();
        assert_eq!(ret.order_id, 5);
        assert_eq!(ret.outcome, CheckoutOutcome::Canceled);
    }

    #[test]
    fn debug_hides_secrets() {
        let printed = format!("{:?}", config());
        assert!(!printed.contains("sk_test_123"));
        assert!(!printed.contains("whsec_123"));
    }
}
