//! Recording [`PaymentGateway`] for handler tests

use crate::server::payment::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway};
use std::sync::Mutex;

pub(crate) const FAKE_WEBHOOK_SECRET: &str = "whsec_fake";

#[derive(Default)]
pub(crate) struct FakeGateway {
    requests: Mutex<Vec<CheckoutSessionRequest>>,
    failing: Mutex<bool>,
}

impl FakeGateway {
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn requests(&self) -> Vec<CheckoutSessionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        if *self.failing.lock().unwrap() {
            return Err(PaymentError::Provider {
                status: 500,
                body: "provider down".to_string(),
            });
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(CheckoutSession {
            id: format!("cs_test_{}", request.order_id),
            url: Some(format!("https://checkout.test/pay/cs_test_{}", request.order_id)),
        })
    }

    fn webhook_secret(&self) -> &str {
        FAKE_WEBHOOK_SECRET
    }
}
