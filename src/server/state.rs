use crate::server::database::store::Store;
use crate::server::model::config::PaymentConfig;
use crate::server::payment::PaymentGateway;

/// Dependencies shared by every handler, built once in `main`
pub(crate) struct AppState<S: Store, P: PaymentGateway> {
    store: S,
    payments: P,
    payment_config: PaymentConfig,
}

impl<S: Store, P: PaymentGateway> AppState<S, P> {
    pub fn new(store: S, payments: P, payment_config: PaymentConfig) -> Self {
        Self {
            store,
            payments,
            payment_config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn payments(&self) -> &P {
        &self.payments
    }

    pub fn payment_config(&self) -> &PaymentConfig {
        &self.payment_config
    }
}
