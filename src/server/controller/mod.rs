pub(crate) mod caller;
pub(crate) mod checkout;
pub(crate) mod error;
pub(crate) mod menu;
pub(crate) mod user;
pub(crate) mod webhook;
