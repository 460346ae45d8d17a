//! Types shared by the storefront server and its client cli

pub mod cart;
pub mod pricing;
