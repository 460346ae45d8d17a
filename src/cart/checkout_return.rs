use actix_web::web;
use derive_more::{Display, Error};
use serde::Deserialize;
use std::str::FromStr;

/// How the hosted checkout page sent the customer back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Success,
    Canceled,
}

/// The redirect the hosted checkout ends with, e.g.
/// `https://shop.example/checkout?orderId=42&success=true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutReturn {
    pub order_id: i64,
    pub outcome: CheckoutOutcome,
}

#[derive(Debug, Display, Error, PartialEq)]
pub enum ReturnParseError {
    #[display("return url has no orderId")]
    MissingOrderId,
    #[display("invalid orderId {_0}")]
    InvalidOrderId(#[error(not(source))] String),
    #[display("return url carries neither success nor canceled")]
    MissingOutcome,
    #[display("malformed return query, {_0}")]
    Malformed(#[error(not(source))] String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReturnQuery {
    order_id: Option<String>,
    success: Option<String>,
    canceled: Option<String>,
}

impl FromStr for CheckoutReturn {
    type Err = ReturnParseError;

    /// Accepts a full url or only its query string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let query = match s.split_once('?') {
            Some((_, query)) => query,
            None => s,
        };
        let query = query.split('#').next().unwrap_or_default();

        let ReturnQuery {
            order_id,
            success,
            canceled,
        } = web::Query::<ReturnQuery>::from_query(query)
            .map_err(|e| ReturnParseError::Malformed(e.to_string()))?
            .into_inner();

        let order_id = order_id
            .map(|id| {
                id.parse::<i64>()
                    .map_err(|_| ReturnParseError::InvalidOrderId(id.clone()))
            })
            .transpose()?;
        let outcome = if success.as_deref() == Some("true") {
            Some(CheckoutOutcome::Success)
        } else if canceled.as_deref() == Some("true") {
            Some(CheckoutOutcome::Canceled)
        } else {
            None
        };

        Ok(Self {
            order_id: order_id.ok_or(ReturnParseError::MissingOrderId)?,
            outcome: outcome.ok_or(ReturnParseError::MissingOutcome)?,
        })
    }
}
