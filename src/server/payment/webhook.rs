//! Signed webhook deliveries.
//!
//! The signature header looks like `t=1700000000,v1=<hex hmac>,v1=<hex hmac>`.
//! Each `v1` is an HMAC-SHA256 of `"{t}.{raw body}"` under the endpoint secret;
//! several may be present while a secret is being rolled.

use crate::server::model::OrderId;
use crate::server::payment::PaymentError;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use std::collections::HashMap;

type HmacSha256 = Hmac<Sha256>;

pub(crate) const SIGNATURE_HEADER: &str = "stripe-signature";
/// deliveries signed further than this from now are refused
pub(crate) const TOLERANCE_SECONDS: i64 = 300;

pub(crate) const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Check `header` against `payload` and the endpoint `secret`.
pub(crate) fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<(), PaymentError> {
    let mut timestamp = None;
    let mut signatures = vec![];
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", t)) => {
                timestamp = Some(
                    t.parse::<i64>()
                        .map_err(|_| PaymentError::MalformedSignatureHeader)?,
                )
            }
            Some(("v1", sig)) => signatures.push(sig),
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(PaymentError::MalformedSignatureHeader)?;
    if signatures.is_empty() {
        return Err(PaymentError::MalformedSignatureHeader);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|sig| match hex::decode(sig) {
        Ok(bytes) => mac.clone().verify_slice(&bytes).is_ok(),
        Err(_) => false,
    });
    if !matched {
        return Err(PaymentError::InvalidSignature);
    }
    if (now.timestamp() - timestamp).abs() > TOLERANCE_SECONDS {
        return Err(PaymentError::StaleTimestamp);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    payment_status: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// A verified provider event
#[derive(Debug)]
pub(crate) struct WebhookEvent {
    pub id: String,
    pub kind: String,
    object: Value,
    /// the event as delivered, echoed back in the response
    pub raw: Value,
}

impl WebhookEvent {
    /// The order to mark paid, if this event reports a completed and paid checkout.
    pub fn paid_order(&self) -> Result<Option<OrderId>, PaymentError> {
        if self.kind != CHECKOUT_SESSION_COMPLETED {
            return Ok(None);
        }
        let session: CheckoutSessionObject = serde_json::from_value(self.object.clone())
            .map_err(|e| PaymentError::MalformedEvent(e.to_string()))?;
        if session.payment_status.as_deref() != Some("paid") {
            return Ok(None);
        }
        let order_id = session
            .metadata
            .get("orderId")
            .ok_or_else(|| PaymentError::MalformedEvent("metadata has no orderId".to_string()))?;
        order_id
            .parse::<OrderId>()
            .map(Some)
            .map_err(|_| PaymentError::MalformedEvent(format!("invalid orderId {order_id}")))
    }
}

/// Verify the delivery and parse it; nothing in an unverified body is trusted.
pub(crate) fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<WebhookEvent, PaymentError> {
    verify_signature(payload, header, secret, now)?;
    let raw: Value =
        serde_json::from_slice(payload).map_err(|e| PaymentError::MalformedEvent(e.to_string()))?;
    let envelope: EventEnvelope = serde_json::from_value(raw.clone())
        .map_err(|e| PaymentError::MalformedEvent(e.to_string()))?;
    Ok(WebhookEvent {
        id: envelope.id,
        kind: envelope.kind,
        object: envelope.data.object,
        raw,
    })
}

/// Build a valid signature header the way the provider does
#[cfg(test)]
pub(crate) fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
pub(crate) fn completed_event(order_id: &str, payment_status: &str) -> Vec<u8> {
    serde_json::json!({
        "id": "evt_test",
        "type": CHECKOUT_SESSION_COMPLETED,
        "data": {
            "object": {
                "id": "cs_test",
                "payment_status": payment_status,
                "metadata": { "orderId": order_id, "userId": "1" }
            }
        }
    })
    .to_string()
    .into_bytes()
}
