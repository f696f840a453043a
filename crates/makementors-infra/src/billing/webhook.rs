//! Stripe webhook verification and event parsing.
//!
//! Verifies the `Stripe-Signature` header (HMAC-SHA256 over
//! `"{timestamp}.{payload}"`) and reduces the raw event JSON to the
//! [`BillingEvent`] transitions the subscriber table cares about. Events the
//! subscriber model does not track parse to `None` and are acknowledged
//! without side effects.

use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use makementors_types::billing::BillingEvent;
use makementors_types::error::BillingError;
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age of a signed payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a `Stripe-Signature` header against the raw payload.
///
/// The header carries `t=<unix ts>,v1=<hex hmac>[,v1=...]`; the signed
/// message is `"{t}.{payload}"`. Any matching `v1` signature within the
/// timestamp tolerance passes. The HMAC comparison is constant-time.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    webhook_secret: &str,
    now: DateTime<Utc>,
) -> Result<(), BillingError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in signature_header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(value)) => {
                timestamp = value.parse().ok();
            }
            (Some("v1"), Some(value)) => {
                if let Some(bytes) = decode_hex(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(BillingError::SignatureInvalid)?;
    if signatures.is_empty() {
        return Err(BillingError::SignatureInvalid);
    }

    let age = (now.timestamp() - timestamp).abs();
    if age > SIGNATURE_TOLERANCE_SECS {
        return Err(BillingError::SignatureInvalid);
    }

    for signature in &signatures {
        let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())
            .map_err(|_| BillingError::SignatureInvalid)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(signature).is_ok() {
            return Ok(());
        }
    }

    Err(BillingError::SignatureInvalid)
}

/// Sign a payload the way the provider does. Used by tests and local tooling.
pub fn sign_payload(payload: &[u8], webhook_secret: &str, timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let digest = mac.finalize().into_bytes();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("t={timestamp},v1={hex}")
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Reduce a raw provider event to a [`BillingEvent`], or `None` for event
/// types the subscriber model does not track.
pub fn parse_event(payload: &[u8]) -> Result<Option<BillingEvent>, BillingError> {
    let event: Value = serde_json::from_slice(payload)
        .map_err(|e| BillingError::MalformedEvent(e.to_string()))?;

    let event_type = event
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| BillingError::MalformedEvent("missing event type".to_string()))?;

    let object = event
        .pointer("/data/object")
        .ok_or_else(|| BillingError::MalformedEvent("missing data.object".to_string()))?;

    match event_type {
        "checkout.session.completed" => {
            let user_id = object
                .get("client_reference_id")
                .and_then(Value::as_str)
                .or_else(|| object.pointer("/metadata/user_id").and_then(Value::as_str))
                .ok_or_else(|| {
                    BillingError::MalformedEvent("checkout without user reference".to_string())
                })?
                .to_string();
            let customer_id = object
                .get("customer")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    BillingError::MalformedEvent("checkout without customer".to_string())
                })?
                .to_string();
            let email = object
                .pointer("/customer_details/email")
                .and_then(Value::as_str)
                .or_else(|| object.get("customer_email").and_then(Value::as_str))
                .unwrap_or_default()
                .to_string();

            Ok(Some(BillingEvent::CheckoutCompleted {
                user_id,
                email,
                customer_id,
                tier: subscription_tier(object),
                current_period_end: period_end(object),
            }))
        }
        "customer.subscription.updated" | "customer.subscription.created" => {
            let customer_id = customer_of(object)?;
            let status = object.get("status").and_then(Value::as_str).unwrap_or("");
            Ok(Some(BillingEvent::SubscriptionUpdated {
                customer_id,
                tier: subscription_tier(object),
                current_period_end: period_end(object),
                active: matches!(status, "active" | "trialing"),
            }))
        }
        "customer.subscription.deleted" => {
            let customer_id = customer_of(object)?;
            Ok(Some(BillingEvent::SubscriptionDeleted { customer_id }))
        }
        _ => Ok(None),
    }
}

fn customer_of(object: &Value) -> Result<String, BillingError> {
    object
        .get("customer")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .ok_or_else(|| BillingError::MalformedEvent("event without customer".to_string()))
}

fn subscription_tier(object: &Value) -> Option<String> {
    object
        .pointer("/items/data/0/price/nickname")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

fn period_end(object: &Value) -> Option<DateTime<Utc>> {
    object
        .get("current_period_end")
        .and_then(Value::as_i64)
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    #[test]
    fn test_signature_roundtrip() {
        let payload = br#"{"type":"customer.subscription.deleted"}"#;
        let now = Utc::now();
        let header = sign_payload(payload, SECRET, now.timestamp());

        assert!(verify_signature(payload, &header, SECRET, now).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let payload = br#"{"type":"customer.subscription.deleted"}"#;
        let now = Utc::now();
        let header = sign_payload(payload, SECRET, now.timestamp());

        let tampered = br#"{"type":"customer.subscription.updated"}"#;
        assert!(matches!(
            verify_signature(tampered, &header, SECRET, now),
            Err(BillingError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = b"{}";
        let now = Utc::now();
        let header = sign_payload(payload, SECRET, now.timestamp());
        assert!(verify_signature(payload, &header, "whsec_other", now).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = b"{}";
        let now = Utc::now();
        let stale = now.timestamp() - SIGNATURE_TOLERANCE_SECS - 1;
        let header = sign_payload(payload, SECRET, stale);
        assert!(verify_signature(payload, &header, SECRET, now).is_err());
    }

    #[test]
    fn test_malformed_header_rejected() {
        let payload = b"{}";
        assert!(verify_signature(payload, "nonsense", SECRET, Utc::now()).is_err());
        assert!(verify_signature(payload, "t=123", SECRET, Utc::now()).is_err());
    }

    #[test]
    fn test_parse_checkout_completed() {
        let payload = br#"{
            "type": "checkout.session.completed",
            "data": { "object": {
                "client_reference_id": "user-1",
                "customer": "cus_42",
                "customer_details": { "email": "ada@example.com" }
            }}
        }"#;
        let event = parse_event(payload).unwrap().unwrap();
        assert_eq!(
            event,
            BillingEvent::CheckoutCompleted {
                user_id: "user-1".to_string(),
                email: "ada@example.com".to_string(),
                customer_id: "cus_42".to_string(),
                tier: None,
                current_period_end: None,
            }
        );
    }

    #[test]
    fn test_parse_subscription_updated() {
        let payload = br#"{
            "type": "customer.subscription.updated",
            "data": { "object": {
                "customer": "cus_42",
                "status": "active",
                "current_period_end": 1767225600,
                "items": { "data": [ { "price": { "nickname": "premium" } } ] }
            }}
        }"#;
        let event = parse_event(payload).unwrap().unwrap();
        match event {
            BillingEvent::SubscriptionUpdated {
                customer_id,
                tier,
                current_period_end,
                active,
            } => {
                assert_eq!(customer_id, "cus_42");
                assert_eq!(tier.as_deref(), Some("premium"));
                assert!(current_period_end.is_some());
                assert!(active);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_subscription_deleted() {
        let payload = br#"{
            "type": "customer.subscription.deleted",
            "data": { "object": { "customer": "cus_42" } }
        }"#;
        let event = parse_event(payload).unwrap().unwrap();
        assert_eq!(
            event,
            BillingEvent::SubscriptionDeleted {
                customer_id: "cus_42".to_string()
            }
        );
    }

    #[test]
    fn test_untracked_event_is_none() {
        let payload = br#"{"type": "invoice.paid", "data": {"object": {}}}"#;
        assert!(parse_event(payload).unwrap().is_none());
    }

    #[test]
    fn test_garbage_payload_is_malformed() {
        assert!(matches!(
            parse_event(b"not json"),
            Err(BillingError::MalformedEvent(_))
        ));
    }
}
