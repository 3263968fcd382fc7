//! Domain Services
//!
//! Pure signing and verification logic for eSewa. The shared secret is the
//! only input that never leaves this process.

use platform::crypto::{from_base64, hmac_sha256, to_base64, verify_hmac_sha256};
use platform::secret::SecretKey;
use serde_json::{Map, Value};

use crate::domain::entities::{EsewaCallback, EsewaSignature};
use crate::domain::value_objects::{Amount, EsewaStatus, ProductCode, TransactionUuid};
use crate::error::{PaymentError, PaymentResult};

/// Field names covered by a request signature, in message order
pub const SIGNED_FIELD_NAMES: &str = "total_amount,transaction_uuid,product_code";

/// Message signed for a payment request: `"{amount},{transactionId},{productCode}"`
pub fn esewa_signing_message(
    total_amount: Amount,
    transaction_uuid: &TransactionUuid,
    product_code: &ProductCode,
) -> String {
    format!(
        "{},{},{}",
        total_amount.to_gateway_string(),
        transaction_uuid,
        product_code
    )
}

/// Sign an eSewa payment request
///
/// HMAC-SHA256 over [`esewa_signing_message`] with the merchant secret,
/// base64 encoded (standard alphabet, padded).
pub fn generate_esewa_signature(
    total_amount: Amount,
    transaction_uuid: &TransactionUuid,
    product_code: &ProductCode,
    secret: &SecretKey,
) -> EsewaSignature {
    let message = esewa_signing_message(total_amount, transaction_uuid, product_code);
    let signature = to_base64(&hmac_sha256(secret.as_bytes(), message.as_bytes()));

    EsewaSignature {
        total_amount,
        transaction_uuid: transaction_uuid.clone(),
        product_code: product_code.clone(),
        signed_field_names: SIGNED_FIELD_NAMES,
        signature,
    }
}

/// Render one callback value the way it appears in the signed message
fn callback_field(payload: &Map<String, Value>, name: &str) -> PaymentResult<String> {
    match payload.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(_) => Err(PaymentError::InvalidCallback(format!(
            "field {name} is not a scalar"
        ))),
        None => Err(PaymentError::InvalidCallback(format!("missing field {name}"))),
    }
}

/// Amount as eSewa renders it in callbacks (`"1,000.0"`)
///
/// Only called after the signature has been checked over the raw text.
fn callback_amount(raw: &str) -> PaymentResult<Amount> {
    Amount::parse(&raw.replace(',', ""))
}

/// Message signed by eSewa for a callback payload
///
/// `name=value` pairs joined by `,` in the order given by the payload's
/// own `signed_field_names`.
pub fn callback_signing_message(payload: &Map<String, Value>) -> PaymentResult<String> {
    let names = callback_field(payload, "signed_field_names")?;
    let names: Vec<&str> = names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Err(PaymentError::InvalidCallback(
            "signed_field_names is empty".to_string(),
        ));
    }

    let mut pairs = Vec::with_capacity(names.len());
    for name in names {
        pairs.push(format!("{name}={}", callback_field(payload, name)?));
    }

    Ok(pairs.join(","))
}

/// Decode and authenticate the `data` parameter of the eSewa success redirect
///
/// The signature only proves eSewa produced the payload; settlement must
/// still be confirmed through the status API.
pub fn decode_esewa_callback(data: &str, secret: &SecretKey) -> PaymentResult<EsewaCallback> {
    let raw = from_base64(data.trim())
        .map_err(|_| PaymentError::InvalidCallback("data is not base64".to_string()))?;
    let payload: Map<String, Value> = serde_json::from_slice(&raw)
        .map_err(|_| PaymentError::InvalidCallback("data is not a JSON object".to_string()))?;

    let message = callback_signing_message(&payload)?;
    let signature = callback_field(&payload, "signature")?;
    let tag = from_base64(&signature).map_err(|_| PaymentError::SignatureMismatch)?;

    if !verify_hmac_sha256(secret.as_bytes(), message.as_bytes(), &tag) {
        return Err(PaymentError::SignatureMismatch);
    }

    Ok(EsewaCallback {
        transaction_code: callback_field(&payload, "transaction_code").ok(),
        status: EsewaStatus::from_wire(&callback_field(&payload, "status")?),
        total_amount: callback_amount(&callback_field(&payload, "total_amount")?)?,
        transaction_uuid: TransactionUuid::new(callback_field(&payload, "transaction_uuid")?)?,
        product_code: ProductCode::new(callback_field(&payload, "product_code")?)?,
    })
}
