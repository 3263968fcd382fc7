//! API DTOs (Data Transfer Objects)

use crate::domain::entities::{AttemptStatus, CustomerInfo, EsewaPaymentForm, PaymentAttempt};
use crate::domain::value_objects::{Amount, Gateway};
use crate::error::PaymentResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rupee amount given either as a JSON string or a JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    pub fn parse(&self) -> PaymentResult<Amount> {
        match self {
            AmountInput::Text(raw) => Amount::parse(raw),
            AmountInput::Number(n) => Amount::parse(&n.to_string()),
        }
    }
}

fn parse_charge(input: Option<&AmountInput>) -> PaymentResult<Amount> {
    input.map_or(Ok(Amount::ZERO), AmountInput::parse)
}

/// Request for POST /api/payments/esewa/initiate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsewaInitiateRequest {
    pub amount: AmountInput,
    #[serde(default)]
    pub tax_amount: Option<AmountInput>,
    #[serde(default)]
    pub product_service_charge: Option<AmountInput>,
    #[serde(default)]
    pub product_delivery_charge: Option<AmountInput>,
    #[serde(default)]
    pub transaction_uuid: Option<String>,
}

impl EsewaInitiateRequest {
    /// (amount, tax, service charge, delivery charge)
    pub fn amounts(&self) -> PaymentResult<(Amount, Amount, Amount, Amount)> {
        Ok((
            self.amount.parse()?,
            parse_charge(self.tax_amount.as_ref())?,
            parse_charge(self.product_service_charge.as_ref())?,
            parse_charge(self.product_delivery_charge.as_ref())?,
        ))
    }
}

/// Response for POST /api/payments/esewa/initiate
///
/// `fields` keep eSewa's snake_case names; the browser posts them as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EsewaInitiateResponse {
    pub form_url: String,
    pub fields: EsewaPaymentForm,
}

/// Query for GET /api/payments/esewa/verify
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsewaVerifyQuery {
    pub total_amount: String,
    pub transaction_uuid: String,
}

/// Query for GET /api/payments/esewa/callback
#[derive(Debug, Clone, Deserialize)]
pub struct EsewaCallbackQuery {
    pub data: String,
}

/// Response for GET /api/payments/esewa/callback
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EsewaCallbackResponse {
    pub transaction_uuid: String,
    pub reported_status: String,
    pub verified: bool,
}

/// Request for POST /api/payments/khalti/initiate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KhaltiInitiateBody {
    /// Paisa
    pub amount: u64,
    pub purchase_order_id: String,
    pub purchase_order_name: String,
    pub customer_info: CustomerInfo,
}

/// Request for POST /api/payments/khalti/verify
#[derive(Debug, Clone, Deserialize)]
pub struct KhaltiVerifyBody {
    pub pidx: String,
}

/// Response for the verify endpoints
#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
}

/// Response for GET /api/payments/attempts/{gateway}/{reference}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    pub id: String,
    pub gateway: Gateway,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub amount: Amount,
    pub amount_paisa: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_ref: Option<String>,
    pub status: AttemptStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentAttempt> for AttemptResponse {
    fn from(attempt: PaymentAttempt) -> Self {
        Self {
            id: attempt.id.to_string(),
            gateway: attempt.gateway,
            reference: attempt.reference,
            order_id: attempt.order_id,
            amount: attempt.amount,
            amount_paisa: attempt.amount.paisa(),
            gateway_ref: attempt.gateway_ref,
            status: attempt.status,
            created_at: attempt.created_at,
            updated_at: attempt.updated_at,
        }
    }
}
