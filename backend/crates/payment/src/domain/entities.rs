//! Domain Entities
//!
//! The local payment attempt ledger plus the payloads exchanged with eSewa
//! and Khalti.

use chrono::{DateTime, Utc};
use kernel::id::PaymentAttemptId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::value_objects::{
    Amount, EsewaStatus, Gateway, KhaltiStatus, Pidx, ProductCode, TransactionUuid,
};

/// Lifecycle of a locally recorded payment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Initiated,
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl AttemptStatus {
    /// Ledger status for an eSewa status report
    ///
    /// `None` for values the ledger should not act on.
    pub fn from_esewa(status: &EsewaStatus) -> Option<Self> {
        match status {
            EsewaStatus::Complete => Some(AttemptStatus::Completed),
            EsewaStatus::Pending | EsewaStatus::Ambiguous => Some(AttemptStatus::Pending),
            EsewaStatus::FullRefund | EsewaStatus::PartialRefund => Some(AttemptStatus::Refunded),
            EsewaStatus::NotFound | EsewaStatus::Canceled => Some(AttemptStatus::Failed),
            EsewaStatus::Unrecognized(_) => None,
        }
    }

    pub fn from_khalti(status: &KhaltiStatus) -> Option<Self> {
        match status {
            KhaltiStatus::Completed => Some(AttemptStatus::Completed),
            KhaltiStatus::Pending => Some(AttemptStatus::Pending),
            KhaltiStatus::Initiated => Some(AttemptStatus::Initiated),
            KhaltiStatus::Refunded | KhaltiStatus::PartiallyRefunded => {
                Some(AttemptStatus::Refunded)
            }
            KhaltiStatus::Expired | KhaltiStatus::UserCanceled => Some(AttemptStatus::Failed),
            KhaltiStatus::Unrecognized(_) => None,
        }
    }

    /// Completed attempts only move to Refunded; refunds are final.
    pub fn can_transition_to(self, next: AttemptStatus) -> bool {
        match self {
            AttemptStatus::Completed => {
                matches!(next, AttemptStatus::Completed | AttemptStatus::Refunded)
            }
            AttemptStatus::Refunded => next == AttemptStatus::Refunded,
            _ => true,
        }
    }
}

/// Outcome of applying a gateway report to a stored attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: AttemptStatus,
    pub to: AttemptStatus,
    /// `false` when the reported status was refused as a regression
    pub accepted: bool,
}

impl StatusChange {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// PaymentAttempt entity - one checkout started through a gateway
#[derive(Debug, Clone)]
pub struct PaymentAttempt {
    pub id: PaymentAttemptId,
    pub gateway: Gateway,
    /// eSewa transaction uuid or Khalti pidx
    pub reference: String,
    pub order_id: Option<String>,
    pub amount: Amount,
    /// Gateway-side settlement reference (eSewa `ref_id`, Khalti `transaction_id`)
    pub gateway_ref: Option<String>,
    pub status: AttemptStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentAttempt {
    pub fn new(
        gateway: Gateway,
        reference: impl Into<String>,
        order_id: Option<String>,
        amount: Amount,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentAttemptId::new(),
            gateway,
            reference: reference.into(),
            order_id,
            amount,
            gateway_ref: None,
            status: AttemptStatus::Initiated,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a status reported by the gateway
    ///
    /// Returns `false` (and leaves the attempt untouched) when the
    /// transition is not allowed.
    pub fn apply_status(&mut self, next: AttemptStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        if self.status != next {
            self.status = next;
            self.updated_at = Utc::now();
        }
        true
    }

    pub fn record_gateway_ref(&mut self, gateway_ref: Option<String>) {
        if let Some(gateway_ref) = gateway_ref.filter(|r| !r.is_empty()) {
            self.gateway_ref = Some(gateway_ref);
            self.updated_at = Utc::now();
        }
    }

    /// Apply a gateway report (status and settlement reference) in one step
    pub fn apply_report(
        &mut self,
        status: Option<AttemptStatus>,
        gateway_ref: Option<String>,
    ) -> StatusChange {
        let from = self.status;
        let accepted = status.is_none_or(|next| self.apply_status(next));
        if accepted {
            self.record_gateway_ref(gateway_ref);
        }
        StatusChange {
            from,
            to: self.status,
            accepted,
        }
    }
}

// ============================================================================
// eSewa
// ============================================================================

/// Fields posted by the browser to the eSewa hosted payment page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EsewaPaymentForm {
    pub amount: String,
    pub tax_amount: String,
    pub total_amount: String,
    pub transaction_uuid: String,
    pub product_code: String,
    pub product_service_charge: String,
    pub product_delivery_charge: String,
    pub success_url: String,
    pub failure_url: String,
    pub signed_field_names: String,
    pub signature: String,
}

/// Signed request triple plus its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsewaSignature {
    pub total_amount: Amount,
    pub transaction_uuid: TransactionUuid,
    pub product_code: ProductCode,
    pub signed_field_names: &'static str,
    pub signature: String,
}

/// Parameters of an eSewa transaction status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsewaStatusQuery {
    pub product_code: ProductCode,
    pub total_amount: Amount,
    pub transaction_uuid: TransactionUuid,
}

/// Parsed answer of the eSewa status API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsewaStatusReport {
    pub status: EsewaStatus,
    pub ref_id: Option<String>,
}

/// Signature-checked payload of the eSewa success redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsewaCallback {
    pub transaction_code: Option<String>,
    pub status: EsewaStatus,
    pub total_amount: Amount,
    pub transaction_uuid: TransactionUuid,
    pub product_code: ProductCode,
}

// ============================================================================
// Khalti
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body of `POST /epayment/initiate/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KhaltiInitiateRequest {
    pub return_url: String,
    pub website_url: String,
    /// Paisa
    pub amount: u64,
    pub purchase_order_id: String,
    pub purchase_order_name: String,
    pub customer_info: CustomerInfo,
}

/// Khalti's initiate response, kept verbatim
///
/// Fields beyond the four typed ones are preserved in `extra` so the
/// caller receives exactly what Khalti returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KhaltiInitiation {
    pub pidx: String,
    pub payment_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed answer of `POST /epayment/lookup/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KhaltiLookup {
    pub pidx: Pidx,
    pub status: KhaltiStatus,
    pub total_amount: Option<u64>,
    pub transaction_id: Option<String>,
    pub refunded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt() -> PaymentAttempt {
        PaymentAttempt::new(Gateway::Esewa, "TXN123", None, Amount::from_rupees(100))
    }

    #[test]
    fn test_new_attempt_is_initiated() {
        let attempt = attempt();
        assert_eq!(attempt.status, AttemptStatus::Initiated);
        assert_eq!(attempt.created_at, attempt.updated_at);
        assert!(attempt.gateway_ref.is_none());
    }

    #[test]
    fn test_completed_is_never_downgraded() {
        let mut attempt = attempt();
        assert!(attempt.apply_status(AttemptStatus::Completed));
        assert!(!attempt.apply_status(AttemptStatus::Pending));
        assert!(!attempt.apply_status(AttemptStatus::Failed));
        assert!(!attempt.apply_status(AttemptStatus::Initiated));
        assert_eq!(attempt.status, AttemptStatus::Completed);

        assert!(attempt.apply_status(AttemptStatus::Refunded));
        assert_eq!(attempt.status, AttemptStatus::Refunded);
        assert!(!attempt.apply_status(AttemptStatus::Completed));
    }

    #[test]
    fn test_pending_can_settle_or_fail() {
        let mut attempt = attempt();
        assert!(attempt.apply_status(AttemptStatus::Pending));
        assert!(attempt.apply_status(AttemptStatus::Failed));
        assert!(attempt.apply_status(AttemptStatus::Completed));
    }

    #[test]
    fn test_gateway_ref_ignores_empty() {
        let mut attempt = attempt();
        attempt.record_gateway_ref(Some(String::new()));
        assert!(attempt.gateway_ref.is_none());
        attempt.record_gateway_ref(Some("0001TS9".to_string()));
        assert_eq!(attempt.gateway_ref.as_deref(), Some("0001TS9"));
        attempt.record_gateway_ref(None);
        assert_eq!(attempt.gateway_ref.as_deref(), Some("0001TS9"));
    }

    #[test]
    fn test_apply_report() {
        let mut attempt = attempt();
        let change = attempt.apply_report(
            Some(AttemptStatus::Completed),
            Some("0001TS9".to_string()),
        );
        assert!(change.accepted && change.changed());
        assert_eq!(change.from, AttemptStatus::Initiated);
        assert_eq!(attempt.gateway_ref.as_deref(), Some("0001TS9"));

        let change = attempt.apply_report(Some(AttemptStatus::Failed), Some("STALE".to_string()));
        assert!(!change.accepted);
        assert_eq!(attempt.gateway_ref.as_deref(), Some("0001TS9"));
        assert!(!change.changed());
        assert_eq!(attempt.status, AttemptStatus::Completed);

        let change = attempt.apply_report(None, None);
        assert!(change.accepted && !change.changed());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AttemptStatus::from_esewa(&EsewaStatus::Complete),
            Some(AttemptStatus::Completed)
        );
        assert_eq!(
            AttemptStatus::from_esewa(&EsewaStatus::Canceled),
            Some(AttemptStatus::Failed)
        );
        assert_eq!(
            AttemptStatus::from_esewa(&EsewaStatus::Unrecognized("X".into())),
            None
        );
        assert_eq!(
            AttemptStatus::from_khalti(&KhaltiStatus::UserCanceled),
            Some(AttemptStatus::Failed)
        );
        assert_eq!(
            AttemptStatus::from_khalti(&KhaltiStatus::PartiallyRefunded),
            Some(AttemptStatus::Refunded)
        );
    }

    #[test]
    fn test_khalti_initiation_keeps_unknown_fields() {
        let raw = r#"{
            "pidx": "bZQLD9wRVWo4CdESSfuSsB",
            "payment_url": "https://test-pay.khalti.com/?pidx=bZQLD9wRVWo4CdESSfuSsB",
            "expires_at": "2023-05-25T16:26:16.471649+05:45",
            "expires_in": 1800,
            "merchant_note": "kept"
        }"#;
        let initiation: KhaltiInitiation = serde_json::from_str(raw).unwrap();
        assert_eq!(initiation.pidx, "bZQLD9wRVWo4CdESSfuSsB");
        assert_eq!(initiation.expires_in, Some(1800));
        assert_eq!(initiation.extra["merchant_note"], "kept");

        let echoed = serde_json::to_value(&initiation).unwrap();
        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(echoed, original);
    }

    #[test]
    fn test_customer_info_skips_missing_contact() {
        let info = CustomerInfo {
            name: "Ram Bahadur".to_string(),
            email: None,
            phone: Some("9800000001".to_string()),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Ram Bahadur", "phone": "9800000001"})
        );
    }
}
