//! Domain Value Objects
//!
//! Validated values exchanged with the payment gateways. Each constructor
//! rejects input that would change the meaning of a signed message or be
//! refused by the gateway.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{PaymentError, PaymentResult};

/// Supported payment gateways
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    Esewa,
    Khalti,
}

impl Gateway {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gateway::Esewa => "eSewa",
            Gateway::Khalti => "Khalti",
        }
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Amount
// ============================================================================

/// NPR amount in paisa (1/100 rupee)
///
/// Parsed from the decimal strings the gateways use ("100", "100.5",
/// "1000.00"); rendered back without trailing zeros so the value that is
/// signed is the value that is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_paisa(paisa: u64) -> Self {
        Self(paisa)
    }

    pub const fn from_rupees(rupees: u64) -> Self {
        Self(rupees * 100)
    }

    pub const fn paisa(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Parse a non-negative decimal rupee amount
    pub fn parse(raw: &str) -> PaymentResult<Self> {
        let raw = raw.trim();
        let invalid = || PaymentError::InvalidAmount(raw.to_string());

        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (raw, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if raw.contains('.') && (fraction.is_empty() || fraction.len() > 2) {
            return Err(invalid());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let rupees: u64 = whole.parse().map_err(|_| invalid())?;
        let paisa_part: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        rupees
            .checked_mul(100)
            .and_then(|p| p.checked_add(paisa_part))
            .map(Amount)
            .ok_or_else(invalid)
    }

    /// Parse an amount that must be greater than zero
    pub fn parse_positive(raw: &str) -> PaymentResult<Self> {
        let amount = Self::parse(raw)?;
        if amount.is_zero() {
            return Err(PaymentError::InvalidAmount(raw.trim().to_string()));
        }
        Ok(amount)
    }

    /// Decimal rupee string as sent to eSewa
    pub fn to_gateway_string(&self) -> String {
        let rupees = self.0 / 100;
        let paisa = self.0 % 100;
        match paisa {
            0 => rupees.to_string(),
            p if p % 10 == 0 => format!("{}.{}", rupees, p / 10),
            p => format!("{}.{:02}", rupees, p),
        }
    }
}

impl FromStr for Amount {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_gateway_string())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Identifiers
// ============================================================================

const MAX_REFERENCE_LEN: usize = 64;

fn is_reference_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Per-attempt transaction id sent to eSewa as `transaction_uuid`
///
/// Restricted to ASCII alphanumerics and hyphens, which is what eSewa
/// accepts; this also keeps commas out of the signed message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionUuid(String);

impl TransactionUuid {
    pub fn new(raw: impl Into<String>) -> PaymentResult<Self> {
        let raw = raw.into().trim().to_string();
        if raw.is_empty() || raw.len() > MAX_REFERENCE_LEN || !raw.chars().all(is_reference_char)
        {
            return Err(PaymentError::InvalidTransactionId(raw));
        }
        Ok(Self(raw))
    }

    /// Fresh id from a random UUID v4
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// eSewa merchant product code (`EPAYTEST` in UAT)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductCode(String);

impl ProductCode {
    pub fn new(raw: impl Into<String>) -> PaymentResult<Self> {
        let raw = raw.into().trim().to_string();
        let valid_chars = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if raw.is_empty() || raw.len() > MAX_REFERENCE_LEN || !valid_chars {
            return Err(PaymentError::InvalidProductCode(raw));
        }
        Ok(Self(raw))
    }

    /// For compile-time constants that are known to be valid
    pub(crate) fn from_static(code: &'static str) -> Self {
        Self(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Khalti payment index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Pidx(String);

impl Pidx {
    pub fn new(raw: impl Into<String>) -> PaymentResult<Self> {
        let raw = raw.into().trim().to_string();
        let valid_chars = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if raw.is_empty() || raw.len() > MAX_REFERENCE_LEN || !valid_chars {
            return Err(PaymentError::InvalidPidx);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pidx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Gateway statuses
// ============================================================================

/// `status` values of the eSewa transaction status API
///
/// Matching is exact: only the literal `COMPLETE` means settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EsewaStatus {
    Complete,
    Pending,
    FullRefund,
    PartialRefund,
    Ambiguous,
    NotFound,
    Canceled,
    Unrecognized(String),
}

impl EsewaStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "COMPLETE" => EsewaStatus::Complete,
            "PENDING" => EsewaStatus::Pending,
            "FULL_REFUND" => EsewaStatus::FullRefund,
            "PARTIAL_REFUND" => EsewaStatus::PartialRefund,
            "AMBIGUOUS" => EsewaStatus::Ambiguous,
            "NOT_FOUND" => EsewaStatus::NotFound,
            "CANCELED" => EsewaStatus::Canceled,
            other => EsewaStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            EsewaStatus::Complete => "COMPLETE",
            EsewaStatus::Pending => "PENDING",
            EsewaStatus::FullRefund => "FULL_REFUND",
            EsewaStatus::PartialRefund => "PARTIAL_REFUND",
            EsewaStatus::Ambiguous => "AMBIGUOUS",
            EsewaStatus::NotFound => "NOT_FOUND",
            EsewaStatus::Canceled => "CANCELED",
            EsewaStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, EsewaStatus::Complete)
    }
}

/// `status` values of the Khalti lookup API
///
/// Only the literal `Completed` means settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KhaltiStatus {
    Completed,
    Pending,
    Initiated,
    Refunded,
    PartiallyRefunded,
    Expired,
    UserCanceled,
    Unrecognized(String),
}

impl KhaltiStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "Completed" => KhaltiStatus::Completed,
            "Pending" => KhaltiStatus::Pending,
            "Initiated" => KhaltiStatus::Initiated,
            "Refunded" => KhaltiStatus::Refunded,
            "Partially Refunded" => KhaltiStatus::PartiallyRefunded,
            "Expired" => KhaltiStatus::Expired,
            "User canceled" => KhaltiStatus::UserCanceled,
            other => KhaltiStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            KhaltiStatus::Completed => "Completed",
            KhaltiStatus::Pending => "Pending",
            KhaltiStatus::Initiated => "Initiated",
            KhaltiStatus::Refunded => "Refunded",
            KhaltiStatus::PartiallyRefunded => "Partially Refunded",
            KhaltiStatus::Expired => "Expired",
            KhaltiStatus::UserCanceled => "User canceled",
            KhaltiStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, KhaltiStatus::Completed)
    }
}
