//! HTTP Gateway Implementation
//!
//! eSewa and Khalti clients over a shared `reqwest::Client`.

use crate::application::config::{KhaltiConfig, PaymentConfig};
use crate::domain::entities::{
    EsewaStatusQuery, EsewaStatusReport, KhaltiInitiateRequest, KhaltiInitiation, KhaltiLookup,
};
use crate::domain::gateway::{EsewaGateway, KhaltiGateway};
use crate::domain::value_objects::{EsewaStatus, Gateway, KhaltiStatus, Pidx};
use crate::error::{PaymentError, PaymentResult};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Upstream bodies are only logged; keep them short
const MAX_DETAIL_LEN: usize = 512;

/// Payment gateways over HTTP
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: Arc<PaymentConfig>,
}

impl HttpPaymentGateway {
    pub fn new(client: reqwest::Client, config: Arc<PaymentConfig>) -> Self {
        Self { client, config }
    }

    /// Build with a client using the configured timeout
    pub fn from_config(config: Arc<PaymentConfig>) -> PaymentResult<Self> {
        let client = platform::http::build_http_client(config.http_timeout)
            .map_err(|e| PaymentError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self::new(client, config))
    }

    fn khalti(&self) -> PaymentResult<&KhaltiConfig> {
        self.config
            .khalti
            .as_ref()
            .ok_or(PaymentError::GatewayDisabled(Gateway::Khalti))
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_DETAIL_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Read a response body, mapping non-2xx and unparsable bodies to errors
async fn read_json<T>(gateway: Gateway, response: reqwest::Response) -> PaymentResult<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PaymentError::unreachable(gateway, &e))?;

    if !status.is_success() {
        return Err(PaymentError::GatewayRejected {
            gateway,
            status: status.as_u16(),
            detail: truncate(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| PaymentError::MalformedResponse {
        gateway,
        detail: format!("{e}: {}", truncate(&body)),
    })
}

// Only `status` decides a verification. The other fields are read
// leniently so an unexpected type never hides a settled payment.

#[derive(Debug, Deserialize)]
struct RawEsewaStatus {
    status: Option<String>,
    #[serde(default)]
    ref_id: Value,
}

#[derive(Debug, Deserialize)]
struct RawKhaltiLookup {
    status: Option<String>,
    #[serde(default)]
    pidx: Value,
    #[serde(default)]
    total_amount: Value,
    #[serde(default)]
    transaction_id: Value,
    #[serde(default)]
    refunded: Value,
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whole paisa from `1000`, `1000.0` or `"1000"`
fn paisa(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(value: &Value) -> bool {
    value.as_bool().unwrap_or(false)
}

impl EsewaGateway for HttpPaymentGateway {
    async fn check_status(&self, query: &EsewaStatusQuery) -> PaymentResult<EsewaStatusReport> {
        let total_amount = query.total_amount.to_gateway_string();
        let response = self
            .client
            .get(&self.config.esewa.status_url)
            .query(&[
                ("product_code", query.product_code.as_str()),
                ("total_amount", total_amount.as_str()),
                ("transaction_uuid", query.transaction_uuid.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PaymentError::unreachable(Gateway::Esewa, &e))?;

        let raw: RawEsewaStatus = read_json(Gateway::Esewa, response).await?;
        let status = raw.status.ok_or_else(|| PaymentError::MalformedResponse {
            gateway: Gateway::Esewa,
            detail: "missing status field".to_string(),
        })?;

        tracing::debug!(
            transaction_uuid = %query.transaction_uuid,
            status = %status,
            "eSewa status response"
        );

        Ok(EsewaStatusReport {
            status: EsewaStatus::from_wire(&status),
            ref_id: text(raw.ref_id),
        })
    }
}

impl KhaltiGateway for HttpPaymentGateway {
    async fn initiate(&self, request: &KhaltiInitiateRequest) -> PaymentResult<KhaltiInitiation> {
        let khalti = self.khalti()?;
        let response = self
            .client
            .post(khalti.initiate_url())
            .header(AUTHORIZATION, khalti.authorization())
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::unreachable(Gateway::Khalti, &e))?;

        read_json(Gateway::Khalti, response).await
    }

    async fn lookup(&self, pidx: &Pidx) -> PaymentResult<KhaltiLookup> {
        let khalti = self.khalti()?;
        let response = self
            .client
            .post(khalti.lookup_url())
            .header(AUTHORIZATION, khalti.authorization())
            .json(&serde_json::json!({ "pidx": pidx.as_str() }))
            .send()
            .await
            .map_err(|e| PaymentError::unreachable(Gateway::Khalti, &e))?;

        let raw: RawKhaltiLookup = read_json(Gateway::Khalti, response).await?;
        let status = raw.status.ok_or_else(|| PaymentError::MalformedResponse {
            gateway: Gateway::Khalti,
            detail: "missing status field".to_string(),
        })?;

        tracing::debug!(pidx = %pidx, status = %status, "Khalti lookup response");

        let returned = text(raw.pidx).and_then(|p| Pidx::new(p).ok());
        if returned.as_ref().is_some_and(|p| p != pidx) {
            tracing::warn!(pidx = %pidx, "Khalti lookup answered for a different pidx");
        }

        Ok(KhaltiLookup {
            pidx: returned.unwrap_or_else(|| pidx.clone()),
            status: KhaltiStatus::from_wire(&status),
            total_amount: paisa(&raw.total_amount),
            transaction_id: text(raw.transaction_id),
            refunded: flag(&raw.refunded),
        })
    }
}
