//! HTTP Handlers

use crate::application::config::PaymentConfig;
use crate::application::esewa_callback::HandleEsewaCallbackUseCase;
use crate::application::get_attempt::GetAttemptUseCase;
use crate::application::initiate_esewa::{InitiateEsewaInput, InitiateEsewaPaymentUseCase};
use crate::application::initiate_khalti::{InitiateKhaltiInput, InitiateKhaltiPaymentUseCase};
use crate::application::verify_esewa::VerifyEsewaPaymentUseCase;
use crate::application::verify_khalti::VerifyKhaltiPaymentUseCase;
use crate::domain::entities::KhaltiInitiation;
use crate::domain::gateway::{EsewaGateway, KhaltiGateway};
use crate::domain::repository::PaymentAttemptRepository;
use crate::domain::value_objects::{Amount, Gateway, Pidx, TransactionUuid};
use crate::error::{PaymentError, PaymentResult};
use crate::presentation::dto::{
    AttemptResponse, EsewaCallbackQuery, EsewaCallbackResponse, EsewaInitiateRequest,
    EsewaInitiateResponse, EsewaVerifyQuery, KhaltiInitiateBody, KhaltiVerifyBody,
    VerifyResponse,
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::HeaderMap;
use platform::client::extract_client_info;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state for payment handlers
#[derive(Clone)]
pub struct PaymentAppState<G, R>
where
    G: EsewaGateway + KhaltiGateway + Clone + Send + Sync + 'static,
    R: PaymentAttemptRepository + Clone + Send + Sync + 'static,
{
    pub gateway: Arc<G>,
    pub repo: Arc<R>,
    pub config: Arc<PaymentConfig>,
}

fn bad_json(rejection: JsonRejection) -> PaymentError {
    PaymentError::InvalidRequest(rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> PaymentError {
    PaymentError::InvalidRequest(rejection.body_text())
}

/// POST /api/payments/esewa/initiate
pub async fn initiate_esewa<G, R>(
    State(state): State<PaymentAppState<G, R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<EsewaInitiateRequest>, JsonRejection>,
) -> PaymentResult<Json<EsewaInitiateResponse>>
where
    G: EsewaGateway + KhaltiGateway + Clone + Send + Sync + 'static,
    R: PaymentAttemptRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(bad_json)?;
    let client = extract_client_info(&headers, Some(addr.ip()));

    let (amount, tax_amount, product_service_charge, product_delivery_charge) = req.amounts()?;
    let transaction_uuid = req
        .transaction_uuid
        .as_deref()
        .map(TransactionUuid::new)
        .transpose()?;

    let use_case = InitiateEsewaPaymentUseCase::new(state.repo.clone(), state.config.clone());
    let checkout = use_case
        .execute(InitiateEsewaInput {
            amount,
            tax_amount,
            product_service_charge,
            product_delivery_charge,
            transaction_uuid,
        })
        .await?;

    tracing::info!(
        transaction_uuid = %checkout.fields.transaction_uuid,
        client_ip = %client.ip_display(),
        user_agent = client.user_agent.as_deref().unwrap_or("-"),
        "eSewa checkout issued"
    );

    Ok(Json(EsewaInitiateResponse {
        form_url: checkout.form_url,
        fields: checkout.fields,
    }))
}

/// GET /api/payments/esewa/verify
pub async fn verify_esewa<G, R>(
    State(state): State<PaymentAppState<G, R>>,
    query: Result<Query<EsewaVerifyQuery>, QueryRejection>,
) -> PaymentResult<Json<VerifyResponse>>
where
    G: EsewaGateway + KhaltiGateway + Clone + Send + Sync + 'static,
    R: PaymentAttemptRepository + Clone + Send + Sync + 'static,
{
    let Query(query) = query.map_err(bad_query)?;
    let total_amount = Amount::parse_positive(&query.total_amount)?;
    let transaction_uuid = TransactionUuid::new(query.transaction_uuid)?;

    let use_case = VerifyEsewaPaymentUseCase::new(
        state.gateway.clone(),
        state.repo.clone(),
        state.config.clone(),
    );
    let verified = use_case.execute(total_amount, &transaction_uuid).await;

    Ok(Json(VerifyResponse { verified }))
}

/// GET /api/payments/esewa/callback
pub async fn esewa_callback<G, R>(
    State(state): State<PaymentAppState<G, R>>,
    query: Result<Query<EsewaCallbackQuery>, QueryRejection>,
) -> PaymentResult<Json<EsewaCallbackResponse>>
where
    G: EsewaGateway + KhaltiGateway + Clone + Send + Sync + 'static,
    R: PaymentAttemptRepository + Clone + Send + Sync + 'static,
{
    let Query(query) = query.map_err(bad_query)?;

    let use_case = HandleEsewaCallbackUseCase::new(
        state.gateway.clone(),
        state.repo.clone(),
        state.config.clone(),
    );
    let outcome = use_case.execute(&query.data).await?;

    Ok(Json(EsewaCallbackResponse {
        transaction_uuid: outcome.transaction_uuid.as_str().to_string(),
        reported_status: outcome.reported_status.as_wire().to_string(),
        verified: outcome.verified,
    }))
}

/// POST /api/payments/khalti/initiate
pub async fn initiate_khalti<G, R>(
    State(state): State<PaymentAppState<G, R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<KhaltiInitiateBody>, JsonRejection>,
) -> PaymentResult<Json<KhaltiInitiation>>
where
    G: EsewaGateway + KhaltiGateway + Clone + Send + Sync + 'static,
    R: PaymentAttemptRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(bad_json)?;
    let client = extract_client_info(&headers, Some(addr.ip()));

    let use_case = InitiateKhaltiPaymentUseCase::new(
        state.gateway.clone(),
        state.repo.clone(),
        state.config.clone(),
    );
    let initiation = use_case
        .execute(InitiateKhaltiInput {
            amount: req.amount,
            purchase_order_id: req.purchase_order_id,
            purchase_order_name: req.purchase_order_name,
            customer_info: req.customer_info,
        })
        .await?;

    tracing::info!(
        pidx = %initiation.pidx,
        client_ip = %client.ip_display(),
        user_agent = client.user_agent.as_deref().unwrap_or("-"),
        "Khalti checkout issued"
    );

    Ok(Json(initiation))
}

/// POST /api/payments/khalti/verify
pub async fn verify_khalti<G, R>(
    State(state): State<PaymentAppState<G, R>>,
    payload: Result<Json<KhaltiVerifyBody>, JsonRejection>,
) -> PaymentResult<Json<VerifyResponse>>
where
    G: EsewaGateway + KhaltiGateway + Clone + Send + Sync + 'static,
    R: PaymentAttemptRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(bad_json)?;
    let pidx = Pidx::new(req.pidx)?;

    let use_case = VerifyKhaltiPaymentUseCase::new(state.gateway.clone(), state.repo.clone());
    let verified = use_case.execute(&pidx).await;

    Ok(Json(VerifyResponse { verified }))
}

/// GET /api/payments/attempts/{gateway}/{reference}
pub async fn get_attempt<G, R>(
    State(state): State<PaymentAppState<G, R>>,
    path: Result<Path<(Gateway, String)>, PathRejection>,
) -> PaymentResult<Json<AttemptResponse>>
where
    G: EsewaGateway + KhaltiGateway + Clone + Send + Sync + 'static,
    R: PaymentAttemptRepository + Clone + Send + Sync + 'static,
{
    let Path((gateway, reference)) =
        path.map_err(|rejection| PaymentError::InvalidRequest(rejection.body_text()))?;

    let use_case = GetAttemptUseCase::new(state.repo.clone());
    let attempt = use_case.execute(gateway, &reference).await?;

    Ok(Json(AttemptResponse::from(attempt)))
}
