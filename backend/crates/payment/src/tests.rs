//! Unit tests for payment crate
//! Use cases run against scripted gateways and the in-memory ledger.

#[cfg(test)]
mod fakes {
    use crate::domain::entities::{
        EsewaStatusQuery, EsewaStatusReport, KhaltiInitiateRequest, KhaltiInitiation, KhaltiLookup,
    };
    use crate::domain::gateway::{EsewaGateway, KhaltiGateway};
    use crate::domain::value_objects::{EsewaStatus, Gateway, KhaltiStatus, Pidx};
    use crate::error::{PaymentError, PaymentResult};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// What the fake gateway answers
    #[derive(Debug, Clone)]
    pub enum Script {
        Status(&'static str),
        Unreachable,
        Rejected(u16),
    }

    impl Script {
        fn error(&self, gateway: Gateway) -> Option<PaymentError> {
            match self {
                Script::Status(_) => None,
                Script::Unreachable => Some(PaymentError::GatewayUnreachable {
                    gateway,
                    timed_out: true,
                    detail: "operation timed out".to_string(),
                }),
                Script::Rejected(status) => Some(PaymentError::GatewayRejected {
                    gateway,
                    status: *status,
                    detail: "{}".to_string(),
                }),
            }
        }
    }

    #[derive(Clone)]
    pub struct FakeGateway {
        script: Arc<Mutex<Script>>,
        pub esewa_queries: Arc<Mutex<Vec<EsewaStatusQuery>>>,
        pub khalti_requests: Arc<Mutex<Vec<KhaltiInitiateRequest>>>,
    }

    impl FakeGateway {
        pub fn new(script: Script) -> Self {
            Self {
                script: Arc::new(Mutex::new(script)),
                esewa_queries: Arc::default(),
                khalti_requests: Arc::default(),
            }
        }

        pub fn set(&self, script: Script) {
            *self.script.lock().unwrap() = script;
        }

        fn current(&self) -> Script {
            self.script.lock().unwrap().clone()
        }
    }

    impl EsewaGateway for FakeGateway {
        async fn check_status(&self, query: &EsewaStatusQuery) -> PaymentResult<EsewaStatusReport> {
            self.esewa_queries.lock().unwrap().push(query.clone());
            let script = self.current();
            if let Some(err) = script.error(Gateway::Esewa) {
                return Err(err);
            }
            let Script::Status(status) = script else {
                unreachable!()
            };
            Ok(EsewaStatusReport {
                status: EsewaStatus::from_wire(status),
                ref_id: Some("0001TS9".to_string()),
            })
        }
    }

    /// eSewa gateway answering queued statuses in call order, each after its delay
    #[derive(Clone)]
    pub struct SequencedGateway {
        answers: Arc<Mutex<VecDeque<(&'static str, Duration)>>>,
    }

    impl SequencedGateway {
        pub fn new(answers: impl IntoIterator<Item = (&'static str, Duration)>) -> Self {
            Self {
                answers: Arc::new(Mutex::new(answers.into_iter().collect())),
            }
        }
    }

    impl EsewaGateway for SequencedGateway {
        async fn check_status(&self, _query: &EsewaStatusQuery) -> PaymentResult<EsewaStatusReport> {
            let next = self.answers.lock().unwrap().pop_front();
            let Some((status, delay)) = next else {
                return Err(PaymentError::Internal("no answer queued".to_string()));
            };
            tokio::time::sleep(delay).await;
            Ok(EsewaStatusReport {
                status: EsewaStatus::from_wire(status),
                ref_id: Some("0001TS9".to_string()),
            })
        }
    }

    impl KhaltiGateway for FakeGateway {
        async fn initiate(&self, request: &KhaltiInitiateRequest) -> PaymentResult<KhaltiInitiation> {
            self.khalti_requests.lock().unwrap().push(request.clone());
            if let Some(err) = self.current().error(Gateway::Khalti) {
                return Err(err);
            }
            Ok(KhaltiInitiation {
                pidx: "bZQLD9wRVWo4CdESSfuSsB".to_string(),
                payment_url: "https://test-pay.khalti.com/?pidx=bZQLD9wRVWo4CdESSfuSsB"
                    .to_string(),
                expires_at: Some("2023-05-25T16:26:16.471649+05:45".to_string()),
                expires_in: Some(1800),
                extra: Default::default(),
            })
        }

        async fn lookup(&self, pidx: &Pidx) -> PaymentResult<KhaltiLookup> {
            let script = self.current();
            if let Some(err) = script.error(Gateway::Khalti) {
                return Err(err);
            }
            let Script::Status(status) = script else {
                unreachable!()
            };
            Ok(KhaltiLookup {
                pidx: pidx.clone(),
                status: KhaltiStatus::from_wire(status),
                total_amount: Some(1000),
                transaction_id: Some("GFq9PFS7b2iYvL8Lir9oXe".to_string()),
                refunded: false,
            })
        }
    }
}

#[cfg(test)]
mod esewa_use_case_tests {
    use super::fakes::{FakeGateway, Script, SequencedGateway};
    use crate::application::config::PaymentConfig;
    use crate::application::esewa_callback::HandleEsewaCallbackUseCase;
    use crate::application::initiate_esewa::{InitiateEsewaInput, InitiateEsewaPaymentUseCase};
    use crate::application::verify_esewa::VerifyEsewaPaymentUseCase;
    use crate::domain::entities::{AttemptStatus, PaymentAttempt};
    use crate::domain::repository::PaymentAttemptRepository;
    use crate::domain::value_objects::{Amount, EsewaStatus, Gateway, TransactionUuid};
    use crate::error::PaymentError;
    use crate::infra::memory::InMemoryAttemptRepository;
    use platform::crypto::to_base64;
    use std::sync::Arc;
    use std::time::Duration;

    fn config() -> Arc<PaymentConfig> {
        Arc::new(PaymentConfig::sandbox())
    }

    fn txn(raw: &str) -> TransactionUuid {
        TransactionUuid::new(raw).unwrap()
    }

    #[tokio::test]
    async fn test_initiate_signs_known_vector() {
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = InitiateEsewaPaymentUseCase::new(repo.clone(), config());

        let mut input = InitiateEsewaInput::new(Amount::from_rupees(100));
        input.transaction_uuid = Some(txn("TXN123"));
        let checkout = use_case.execute(input).await.unwrap();

        assert_eq!(
            checkout.form_url,
            "https://rc-epay.esewa.com.np/api/epay/main/v2/form"
        );
        let fields = &checkout.fields;
        assert_eq!(fields.total_amount, "100");
        assert_eq!(fields.tax_amount, "0");
        assert_eq!(fields.product_code, "EPAYTEST");
        assert_eq!(
            fields.signed_field_names,
            "total_amount,transaction_uuid,product_code"
        );
        assert_eq!(
            fields.signature,
            "nuAEUxJ9uYy21wgPc7ggvDw63cI4u76Wl/ds4MYkJDM="
        );

        let attempt = repo.find(Gateway::Esewa, "TXN123").await.unwrap().unwrap();
        assert_eq!(attempt.status, AttemptStatus::Initiated);
        assert_eq!(attempt.amount, Amount::from_rupees(100));
    }

    #[tokio::test]
    async fn test_initiate_totals_charges() {
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = InitiateEsewaPaymentUseCase::new(repo, config());

        let input = InitiateEsewaInput {
            amount: Amount::from_rupees(100),
            tax_amount: Amount::parse("13").unwrap(),
            product_service_charge: Amount::parse("5.5").unwrap(),
            product_delivery_charge: Amount::parse("1.5").unwrap(),
            transaction_uuid: None,
        };
        let checkout = use_case.execute(input).await.unwrap();

        assert_eq!(checkout.fields.amount, "100");
        assert_eq!(checkout.fields.total_amount, "120");
        assert_eq!(checkout.fields.product_service_charge, "5.5");
        // generated uuid v4
        assert_eq!(checkout.fields.transaction_uuid.len(), 36);
    }

    #[tokio::test]
    async fn test_initiate_rejects_duplicate_and_zero() {
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = InitiateEsewaPaymentUseCase::new(repo, config());

        let mut input = InitiateEsewaInput::new(Amount::from_rupees(10));
        input.transaction_uuid = Some(txn("ORDER-1"));
        use_case.execute(input.clone()).await.unwrap();
        assert!(matches!(
            use_case.execute(input).await,
            Err(PaymentError::DuplicateReference)
        ));

        assert!(matches!(
            use_case.execute(InitiateEsewaInput::new(Amount::ZERO)).await,
            Err(PaymentError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_complete_updates_ledger() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("COMPLETE")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        repo.insert(&PaymentAttempt::new(
            Gateway::Esewa,
            "TXN123",
            None,
            Amount::from_rupees(100),
        ))
        .await
        .unwrap();

        let use_case = VerifyEsewaPaymentUseCase::new(gateway.clone(), repo.clone(), config());
        assert!(use_case.execute(Amount::from_rupees(100), &txn("TXN123")).await);

        let query = gateway.esewa_queries.lock().unwrap()[0].clone();
        assert_eq!(query.product_code.as_str(), "EPAYTEST");
        assert_eq!(query.total_amount.to_gateway_string(), "100");

        let attempt = repo.find(Gateway::Esewa, "TXN123").await.unwrap().unwrap();
        assert_eq!(attempt.status, AttemptStatus::Completed);
        assert_eq!(attempt.gateway_ref.as_deref(), Some("0001TS9"));
    }

    #[tokio::test]
    async fn test_verify_false_for_anything_but_complete() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("PENDING")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = VerifyEsewaPaymentUseCase::new(gateway.clone(), repo, config());
        let amount = Amount::from_rupees(100);

        assert!(!use_case.execute(amount, &txn("TXN1")).await);

        gateway.set(Script::Status("complete"));
        assert!(!use_case.execute(amount, &txn("TXN1")).await);

        gateway.set(Script::Unreachable);
        assert!(!use_case.execute(amount, &txn("TXN1")).await);

        gateway.set(Script::Rejected(500));
        assert!(!use_case.execute(amount, &txn("TXN1")).await);
    }

    #[tokio::test]
    async fn test_status_surfaces_gateway_errors() {
        let gateway = Arc::new(FakeGateway::new(Script::Rejected(400)));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = VerifyEsewaPaymentUseCase::new(gateway, repo, config());

        assert!(matches!(
            use_case.status(Amount::from_rupees(1), &txn("TXN1")).await,
            Err(PaymentError::GatewayRejected { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_completed_attempt_is_not_downgraded() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("COMPLETE")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        repo.insert(&PaymentAttempt::new(
            Gateway::Esewa,
            "TXN9",
            None,
            Amount::from_rupees(50),
        ))
        .await
        .unwrap();
        let use_case = VerifyEsewaPaymentUseCase::new(gateway.clone(), repo.clone(), config());
        let amount = Amount::from_rupees(50);

        assert!(use_case.execute(amount, &txn("TXN9")).await);

        gateway.set(Script::Status("PENDING"));
        assert!(!use_case.execute(amount, &txn("TXN9")).await);
        gateway.set(Script::Unreachable);
        assert!(!use_case.execute(amount, &txn("TXN9")).await);

        let attempt = repo.find(Gateway::Esewa, "TXN9").await.unwrap().unwrap();
        assert_eq!(attempt.status, AttemptStatus::Completed);

        gateway.set(Script::Status("FULL_REFUND"));
        use_case.execute(amount, &txn("TXN9")).await;
        let attempt = repo.find(Gateway::Esewa, "TXN9").await.unwrap().unwrap();
        assert_eq!(attempt.status, AttemptStatus::Refunded);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_leaves_status_unchanged() {
        let gateway = Arc::new(FakeGateway::new(Script::Unreachable));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        repo.insert(&PaymentAttempt::new(
            Gateway::Esewa,
            "TXN5",
            None,
            Amount::from_rupees(5),
        ))
        .await
        .unwrap();
        let use_case = VerifyEsewaPaymentUseCase::new(gateway, repo.clone(), config());

        assert!(!use_case.execute(Amount::from_rupees(5), &txn("TXN5")).await);
        let attempt = repo.find(Gateway::Esewa, "TXN5").await.unwrap().unwrap();
        assert_eq!(attempt.status, AttemptStatus::Initiated);
    }

    async fn verify_concurrently(
        answers: [(&'static str, Duration); 2],
    ) -> ((bool, bool), PaymentAttempt) {
        let gateway = Arc::new(SequencedGateway::new(answers));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        repo.insert(&PaymentAttempt::new(
            Gateway::Esewa,
            "RACE1",
            None,
            Amount::from_rupees(100),
        ))
        .await
        .unwrap();
        let use_case = VerifyEsewaPaymentUseCase::new(gateway, repo.clone(), config());
        let amount = Amount::from_rupees(100);
        let reference = txn("RACE1");

        let verified = tokio::join!(
            use_case.execute(amount, &reference),
            use_case.execute(amount, &reference)
        );
        let attempt = repo.find(Gateway::Esewa, "RACE1").await.unwrap().unwrap();
        (verified, attempt)
    }

    #[tokio::test]
    async fn test_stale_concurrent_verification_cannot_downgrade() {
        let (verified, attempt) = verify_concurrently([
            ("COMPLETE", Duration::from_millis(10)),
            ("CANCELED", Duration::from_millis(50)),
        ])
        .await;
        assert_eq!(verified, (true, false));
        assert_eq!(attempt.status, AttemptStatus::Completed);
        assert_eq!(attempt.gateway_ref.as_deref(), Some("0001TS9"));
    }

    #[tokio::test]
    async fn test_late_completion_wins_over_earlier_cancel() {
        let (verified, attempt) = verify_concurrently([
            ("COMPLETE", Duration::from_millis(50)),
            ("CANCELED", Duration::from_millis(10)),
        ])
        .await;
        assert_eq!(verified, (true, false));
        assert_eq!(attempt.status, AttemptStatus::Completed);
    }

    fn signed_callback(product_code: &str) -> String {
        // Signed with the UAT secret over
        // "total_amount=100,transaction_uuid=11-201-13,product_code=EPAYTEST"
        let payload = serde_json::json!({
            "transaction_code": "000AWEO",
            "status": "COMPLETE",
            "total_amount": "100",
            "transaction_uuid": "11-201-13",
            "product_code": product_code,
            "signed_field_names": "total_amount,transaction_uuid,product_code",
            "signature": "5DZywcrTKD0gia/rsSMcrRHmJl+4Tbol6S+lWgdJ94E="
        });
        to_base64(payload.to_string().as_bytes())
    }

    #[tokio::test]
    async fn test_callback_confirms_with_status_api() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("COMPLETE")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = HandleEsewaCallbackUseCase::new(gateway.clone(), repo, config());

        let outcome = use_case.execute(&signed_callback("EPAYTEST")).await.unwrap();
        assert!(outcome.verified);
        assert_eq!(outcome.transaction_uuid.as_str(), "11-201-13");
        assert_eq!(outcome.reported_status, EsewaStatus::Complete);
        assert_eq!(gateway.esewa_queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_callback_claim_is_not_trusted_alone() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("PENDING")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = HandleEsewaCallbackUseCase::new(gateway, repo, config());

        let outcome = use_case.execute(&signed_callback("EPAYTEST")).await.unwrap();
        assert_eq!(outcome.reported_status, EsewaStatus::Complete);
        assert!(!outcome.verified);
    }

    #[tokio::test]
    async fn test_callback_rejects_forged_payload() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("COMPLETE")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = HandleEsewaCallbackUseCase::new(gateway.clone(), repo, config());

        // product code changed after signing
        assert!(matches!(
            use_case.execute(&signed_callback("OTHERSHOP")).await,
            Err(PaymentError::SignatureMismatch)
        ));
        assert!(gateway.esewa_queries.lock().unwrap().is_empty());
    }
}

#[cfg(test)]
mod khalti_use_case_tests {
    use super::fakes::{FakeGateway, Script};
    use crate::application::config::PaymentConfig;
    use crate::application::initiate_khalti::{InitiateKhaltiInput, InitiateKhaltiPaymentUseCase};
    use crate::application::verify_khalti::VerifyKhaltiPaymentUseCase;
    use crate::domain::entities::{AttemptStatus, CustomerInfo};
    use crate::domain::repository::PaymentAttemptRepository;
    use crate::domain::value_objects::{Gateway, Pidx};
    use crate::error::PaymentError;
    use crate::infra::memory::InMemoryAttemptRepository;
    use platform::secret::SecretKey;
    use std::sync::Arc;

    fn config() -> Arc<PaymentConfig> {
        Arc::new(PaymentConfig::sandbox().with_khalti(SecretKey::new("test_secret_key")))
    }

    fn input(amount: u64) -> InitiateKhaltiInput {
        InitiateKhaltiInput {
            amount,
            purchase_order_id: " order-42 ".to_string(),
            purchase_order_name: "Exam booking".to_string(),
            customer_info: CustomerInfo {
                name: "Sita Sharma".to_string(),
                email: Some("sita@example.np".to_string()),
                phone: Some("  ".to_string()),
            },
        }
    }

    fn pidx() -> Pidx {
        Pidx::new("bZQLD9wRVWo4CdESSfuSsB").unwrap()
    }

    #[tokio::test]
    async fn test_initiate_builds_request_and_records_attempt() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("Initiated")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = InitiateKhaltiPaymentUseCase::new(gateway.clone(), repo.clone(), config());

        let initiation = use_case.execute(input(1000)).await.unwrap();
        assert_eq!(initiation.pidx, "bZQLD9wRVWo4CdESSfuSsB");

        let request = gateway.khalti_requests.lock().unwrap()[0].clone();
        assert_eq!(request.amount, 1000);
        assert_eq!(request.purchase_order_id, "order-42");
        assert_eq!(request.return_url, "http://localhost:40922/payment/khalti/return");
        assert_eq!(request.customer_info.phone, None);

        let attempt = repo
            .find(Gateway::Khalti, "bZQLD9wRVWo4CdESSfuSsB")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attempt.order_id.as_deref(), Some("order-42"));
        assert_eq!(attempt.amount.paisa(), 1000);
    }

    #[tokio::test]
    async fn test_initiate_validates_locally() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("Initiated")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = InitiateKhaltiPaymentUseCase::new(gateway.clone(), repo, config());

        assert!(matches!(
            use_case.execute(input(999)).await,
            Err(PaymentError::InvalidAmount(_))
        ));

        let mut nameless = input(1000);
        nameless.customer_info.name = " ".to_string();
        assert!(matches!(
            use_case.execute(nameless).await,
            Err(PaymentError::InvalidOrder(_))
        ));

        assert!(gateway.khalti_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initiate_disabled_without_key() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("Initiated")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case =
            InitiateKhaltiPaymentUseCase::new(gateway, repo, Arc::new(PaymentConfig::sandbox()));

        assert!(matches!(
            use_case.execute(input(1000)).await,
            Err(PaymentError::GatewayDisabled(Gateway::Khalti))
        ));
    }

    #[tokio::test]
    async fn test_initiate_passes_gateway_rejection_through() {
        let gateway = Arc::new(FakeGateway::new(Script::Rejected(401)));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = InitiateKhaltiPaymentUseCase::new(gateway, repo.clone(), config());

        assert!(matches!(
            use_case.execute(input(1000)).await,
            Err(PaymentError::GatewayRejected { status: 401, .. })
        ));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_verify_only_completed_is_true() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("Completed")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let use_case = VerifyKhaltiPaymentUseCase::new(gateway.clone(), repo);

        assert!(use_case.execute(&pidx()).await);

        for status in ["Pending", "COMPLETED", "User canceled", "Expired", ""] {
            gateway.set(Script::Status(status));
            assert!(!use_case.execute(&pidx()).await, "{status:?}");
        }

        gateway.set(Script::Unreachable);
        assert!(!use_case.execute(&pidx()).await);
    }

    #[tokio::test]
    async fn test_verify_updates_recorded_attempt() {
        let gateway = Arc::new(FakeGateway::new(Script::Status("Initiated")));
        let repo = Arc::new(InMemoryAttemptRepository::new());
        InitiateKhaltiPaymentUseCase::new(gateway.clone(), repo.clone(), config())
            .execute(input(1500))
            .await
            .unwrap();

        gateway.set(Script::Status("Completed"));
        let use_case = VerifyKhaltiPaymentUseCase::new(gateway, repo.clone());
        let lookup = use_case.lookup(&pidx()).await.unwrap();
        assert!(lookup.status.is_completed());

        let attempt = repo.find(Gateway::Khalti, pidx().as_str()).await.unwrap().unwrap();
        assert_eq!(attempt.status, AttemptStatus::Completed);
        assert_eq!(attempt.gateway_ref.as_deref(), Some("GFq9PFS7b2iYvL8Lir9oXe"));
    }
}

#[cfg(test)]
mod attempt_tests {
    use crate::application::get_attempt::GetAttemptUseCase;
    use crate::domain::entities::PaymentAttempt;
    use crate::domain::repository::PaymentAttemptRepository;
    use crate::domain::value_objects::{Amount, Gateway};
    use crate::error::PaymentError;
    use crate::infra::memory::InMemoryAttemptRepository;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_attempt() {
        let repo = Arc::new(InMemoryAttemptRepository::new());
        let attempt = PaymentAttempt::new(Gateway::Esewa, "TXN1", None, Amount::from_rupees(1));
        repo.insert(&attempt).await.unwrap();

        let use_case = GetAttemptUseCase::new(repo);
        assert_eq!(use_case.execute(Gateway::Esewa, " TXN1 ").await.unwrap().id, attempt.id);
        assert!(matches!(
            use_case.execute(Gateway::Khalti, "TXN1").await,
            Err(PaymentError::AttemptNotFound)
        ));
    }
}

#[cfg(test)]
mod error_tests {
    use crate::domain::value_objects::Gateway;
    use crate::error::PaymentError;
    use axum::http::StatusCode;
    use kernel::error::kind::ErrorKind;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PaymentError::InvalidAmount("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(PaymentError::SignatureMismatch.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(PaymentError::DuplicateReference.status_code(), StatusCode::CONFLICT);
        assert_eq!(PaymentError::AttemptNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            PaymentError::GatewayDisabled(Gateway::Khalti).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            PaymentError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_errors() {
        let timeout = PaymentError::GatewayUnreachable {
            gateway: Gateway::Esewa,
            timed_out: true,
            detail: String::new(),
        };
        assert_eq!(timeout.kind(), ErrorKind::GatewayTimeout);

        let refused = PaymentError::GatewayUnreachable {
            gateway: Gateway::Esewa,
            timed_out: false,
            detail: String::new(),
        };
        assert_eq!(refused.kind(), ErrorKind::BadGateway);

        let rejected = PaymentError::GatewayRejected {
            gateway: Gateway::Khalti,
            status: 401,
            detail: r#"{"detail":"Invalid token."}"#.to_string(),
        };
        assert_eq!(rejected.status_code(), StatusCode::BAD_GATEWAY);
        // upstream body is not part of the client-facing message
        assert!(!rejected.to_app_error().message().contains("Invalid token"));
    }

    #[test]
    fn test_app_error_actions() {
        let app = PaymentError::SignatureMismatch.to_app_error();
        assert_eq!(app.kind(), ErrorKind::BadRequest);
        assert!(app.action().is_some());
    }
}
