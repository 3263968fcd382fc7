//! Application Configuration
//!
//! Gateway credentials and endpoints, read from the environment.
//! Production refuses to start without real credentials; development and
//! test fall back to the public sandbox values.

use std::str::FromStr;
use std::time::Duration;

use platform::config::{AppEnvironment, ConfigError, EnvSource};
use platform::http::DEFAULT_TIMEOUT;
use platform::secret::SecretKey;

use crate::domain::value_objects::ProductCode;

/// Publicly documented eSewa UAT merchant secret
pub const ESEWA_UAT_SECRET: &str = "8gBm/:&EnhH.1/q";
pub const ESEWA_UAT_PRODUCT_CODE: &str = "EPAYTEST";

pub const ESEWA_SANDBOX_FORM_URL: &str = "https://rc-epay.esewa.com.np/api/epay/main/v2/form";
pub const ESEWA_LIVE_FORM_URL: &str = "https://epay.esewa.com.np/api/epay/main/v2/form";
pub const ESEWA_SANDBOX_STATUS_URL: &str = "https://rc.esewa.com.np/api/epay/transaction/status/";
pub const ESEWA_LIVE_STATUS_URL: &str = "https://epay.esewa.com.np/api/epay/transaction/status/";

pub const KHALTI_SANDBOX_BASE_URL: &str = "https://dev.khalti.com/api/v2";
pub const KHALTI_LIVE_BASE_URL: &str = "https://khalti.com/api/v2";

/// Khalti refuses amounts below Rs 10
pub const KHALTI_MIN_AMOUNT_PAISA: u64 = 1000;

const DEV_ESEWA_SUCCESS_URL: &str = "http://localhost:40922/payment/esewa/success";
const DEV_ESEWA_FAILURE_URL: &str = "http://localhost:40922/payment/esewa/failure";
const DEV_KHALTI_RETURN_URL: &str = "http://localhost:40922/payment/khalti/return";
const DEV_WEBSITE_URL: &str = "http://localhost:40922";

/// Which set of gateway endpoints to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    Sandbox,
    Live,
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "test" | "uat" => Ok(PaymentMode::Sandbox),
            "live" | "production" => Ok(PaymentMode::Live),
            other => Err(format!("expected sandbox or live (got {other:?})")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EsewaConfig {
    pub product_code: ProductCode,
    pub secret_key: SecretKey,
    pub success_url: String,
    pub failure_url: String,
    /// Hosted payment page the browser posts the signed form to
    pub form_url: String,
    pub status_url: String,
}

#[derive(Debug, Clone)]
pub struct KhaltiConfig {
    pub secret_key: SecretKey,
    /// API base without trailing slash, e.g. `https://khalti.com/api/v2`
    pub base_url: String,
    pub return_url: String,
    pub website_url: String,
}

impl KhaltiConfig {
    pub fn initiate_url(&self) -> String {
        format!("{}/epayment/initiate/", self.base_url)
    }

    pub fn lookup_url(&self) -> String {
        format!("{}/epayment/lookup/", self.base_url)
    }

    /// Value of the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Key {}", self.secret_key.expose())
    }
}

/// Payment application configuration
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub environment: AppEnvironment,
    pub mode: PaymentMode,
    pub esewa: EsewaConfig,
    /// `None` when Khalti is not configured (non-production only)
    pub khalti: Option<KhaltiConfig>,
    pub http_timeout: Duration,
}

impl PaymentConfig {
    /// Sandbox configuration with the public eSewa UAT credentials
    ///
    /// Khalti stays disabled until [`PaymentConfig::with_khalti`] is used.
    pub fn sandbox() -> Self {
        Self {
            environment: AppEnvironment::Test,
            mode: PaymentMode::Sandbox,
            esewa: EsewaConfig {
                product_code: ProductCode::from_static(ESEWA_UAT_PRODUCT_CODE),
                secret_key: SecretKey::new(ESEWA_UAT_SECRET),
                success_url: DEV_ESEWA_SUCCESS_URL.to_string(),
                failure_url: DEV_ESEWA_FAILURE_URL.to_string(),
                form_url: ESEWA_SANDBOX_FORM_URL.to_string(),
                status_url: ESEWA_SANDBOX_STATUS_URL.to_string(),
            },
            khalti: None,
            http_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_khalti(mut self, secret_key: SecretKey) -> Self {
        self.khalti = Some(KhaltiConfig {
            secret_key,
            base_url: KHALTI_SANDBOX_BASE_URL.to_string(),
            return_url: DEV_KHALTI_RETURN_URL.to_string(),
            website_url: DEV_WEBSITE_URL.to_string(),
        });
        self
    }

    /// Load from environment variables
    pub fn from_source(source: &impl EnvSource) -> Result<Self, ConfigError> {
        let environment = source.environment()?;
        let strict = environment.is_production();

        let mode = source.parsed::<PaymentMode>("PAYMENT_MODE")?.unwrap_or(if strict {
            PaymentMode::Live
        } else {
            PaymentMode::Sandbox
        });
        if strict && mode == PaymentMode::Sandbox {
            tracing::warn!("PAYMENT_MODE=sandbox in production: gateway calls go to UAT endpoints");
        }

        let esewa = load_esewa(source, strict, mode)?;
        let khalti = load_khalti(source, strict, mode)?;

        let timeout_secs = source
            .parsed::<u64>("PAYMENT_HTTP_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_TIMEOUT.as_secs());
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "PAYMENT_HTTP_TIMEOUT_SECS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            environment,
            mode,
            esewa,
            khalti,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn khalti_enabled(&self) -> bool {
        self.khalti.is_some()
    }
}

fn load_esewa(
    source: &impl EnvSource,
    strict: bool,
    mode: PaymentMode,
) -> Result<EsewaConfig, ConfigError> {
    let product_code = match source.optional("ESEWA_PRODUCT_CODE") {
        Some(raw) => raw,
        None if strict => return Err(ConfigError::Missing("ESEWA_PRODUCT_CODE".to_string())),
        None => {
            tracing::warn!("ESEWA_PRODUCT_CODE not set, using UAT product code");
            ESEWA_UAT_PRODUCT_CODE.to_string()
        }
    };
    let product_code = ProductCode::new(product_code).map_err(|e| ConfigError::Invalid {
        key: "ESEWA_PRODUCT_CODE".to_string(),
        reason: e.to_string(),
    })?;

    let secret_key = match source.secret("ESEWA_SECRET_KEY") {
        Some(secret) if strict && secret.expose() == ESEWA_UAT_SECRET => {
            return Err(ConfigError::InsecureSecret("ESEWA_SECRET_KEY".to_string()));
        }
        Some(secret) => secret,
        None if strict => return Err(ConfigError::Missing("ESEWA_SECRET_KEY".to_string())),
        None => {
            tracing::warn!("ESEWA_SECRET_KEY not set, using public UAT secret");
            SecretKey::new(ESEWA_UAT_SECRET)
        }
    };

    let (default_form, default_status) = match mode {
        PaymentMode::Sandbox => (ESEWA_SANDBOX_FORM_URL, ESEWA_SANDBOX_STATUS_URL),
        PaymentMode::Live => (ESEWA_LIVE_FORM_URL, ESEWA_LIVE_STATUS_URL),
    };

    Ok(EsewaConfig {
        product_code,
        secret_key,
        success_url: redirect_url(source, "ESEWA_SUCCESS_URL", strict, DEV_ESEWA_SUCCESS_URL)?,
        failure_url: redirect_url(source, "ESEWA_FAILURE_URL", strict, DEV_ESEWA_FAILURE_URL)?,
        form_url: endpoint_url(source, "ESEWA_FORM_URL", default_form)?,
        status_url: endpoint_url(source, "ESEWA_STATUS_URL", default_status)?,
    })
}

fn load_khalti(
    source: &impl EnvSource,
    strict: bool,
    mode: PaymentMode,
) -> Result<Option<KhaltiConfig>, ConfigError> {
    let Some(secret_key) = source.secret("KHALTI_SECRET_KEY") else {
        if strict {
            return Err(ConfigError::Missing("KHALTI_SECRET_KEY".to_string()));
        }
        tracing::warn!("KHALTI_SECRET_KEY not set, Khalti payments disabled");
        return Ok(None);
    };

    let default_base = match mode {
        PaymentMode::Sandbox => KHALTI_SANDBOX_BASE_URL,
        PaymentMode::Live => KHALTI_LIVE_BASE_URL,
    };
    let base_url = endpoint_url(source, "KHALTI_BASE_URL", default_base)?
        .trim_end_matches('/')
        .to_string();

    Ok(Some(KhaltiConfig {
        secret_key,
        base_url,
        return_url: redirect_url(source, "KHALTI_RETURN_URL", strict, DEV_KHALTI_RETURN_URL)?,
        website_url: redirect_url(source, "KHALTI_WEBSITE_URL", strict, DEV_WEBSITE_URL)?,
    }))
}

fn check_url(key: &str, value: String) -> Result<String, ConfigError> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: "must be an http(s) URL".to_string(),
        })
    }
}

/// Browser redirect target; required in production
fn redirect_url(
    source: &impl EnvSource,
    key: &str,
    strict: bool,
    dev_default: &str,
) -> Result<String, ConfigError> {
    match source.optional(key) {
        Some(value) => check_url(key, value),
        None if strict => Err(ConfigError::Missing(key.to_string())),
        None => {
            tracing::warn!(key, default = dev_default, "Redirect URL not set, using localhost");
            Ok(dev_default.to_string())
        }
    }
}

/// Gateway endpoint; defaults follow the payment mode
fn endpoint_url(source: &impl EnvSource, key: &str, default: &str) -> Result<String, ConfigError> {
    match source.optional(key) {
        Some(value) => check_url(key, value),
        None => Ok(default.to_string()),
    }
}
