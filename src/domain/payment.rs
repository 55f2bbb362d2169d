use crate::error::GatewayError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single payment attempt as handed over by the order-management system.
///
/// Immutable for the lifetime of the attempt: operations read it, none of
/// them mutate it. The `token` is an opaque payment-method nonce; simulated
/// flows are requested through the separate [`simulation_status`] field
/// rather than by overloading the token (a real nonce that happened to look
/// like a status marker must never flip the orchestrator into test routing).
///
/// [`simulation_status`]: PaymentData::simulation_status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentData {
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Opaque payment-method nonce or processor transaction reference,
    /// depending on the operation.
    pub token: String,
    /// When set, `process_payment` drives a deterministic simulated
    /// authorize/capture/refund chain instead of a plain capture.
    pub simulation_status: Option<ChargeStatus>,
    /// Processor-side vault id of a returning customer.
    pub customer_id: Option<String>,
    pub customer_email: String,
    pub customer_ip_address: Option<String>,
    pub billing: Option<BillingAddress>,
    pub order_id: Option<String>,
    /// Ask the processor to vault the payment method on success.
    pub reuse_source: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub postal_code: String,
    pub street_address_1: String,
    pub street_address_2: String,
    pub city: String,
    pub country_area: String,
    pub country: String,
}

/// Per-call gateway configuration. Read-only; this crate never stores it.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Collapse authorize+capture into a single sale submitted for
    /// settlement.
    pub auto_capture: bool,
    pub require_3d_secure: bool,
    /// Forward customer ids when generating client tokens so the processor
    /// scopes the token to the vaulted customer.
    pub store_customer: bool,
    pub refund_mode: RefundMode,
    pub connection_params: ConnectionParams,
}

/// How `refund` derives its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefundMode {
    /// Normalize and classify the processor's refund result.
    #[default]
    Processor,
    /// Report success regardless of the processor result. The refund call is
    /// still issued; only the reported outcome is fixed. Intended for
    /// sandbox/demo configurations, never for production.
    AlwaysSucceed,
}

/// Credentials and endpoint selection for the processor client.
///
/// Travels inside [`GatewayConfig`] on every call; there is no process-wide
/// session state derived from it.
#[derive(Debug, Clone, Default)]
pub struct ConnectionParams {
    pub sandbox: bool,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: String,
}

impl ConnectionParams {
    /// Rejects blank credentials before any client is built. A misconfigured
    /// gateway is fatal and must not be retried.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.merchant_id.trim().is_empty()
            || self.public_key.trim().is_empty()
            || self.private_key.trim().is_empty()
        {
            return Err(GatewayError::Configuration(
                "merchant_id, public_key and private_key are required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn environment(&self) -> Environment {
        if self.sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

/// Charge-status markers used to drive deterministic simulated payment
/// flows. The payment form that previously smuggled these through the token
/// field parses them with [`ChargeStatus::from_token`] and sets
/// `PaymentData::simulation_status` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargeStatus {
    NotCharged,
    Pending,
    PartiallyCharged,
    FullyCharged,
    PartiallyRefunded,
    FullyRefunded,
    Refused,
    Cancelled,
}

impl ChargeStatus {
    /// Recognizes a charge-status marker in a raw token string. Returns
    /// `None` for anything else, including real payment-method nonces.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "not-charged" => Some(Self::NotCharged),
            "pending" => Some(Self::Pending),
            "partially-charged" => Some(Self::PartiallyCharged),
            "fully-charged" => Some(Self::FullyCharged),
            "partially-refunded" => Some(Self::PartiallyRefunded),
            "fully-refunded" => Some(Self::FullyRefunded),
            "refused" => Some(Self::Refused),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Extra inputs for client-token generation.
#[derive(Debug, Clone, Default)]
pub struct TokenConfig {
    pub customer_id: Option<String>,
}
