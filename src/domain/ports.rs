use super::payment::{BillingAddress, ConnectionParams, GatewayConfig, PaymentData, TokenConfig};
use super::response::{CustomerSource, ErrorEntry, GatewayResponse};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by a [`ProcessorClient`].
///
/// Not-found is a tagged variant rather than an unchecked throw so the
/// orchestrator's decision tree stays total; gateway operations fold every
/// variant into a failed `GatewayResponse` instead of propagating it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("referenced transaction does not exist")]
    TransactionNotFound,
    #[error("processor transport failure: {0}")]
    Transport(String),
}

/// Outbound payload for a sale call.
///
/// Vault and 3-D-Secure options are only populated on the new-customer path;
/// existing-customer sales carry the customer id and settlement flag alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleRequest {
    pub amount: Decimal,
    pub payment_method_nonce: Option<String>,
    pub customer_id: Option<String>,
    pub options: SaleOptions,
    pub order_id: Option<String>,
    pub billing: Option<BillingAddress>,
    pub customer_email: String,
    pub customer_ip: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleOptions {
    pub submit_for_settlement: bool,
    pub store_in_vault_on_success: Option<bool>,
    pub three_d_secure_required: Option<bool>,
}

/// Raw result shape consumed from the processor client.
#[derive(Debug, Clone, Default)]
pub struct ProcessorResult {
    pub is_success: bool,
    pub errors: Vec<ErrorEntry>,
    pub transaction: Option<ProcessorTransaction>,
}

/// The transaction object embedded in a processor result. `id` may be absent
/// on some processor paths even when the object itself is present.
#[derive(Debug, Clone, Default)]
pub struct ProcessorTransaction {
    pub id: Option<String>,
    pub currency_iso_code: String,
    pub amount: Decimal,
    pub credit_card: Option<serde_json::Value>,
    pub customer_id: Option<String>,
}

/// A processor-vaulted customer with their stored cards.
#[derive(Debug, Clone, Default)]
pub struct ProcessorCustomer {
    pub id: String,
    pub credit_cards: Vec<StoredCard>,
}

#[derive(Debug, Clone)]
pub struct StoredCard {
    pub unique_number_identifier: String,
    pub expiration_month: u8,
    pub expiration_year: u16,
    pub last_4: String,
    pub cardholder_name: String,
}

/// The processor SDK surface this crate consumes. One client performs one
/// logical call; it may block on network I/O but holds no transaction state.
#[async_trait]
pub trait ProcessorClient: Send + Sync {
    async fn sale(&self, request: SaleRequest) -> std::result::Result<ProcessorResult, ClientError>;

    async fn submit_for_settlement(
        &self,
        transaction_id: &str,
        amount: Decimal,
    ) -> std::result::Result<ProcessorResult, ClientError>;

    async fn void(&self, transaction_id: &str)
    -> std::result::Result<ProcessorResult, ClientError>;

    async fn refund(
        &self,
        transaction_id: &str,
        amount: Decimal,
    ) -> std::result::Result<ProcessorResult, ClientError>;

    async fn find_customer(
        &self,
        customer_id: &str,
    ) -> std::result::Result<Option<ProcessorCustomer>, ClientError>;

    async fn generate_client_token(
        &self,
        customer_id: Option<&str>,
    ) -> std::result::Result<String, ClientError>;
}

pub type ProcessorClientBox = Box<dyn ProcessorClient>;

/// Builds an authenticated [`ProcessorClient`] from connection parameters.
///
/// Implementations must validate credentials (fatal
/// `GatewayError::Configuration` on blanks), select the sandbox or
/// production endpoint from `params.sandbox`, and hand out a fresh client
/// per call. Pooling and connection reuse belong to the SDK layer.
pub trait ClientFactory: Send + Sync {
    fn build(&self, params: &ConnectionParams) -> Result<ProcessorClientBox>;
}

pub type ClientFactoryBox = Box<dyn ClientFactory>;

/// The surface exposed to the order-management system.
///
/// Two variants exist: `ProcessorGateway` drives a real processor client,
/// `SimulatedGateway` fabricates deterministic outcomes. Callers select one
/// at construction time and hold it as `Box<dyn PaymentGateway>`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn authorize(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse>;

    async fn capture(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse>;

    async fn void(&self, payment: &PaymentData, config: &GatewayConfig)
    -> Result<GatewayResponse>;

    async fn refund(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse>;

    /// Settles a previously authorized transaction after an out-of-band
    /// confirmation step (e.g. 3-D-Secure).
    async fn confirm(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse>;

    async fn process_payment(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse>;

    async fn list_client_sources(
        &self,
        config: &GatewayConfig,
        customer_id: &str,
    ) -> Result<Vec<CustomerSource>>;

    async fn client_token(
        &self,
        config: &GatewayConfig,
        token_config: Option<&TokenConfig>,
    ) -> Result<String>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
