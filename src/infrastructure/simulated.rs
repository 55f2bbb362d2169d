use crate::domain::payment::{ChargeStatus, Environment, GatewayConfig, PaymentData, TokenConfig};
use crate::domain::ports::{
    ClientError, ClientFactory, PaymentGateway, ProcessorClient, ProcessorClientBox,
    ProcessorCustomer, ProcessorResult, ProcessorTransaction, SaleRequest,
};
use crate::domain::response::{CustomerSource, ErrorEntry, GatewayResponse, TransactionKind};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Scripted behavior for every transaction call of a [`SimulatedClient`].
#[derive(Debug, Clone, Default)]
pub enum SimulatedOutcome {
    /// Approve with a fresh simulated transaction id.
    #[default]
    Approve,
    /// Fail with one processor error entry and no transaction object.
    Decline { code: String, message: String },
    /// Report the referenced transaction as unknown.
    NotFound,
    /// Fail at the transport layer.
    Transport(String),
}

/// One recorded processor call, kept for assertions on payload shape and
/// call order.
#[derive(Debug, Clone)]
pub enum ClientCall {
    Sale(SaleRequest),
    SubmitForSettlement {
        transaction_id: String,
        amount: Decimal,
    },
    Void {
        transaction_id: String,
    },
    Refund {
        transaction_id: String,
        amount: Decimal,
    },
    FindCustomer {
        customer_id: String,
    },
    GenerateClientToken {
        customer_id: Option<String>,
    },
}

/// An in-process stand-in for the processor SDK client.
///
/// Shares its call log and customer records with the factory that built it,
/// so tests can script outcomes and inspect exactly which calls a gateway
/// operation issued.
#[derive(Clone)]
pub struct SimulatedClient {
    environment: Environment,
    currency: String,
    outcome: SimulatedOutcome,
    calls: Arc<RwLock<Vec<ClientCall>>>,
    customers: Arc<RwLock<HashMap<String, ProcessorCustomer>>>,
}

impl SimulatedClient {
    pub fn environment(&self) -> Environment {
        self.environment
    }

    async fn record(&self, call: ClientCall) {
        self.calls.write().await.push(call);
    }

    fn transaction_result(
        &self,
        transaction_id: Option<String>,
        amount: Decimal,
        customer_id: Option<String>,
    ) -> std::result::Result<ProcessorResult, ClientError> {
        match &self.outcome {
            SimulatedOutcome::Approve => Ok(ProcessorResult {
                is_success: true,
                errors: Vec::new(),
                transaction: Some(ProcessorTransaction {
                    id: Some(
                        transaction_id.unwrap_or_else(|| format!("sim_{}", Uuid::new_v4())),
                    ),
                    currency_iso_code: self.currency.clone(),
                    amount,
                    credit_card: None,
                    customer_id,
                }),
            }),
            SimulatedOutcome::Decline { code, message } => Ok(ProcessorResult {
                is_success: false,
                errors: vec![ErrorEntry {
                    code: code.clone(),
                    message: message.clone(),
                }],
                transaction: None,
            }),
            SimulatedOutcome::NotFound => Err(ClientError::TransactionNotFound),
            SimulatedOutcome::Transport(cause) => Err(ClientError::Transport(cause.clone())),
        }
    }
}

#[async_trait]
impl ProcessorClient for SimulatedClient {
    async fn sale(&self, request: SaleRequest) -> std::result::Result<ProcessorResult, ClientError> {
        let amount = request.amount;
        let customer_id = request.customer_id.clone();
        self.record(ClientCall::Sale(request)).await;
        self.transaction_result(None, amount, customer_id)
    }

    async fn submit_for_settlement(
        &self,
        transaction_id: &str,
        amount: Decimal,
    ) -> std::result::Result<ProcessorResult, ClientError> {
        self.record(ClientCall::SubmitForSettlement {
            transaction_id: transaction_id.to_string(),
            amount,
        })
        .await;
        self.transaction_result(Some(transaction_id.to_string()), amount, None)
    }

    async fn void(
        &self,
        transaction_id: &str,
    ) -> std::result::Result<ProcessorResult, ClientError> {
        self.record(ClientCall::Void {
            transaction_id: transaction_id.to_string(),
        })
        .await;
        self.transaction_result(Some(transaction_id.to_string()), Decimal::ZERO, None)
    }

    async fn refund(
        &self,
        transaction_id: &str,
        amount: Decimal,
    ) -> std::result::Result<ProcessorResult, ClientError> {
        self.record(ClientCall::Refund {
            transaction_id: transaction_id.to_string(),
            amount,
        })
        .await;
        self.transaction_result(Some(transaction_id.to_string()), amount, None)
    }

    async fn find_customer(
        &self,
        customer_id: &str,
    ) -> std::result::Result<Option<ProcessorCustomer>, ClientError> {
        self.record(ClientCall::FindCustomer {
            customer_id: customer_id.to_string(),
        })
        .await;
        Ok(self.customers.read().await.get(customer_id).cloned())
    }

    async fn generate_client_token(
        &self,
        customer_id: Option<&str>,
    ) -> std::result::Result<String, ClientError> {
        self.record(ClientCall::GenerateClientToken {
            customer_id: customer_id.map(str::to_string),
        })
        .await;
        Ok(Uuid::new_v4().to_string())
    }
}

/// Builds [`SimulatedClient`]s. Honors the factory contract: credentials are
/// validated, the environment comes from the sandbox flag, and every build
/// hands out a fresh client (sharing only the recorder). Clones share the
/// recorder too, so a test can hold one handle while the gateway owns
/// another.
#[derive(Default, Clone)]
pub struct SimulatedClientFactory {
    outcome: SimulatedOutcome,
    currency: String,
    calls: Arc<RwLock<Vec<ClientCall>>>,
    customers: Arc<RwLock<HashMap<String, ProcessorCustomer>>>,
}

impl SimulatedClientFactory {
    pub fn new() -> Self {
        Self {
            currency: "USD".to_string(),
            ..Default::default()
        }
    }

    pub fn with_outcome(mut self, outcome: SimulatedOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Seeds a vaulted customer for `find_customer` lookups.
    pub async fn insert_customer(&self, customer: ProcessorCustomer) {
        self.customers
            .write()
            .await
            .insert(customer.id.clone(), customer);
    }

    /// Snapshot of every call issued by clients built from this factory, in
    /// invocation order.
    pub async fn recorded_calls(&self) -> Vec<ClientCall> {
        self.calls.read().await.clone()
    }
}

impl ClientFactory for SimulatedClientFactory {
    fn build(
        &self,
        params: &crate::domain::payment::ConnectionParams,
    ) -> Result<ProcessorClientBox> {
        params.validate()?;
        Ok(Box::new(SimulatedClient {
            environment: params.environment(),
            currency: self.currency.clone(),
            outcome: self.outcome.clone(),
            calls: Arc::clone(&self.calls),
            customers: Arc::clone(&self.customers),
        }))
    }
}

/// The dummy gateway variant: fabricates successful responses without ever
/// touching a processor client. Useful for demo environments and for
/// exercising order-management flows offline.
#[derive(Default)]
pub struct SimulatedGateway;

impl SimulatedGateway {
    pub fn new() -> Self {
        Self
    }

    fn success(
        kind: TransactionKind,
        payment: &PaymentData,
    ) -> GatewayResponse {
        GatewayResponse {
            is_success: true,
            action_required: false,
            kind,
            amount: payment.amount,
            currency: payment.currency.clone(),
            transaction_id: payment.token.clone(),
            customer_id: payment.customer_id.clone(),
            error: None,
            raw_response: None,
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn authorize(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        let kind = if config.auto_capture {
            TransactionKind::Capture
        } else {
            TransactionKind::Auth
        };
        Ok(Self::success(kind, payment))
    }

    async fn capture(
        &self,
        payment: &PaymentData,
        _config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        Ok(Self::success(TransactionKind::Capture, payment))
    }

    async fn void(
        &self,
        payment: &PaymentData,
        _config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        Ok(Self::success(TransactionKind::Void, payment))
    }

    async fn refund(
        &self,
        payment: &PaymentData,
        _config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        Ok(Self::success(TransactionKind::Refund, payment))
    }

    async fn confirm(
        &self,
        payment: &PaymentData,
        _config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        Ok(Self::success(TransactionKind::Capture, payment))
    }

    /// Same decision tree as the processor variant, over fabricated
    /// responses.
    async fn process_payment(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        let Some(status) = payment.simulation_status else {
            return self.capture(payment, config).await;
        };

        let authorize_response = self.authorize(payment, config).await?;
        if status == ChargeStatus::NotCharged || !config.auto_capture {
            return Ok(authorize_response);
        }

        let capture_response = self.capture(payment, config).await?;
        if status == ChargeStatus::FullyRefunded {
            return self.refund(payment, config).await;
        }
        Ok(capture_response)
    }

    async fn list_client_sources(
        &self,
        _config: &GatewayConfig,
        _customer_id: &str,
    ) -> Result<Vec<CustomerSource>> {
        Ok(Vec::new())
    }

    async fn client_token(
        &self,
        _config: &GatewayConfig,
        _token_config: Option<&TokenConfig>,
    ) -> Result<String> {
        Ok(Uuid::new_v4().to_string())
    }
}
