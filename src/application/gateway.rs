use crate::application::classifier::{DEFAULT_ERROR_MESSAGE, error_for_client};
use crate::application::normalizer::normalize;
use crate::domain::payment::{ChargeStatus, GatewayConfig, PaymentData, RefundMode, TokenConfig};
use crate::domain::ports::{
    ClientError, ClientFactoryBox, PaymentGateway, ProcessorClientBox, ProcessorResult,
    SaleOptions, SaleRequest, StoredCard,
};
use crate::domain::response::{
    CreditCardInfo, CustomerSource, GatewayResponse, NormalizedResponse, TransactionKind,
};
use crate::error::Result;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// The real gateway variant: every operation builds a fresh processor client
/// from the call's connection parameters, performs exactly one processor
/// call, and folds the raw result through normalization and error
/// classification into a [`GatewayResponse`].
///
/// Holds no transaction state; concurrent calls share nothing but the
/// factory.
pub struct ProcessorGateway {
    factory: ClientFactoryBox,
    gateway_name: String,
}

impl ProcessorGateway {
    pub fn new(factory: ClientFactoryBox, gateway_name: impl Into<String>) -> Self {
        Self {
            factory,
            gateway_name: gateway_name.into(),
        }
    }

    fn client(&self, config: &GatewayConfig) -> Result<ProcessorClientBox> {
        self.factory.build(&config.connection_params)
    }

    /// Assembles the response for one operation. Amount, currency and
    /// transaction id fall back to the payment's own values whenever the
    /// normalized result omits them, so a failed call still reports a
    /// consistent shape to the caller's ledger.
    fn build_response(
        kind: TransactionKind,
        payment: &PaymentData,
        is_success: bool,
        normalized: NormalizedResponse,
    ) -> GatewayResponse {
        let error = error_for_client(&normalized.errors);
        GatewayResponse {
            is_success,
            action_required: false,
            kind,
            amount: normalized.amount.unwrap_or(payment.amount),
            currency: normalized
                .currency
                .clone()
                .unwrap_or_else(|| payment.currency.clone()),
            transaction_id: normalized
                .transaction_id
                .clone()
                .unwrap_or_else(|| payment.token.clone()),
            customer_id: normalized.customer_id.clone(),
            error: (!error.is_empty()).then_some(error),
            raw_response: normalized.to_diagnostics(),
        }
    }

    /// Folds a client-level failure (unknown transaction, transport error)
    /// into a failed response. Nothing past the configuration check is ever
    /// surfaced as a hard error.
    fn failed_response(
        kind: TransactionKind,
        payment: &PaymentData,
        cause: &ClientError,
    ) -> GatewayResponse {
        warn!(?kind, %cause, "processor call failed before producing a result");
        GatewayResponse {
            is_success: false,
            action_required: false,
            kind,
            amount: payment.amount,
            currency: payment.currency.clone(),
            transaction_id: payment.token.clone(),
            customer_id: None,
            error: Some(DEFAULT_ERROR_MESSAGE.to_string()),
            raw_response: None,
        }
    }

    fn outcome(
        kind: TransactionKind,
        payment: &PaymentData,
        result: std::result::Result<ProcessorResult, ClientError>,
    ) -> GatewayResponse {
        match result {
            Ok(raw) => Self::build_response(kind, payment, raw.is_success, normalize(&raw)),
            Err(cause) => Self::failed_response(kind, payment, &cause),
        }
    }

    /// Sale payload for a customer without a vault record: carries the
    /// payment-method nonce plus vault and 3-D-Secure options.
    fn sale_for_new_customer(payment: &PaymentData, config: &GatewayConfig) -> SaleRequest {
        SaleRequest {
            amount: payment.amount,
            payment_method_nonce: Some(payment.token.clone()),
            customer_id: None,
            options: SaleOptions {
                submit_for_settlement: config.auto_capture,
                store_in_vault_on_success: Some(payment.reuse_source),
                three_d_secure_required: Some(config.require_3d_secure),
            },
            order_id: payment.order_id.clone(),
            billing: payment.billing.clone(),
            customer_email: payment.customer_email.clone(),
            customer_ip: payment.customer_ip_address.clone().unwrap_or_default(),
        }
    }

    /// Sale payload for a returning customer: charges the vaulted record,
    /// no vault or 3-D-Secure options.
    fn sale_for_existing_customer(
        payment: &PaymentData,
        config: &GatewayConfig,
        customer_id: &str,
    ) -> SaleRequest {
        SaleRequest {
            amount: payment.amount,
            payment_method_nonce: None,
            customer_id: Some(customer_id.to_string()),
            options: SaleOptions {
                submit_for_settlement: config.auto_capture,
                store_in_vault_on_success: None,
                three_d_secure_required: None,
            },
            order_id: payment.order_id.clone(),
            billing: payment.billing.clone(),
            customer_email: payment.customer_email.clone(),
            customer_ip: payment.customer_ip_address.clone().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl PaymentGateway for ProcessorGateway {
    /// Charges the payment method. With `auto_capture` the sale is submitted
    /// for settlement in the same processor call, and the response kind is
    /// `Capture` rather than `Auth`.
    #[instrument(skip_all, fields(order_id = ?payment.order_id))]
    async fn authorize(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        let client = self.client(config)?;
        let request = match &payment.customer_id {
            Some(customer_id) => Self::sale_for_existing_customer(payment, config, customer_id),
            None => Self::sale_for_new_customer(payment, config),
        };
        let kind = if config.auto_capture {
            TransactionKind::Capture
        } else {
            TransactionKind::Auth
        };
        Ok(Self::outcome(kind, payment, client.sale(request).await))
    }

    /// Submits a previously authorized transaction for settlement. The
    /// payment's token carries the processor transaction id here.
    #[instrument(skip_all, fields(order_id = ?payment.order_id))]
    async fn capture(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        let client = self.client(config)?;
        let result = client
            .submit_for_settlement(&payment.token, payment.amount)
            .await;
        Ok(Self::outcome(TransactionKind::Capture, payment, result))
    }

    #[instrument(skip_all, fields(order_id = ?payment.order_id))]
    async fn void(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        let client = self.client(config)?;
        let result = client.void(&payment.token).await;
        Ok(Self::outcome(TransactionKind::Void, payment, result))
    }

    /// Refunds a settled transaction. Under `RefundMode::AlwaysSucceed` the
    /// processor call is still issued but the reported outcome is a fixed
    /// success echoing the payment's own amount and token.
    #[instrument(skip_all, fields(order_id = ?payment.order_id))]
    async fn refund(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        let client = self.client(config)?;
        let result = client.refund(&payment.token, payment.amount).await;

        if config.refund_mode == RefundMode::AlwaysSucceed {
            debug!("refund outcome fixed to success by configuration");
            return Ok(GatewayResponse {
                is_success: true,
                action_required: false,
                kind: TransactionKind::Refund,
                amount: payment.amount,
                currency: payment.currency.clone(),
                transaction_id: payment.token.clone(),
                customer_id: None,
                error: None,
                raw_response: None,
            });
        }

        Ok(Self::outcome(TransactionKind::Refund, payment, result))
    }

    async fn confirm(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        self.capture(payment, config).await
    }

    /// The orchestrating decision tree. A payment without a simulation
    /// status is captured directly; a simulated payment walks an
    /// authorize -> capture -> refund chain driven by the status marker.
    /// Linear and loop-free: exactly one response per invocation.
    #[instrument(skip_all, fields(order_id = ?payment.order_id))]
    async fn process_payment(
        &self,
        payment: &PaymentData,
        config: &GatewayConfig,
    ) -> Result<GatewayResponse> {
        let Some(status) = payment.simulation_status else {
            return self.capture(payment, config).await;
        };
        debug!(?status, "processing simulated payment chain");

        let authorize_response = self.authorize(payment, config).await?;
        if status == ChargeStatus::NotCharged {
            return Ok(authorize_response);
        }
        if !config.auto_capture {
            return Ok(authorize_response);
        }

        let capture_response = self.capture(payment, config).await?;
        if status == ChargeStatus::FullyRefunded {
            return self.refund(payment, config).await;
        }
        Ok(capture_response)
    }

    /// Absence of the customer is a normal outcome and maps to an empty
    /// list; card ordering follows the processor's own return order.
    async fn list_client_sources(
        &self,
        config: &GatewayConfig,
        customer_id: &str,
    ) -> Result<Vec<CustomerSource>> {
        let client = self.client(config)?;
        let customer = match client.find_customer(customer_id).await {
            Ok(found) => found,
            Err(cause) => {
                warn!(%cause, "customer lookup failed");
                None
            }
        };
        let Some(customer) = customer else {
            return Ok(Vec::new());
        };
        Ok(customer
            .credit_cards
            .iter()
            .map(|card| self.customer_source(card))
            .collect())
    }

    async fn client_token(
        &self,
        config: &GatewayConfig,
        token_config: Option<&TokenConfig>,
    ) -> Result<String> {
        let client = self.client(config)?;
        let customer_id = token_config
            .and_then(|tc| tc.customer_id.as_deref())
            .filter(|_| config.store_customer);
        match client.generate_client_token(customer_id).await {
            Ok(token) => Ok(token),
            Err(cause) => {
                warn!(%cause, "client token generation failed");
                Ok(String::new())
            }
        }
    }
}

impl ProcessorGateway {
    fn customer_source(&self, card: &StoredCard) -> CustomerSource {
        CustomerSource {
            id: card.unique_number_identifier.clone(),
            gateway: self.gateway_name.clone(),
            credit_card_info: CreditCardInfo {
                exp_month: card.expiration_month,
                exp_year: card.expiration_year,
                last_4: card.last_4.clone(),
                name_on_card: card.cardholder_name.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::classifier::GENERIC_PAYMENT_ERROR;
    use crate::domain::payment::ConnectionParams;
    use crate::domain::ports::{ProcessorCustomer, StoredCard};
    use crate::error::GatewayError;
    use crate::infrastructure::simulated::{ClientCall, SimulatedClientFactory, SimulatedOutcome};
    use rust_decimal_macros::dec;

    fn payment() -> PaymentData {
        PaymentData {
            amount: dec!(10.00),
            currency: "USD".to_string(),
            token: "tok_abc123".to_string(),
            simulation_status: None,
            customer_id: None,
            customer_email: "buyer@example.com".to_string(),
            customer_ip_address: Some("203.0.113.7".to_string()),
            billing: None,
            order_id: Some("order-1".to_string()),
            reuse_source: true,
        }
    }

    fn config(factory_params: bool) -> GatewayConfig {
        GatewayConfig {
            auto_capture: true,
            require_3d_secure: false,
            store_customer: false,
            refund_mode: RefundMode::Processor,
            connection_params: if factory_params {
                ConnectionParams {
                    sandbox: true,
                    merchant_id: "m-1".to_string(),
                    public_key: "pub".to_string(),
                    private_key: "priv".to_string(),
                }
            } else {
                ConnectionParams::default()
            },
        }
    }

    fn gateway(factory: &SimulatedClientFactory) -> ProcessorGateway {
        ProcessorGateway::new(Box::new(factory.clone()), "simulated")
    }

    #[tokio::test]
    async fn test_blank_credentials_fail_configuration() {
        let factory = SimulatedClientFactory::new();
        let gateway = gateway(&factory);

        let result = gateway.authorize(&payment(), &config(false)).await;
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_authorize_new_customer_includes_vault_and_3ds_options() {
        let factory = SimulatedClientFactory::new();
        let gateway = gateway(&factory);
        let mut cfg = config(true);
        cfg.require_3d_secure = true;

        let response = gateway.authorize(&payment(), &cfg).await.unwrap();
        assert!(response.is_success);
        assert_eq!(response.kind, TransactionKind::Capture);

        let calls = factory.recorded_calls().await;
        let ClientCall::Sale(request) = &calls[0] else {
            panic!("expected a sale call, got {:?}", calls[0]);
        };
        assert_eq!(request.payment_method_nonce.as_deref(), Some("tok_abc123"));
        assert!(request.customer_id.is_none());
        assert!(request.options.submit_for_settlement);
        assert_eq!(request.options.store_in_vault_on_success, Some(true));
        assert_eq!(request.options.three_d_secure_required, Some(true));
    }

    #[tokio::test]
    async fn test_authorize_existing_customer_omits_vault_and_3ds_options() {
        let factory = SimulatedClientFactory::new();
        let gateway = gateway(&factory);
        let mut pd = payment();
        pd.customer_id = Some("cust_7".to_string());

        gateway.authorize(&pd, &config(true)).await.unwrap();

        let calls = factory.recorded_calls().await;
        let ClientCall::Sale(request) = &calls[0] else {
            panic!("expected a sale call, got {:?}", calls[0]);
        };
        assert_eq!(request.customer_id.as_deref(), Some("cust_7"));
        assert!(request.payment_method_nonce.is_none());
        assert!(request.options.store_in_vault_on_success.is_none());
        assert!(request.options.three_d_secure_required.is_none());
    }

    #[tokio::test]
    async fn test_authorize_kind_follows_auto_capture() {
        let factory = SimulatedClientFactory::new();
        let gateway = gateway(&factory);
        let mut cfg = config(true);
        cfg.auto_capture = false;

        let response = gateway.authorize(&payment(), &cfg).await.unwrap();
        assert_eq!(response.kind, TransactionKind::Auth);
    }

    #[tokio::test]
    async fn test_declined_sale_reports_generic_error() {
        let factory = SimulatedClientFactory::new().with_outcome(SimulatedOutcome::Decline {
            code: "2001".to_string(),
            message: "Insufficient Funds".to_string(),
        });
        let gateway = gateway(&factory);

        let response = gateway.authorize(&payment(), &config(true)).await.unwrap();
        assert!(!response.is_success);
        assert_eq!(response.error.as_deref(), Some(GENERIC_PAYMENT_ERROR));
        // Declines create no transaction, so the ledger falls back to the
        // payment's own values.
        assert_eq!(response.amount, dec!(10.00));
        assert_eq!(response.currency, "USD");
        assert_eq!(response.transaction_id, "tok_abc123");
        // Raw detail stays in the diagnostic map
        let raw = response.raw_response.unwrap();
        assert_eq!(raw["errors"][0]["code"], "2001");
    }

    #[tokio::test]
    async fn test_unknown_transaction_folds_into_failed_response() {
        let factory = SimulatedClientFactory::new().with_outcome(SimulatedOutcome::NotFound);
        let gateway = gateway(&factory);

        let response = gateway.capture(&payment(), &config(true)).await.unwrap();
        assert!(!response.is_success);
        assert_eq!(response.kind, TransactionKind::Capture);
        assert_eq!(response.error.as_deref(), Some(DEFAULT_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_transport_failure_folds_into_failed_response() {
        let factory = SimulatedClientFactory::new()
            .with_outcome(SimulatedOutcome::Transport("connection reset".to_string()));
        let gateway = gateway(&factory);

        let response = gateway.void(&payment(), &config(true)).await.unwrap();
        assert!(!response.is_success);
        assert_eq!(response.kind, TransactionKind::Void);
        assert_eq!(response.error.as_deref(), Some(DEFAULT_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_refund_processor_mode_uses_processor_outcome() {
        let factory = SimulatedClientFactory::new().with_outcome(SimulatedOutcome::Decline {
            code: "91506".to_string(),
            message: "raw msg".to_string(),
        });
        let gateway = gateway(&factory);

        let response = gateway.refund(&payment(), &config(true)).await.unwrap();
        assert!(!response.is_success);
        assert_eq!(response.kind, TransactionKind::Refund);
        assert!(
            response
                .error
                .as_deref()
                .unwrap()
                .starts_with("Cannot refund transaction")
        );
    }

    #[tokio::test]
    async fn test_refund_always_succeed_mode_reports_success() {
        let factory = SimulatedClientFactory::new().with_outcome(SimulatedOutcome::Decline {
            code: "2001".to_string(),
            message: "Insufficient Funds".to_string(),
        });
        let gateway = gateway(&factory);
        let mut cfg = config(true);
        cfg.refund_mode = RefundMode::AlwaysSucceed;

        let response = gateway.refund(&payment(), &cfg).await.unwrap();
        assert!(response.is_success);
        assert!(response.error.is_none());
        assert_eq!(response.amount, dec!(10.00));
        assert_eq!(response.transaction_id, "tok_abc123");

        // The processor call is still issued; only the reported outcome is
        // fixed.
        let calls = factory.recorded_calls().await;
        assert!(matches!(calls[0], ClientCall::Refund { .. }));
    }

    #[tokio::test]
    async fn test_list_client_sources_maps_stored_cards_in_order() {
        let factory = SimulatedClientFactory::new();
        factory
            .insert_customer(ProcessorCustomer {
                id: "cust_7".to_string(),
                credit_cards: vec![
                    StoredCard {
                        unique_number_identifier: "card-a".to_string(),
                        expiration_month: 4,
                        expiration_year: 2028,
                        last_4: "1111".to_string(),
                        cardholder_name: "Ada Lovelace".to_string(),
                    },
                    StoredCard {
                        unique_number_identifier: "card-b".to_string(),
                        expiration_month: 9,
                        expiration_year: 2027,
                        last_4: "4444".to_string(),
                        cardholder_name: "Ada Lovelace".to_string(),
                    },
                ],
            })
            .await;
        let gateway = gateway(&factory);

        let sources = gateway
            .list_client_sources(&config(true), "cust_7")
            .await
            .unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].id, "card-a");
        assert_eq!(sources[0].gateway, "simulated");
        assert_eq!(sources[0].credit_card_info.exp_month, 4);
        assert_eq!(sources[0].credit_card_info.last_4, "1111");
        assert_eq!(sources[1].id, "card-b");
    }

    #[tokio::test]
    async fn test_list_client_sources_unknown_customer_is_empty() {
        let factory = SimulatedClientFactory::new();
        let gateway = gateway(&factory);

        let sources = gateway
            .list_client_sources(&config(true), "nobody")
            .await
            .unwrap();
        assert!(sources.is_empty());
    }

    #[tokio::test]
    async fn test_client_token_forwards_customer_only_when_storing() {
        let factory = SimulatedClientFactory::new();
        let gateway = gateway(&factory);
        let token_config = TokenConfig {
            customer_id: Some("cust_7".to_string()),
        };

        let mut cfg = config(true);
        gateway
            .client_token(&cfg, Some(&token_config))
            .await
            .unwrap();
        cfg.store_customer = true;
        gateway
            .client_token(&cfg, Some(&token_config))
            .await
            .unwrap();

        let calls = factory.recorded_calls().await;
        let ClientCall::GenerateClientToken { customer_id } = &calls[0] else {
            panic!("expected a token call, got {:?}", calls[0]);
        };
        assert!(customer_id.is_none());
        let ClientCall::GenerateClientToken { customer_id } = &calls[1] else {
            panic!("expected a token call, got {:?}", calls[1]);
        };
        assert_eq!(customer_id.as_deref(), Some("cust_7"));
    }
}
