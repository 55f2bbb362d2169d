use pagbridge::domain::payment::{
    ChargeStatus, ConnectionParams, GatewayConfig, PaymentData, TokenConfig,
};
use pagbridge::domain::ports::PaymentGateway;
use pagbridge::domain::response::TransactionKind;
use pagbridge::infrastructure::simulated::SimulatedGateway;
use rust_decimal_macros::dec;

fn payment() -> PaymentData {
    PaymentData {
        amount: dec!(42.50),
        currency: "USD".to_string(),
        token: "tok_sim".to_string(),
        simulation_status: None,
        customer_id: Some("cust_9".to_string()),
        customer_email: "buyer@example.com".to_string(),
        customer_ip_address: None,
        billing: None,
        order_id: None,
        reuse_source: false,
    }
}

fn config(auto_capture: bool) -> GatewayConfig {
    GatewayConfig {
        auto_capture,
        require_3d_secure: false,
        store_customer: false,
        refund_mode: Default::default(),
        // The simulated gateway never builds a client, so credentials are
        // not required.
        connection_params: ConnectionParams::default(),
    }
}

#[tokio::test]
async fn every_operation_succeeds_with_payment_echoes() {
    let gateway = SimulatedGateway::new();
    let pd = payment();
    let cfg = config(false);

    let cases = [
        (gateway.authorize(&pd, &cfg).await.unwrap(), TransactionKind::Auth),
        (gateway.capture(&pd, &cfg).await.unwrap(), TransactionKind::Capture),
        (gateway.void(&pd, &cfg).await.unwrap(), TransactionKind::Void),
        (gateway.refund(&pd, &cfg).await.unwrap(), TransactionKind::Refund),
        (gateway.confirm(&pd, &cfg).await.unwrap(), TransactionKind::Capture),
    ];

    for (response, kind) in cases {
        assert_eq!(response.kind, kind);
        assert!(response.is_success);
        assert!(response.error.is_none());
        assert_eq!(response.amount, dec!(42.50));
        assert_eq!(response.currency, "USD");
        assert_eq!(response.transaction_id, "tok_sim");
    }
}

#[tokio::test]
async fn authorize_kind_follows_auto_capture() {
    let gateway = SimulatedGateway::new();
    let response = gateway.authorize(&payment(), &config(true)).await.unwrap();
    assert_eq!(response.kind, TransactionKind::Capture);
}

#[tokio::test]
async fn simulated_chain_ends_in_refund() {
    let gateway = SimulatedGateway::new();
    let mut pd = payment();
    pd.simulation_status = Some(ChargeStatus::FullyRefunded);

    let response = gateway.process_payment(&pd, &config(true)).await.unwrap();
    assert_eq!(response.kind, TransactionKind::Refund);
    assert!(response.is_success);
}

#[tokio::test]
async fn client_tokens_are_unique() {
    let gateway = SimulatedGateway::new();
    let cfg = config(false);

    let first = gateway.client_token(&cfg, None).await.unwrap();
    let second = gateway
        .client_token(
            &cfg,
            Some(&TokenConfig {
                customer_id: Some("cust_9".to_string()),
            }),
        )
        .await
        .unwrap();

    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[tokio::test]
async fn no_vaulted_sources_offline() {
    let gateway = SimulatedGateway::new();
    let sources = gateway
        .list_client_sources(&config(false), "cust_9")
        .await
        .unwrap();
    assert!(sources.is_empty());
}
