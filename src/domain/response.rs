use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The category of financial operation a [`GatewayResponse`] represents.
/// Callers use it to record the matching ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Auth,
    Capture,
    Void,
    Refund,
}

/// The uniform outcome of one gateway operation.
///
/// Built exactly once per operation call and returned to the caller; this
/// crate keeps no copy. `error` is set iff `is_success` is false, with one
/// exception: refunds under `RefundMode::AlwaysSucceed` always report
/// success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub is_success: bool,
    pub action_required: bool,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: String,
    pub customer_id: Option<String>,
    /// User-safe message. Raw processor diagnostics only appear in
    /// `raw_response`.
    pub error: Option<String>,
    /// Normalized diagnostic map for storage alongside the transaction
    /// record.
    pub raw_response: Option<serde_json::Value>,
}

/// One processor-reported error, as consumed by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub code: String,
    pub message: String,
}

/// The uniform shape extracted from a raw processor result.
///
/// `transaction_id` and friends are absent when the processor rejected the
/// request before creating a transaction at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub errors: Vec<ErrorEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card: Option<serde_json::Value>,
}

impl NormalizedResponse {
    /// Diagnostic map stored on the response. Serialization of this plain
    /// data shape cannot fail in practice.
    pub fn to_diagnostics(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}

/// A stored payment method of a processor-vaulted customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSource {
    pub id: String,
    pub gateway: String,
    pub credit_card_info: CreditCardInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardInfo {
    pub exp_month: u8,
    pub exp_year: u16,
    pub last_4: String,
    pub name_on_card: String,
}
