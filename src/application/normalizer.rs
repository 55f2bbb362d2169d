use crate::domain::ports::ProcessorResult;
use crate::domain::response::NormalizedResponse;

/// Extracts the locally stored shape from a raw processor result.
///
/// Failures carry every reported error entry; a result without a transaction
/// object (processor rejected before creating one) yields errors only, all
/// other fields absent. A present transaction may still omit its id on some
/// processor paths, which normalizes to an empty string.
pub fn normalize(result: &ProcessorResult) -> NormalizedResponse {
    let errors = if result.is_success {
        Vec::new()
    } else {
        result.errors.clone()
    };

    let Some(transaction) = &result.transaction else {
        return NormalizedResponse {
            errors,
            ..Default::default()
        };
    };

    NormalizedResponse {
        errors,
        transaction_id: Some(transaction.id.clone().unwrap_or_default()),
        currency: Some(transaction.currency_iso_code.clone()),
        amount: Some(transaction.amount),
        customer_id: transaction.customer_id.clone(),
        credit_card: transaction.credit_card.clone(),
    }
}
