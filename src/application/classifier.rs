use crate::domain::response::ErrorEntry;

/// Shown for any processor failure whose code is not whitelisted. Raw
/// processor diagnostics must never leak into user-facing text.
pub const GENERIC_PAYMENT_ERROR: &str =
    "Unable to process transaction. Please try again in a moment";

/// Shown when the processor reports the referenced transaction or request
/// cannot be processed at all (e.g. unknown transaction id).
pub const DEFAULT_ERROR_MESSAGE: &str = "Unable to process the payment request.";

/// Error codes whose messages are safe to surface, paired with an override
/// text. A blank override means the processor's own message is used as-is.
const ERROR_CODES_WHITELIST: &[(&str, &str)] = &[(
    "91506",
    "Cannot refund transaction unless it is settled. Please try again later. \
     Settlement time might vary depending on the issuers bank.",
)];

/// Filters processor errors down to the single message visible to the
/// client.
///
/// Empty input means no error and yields an empty string. Otherwise the
/// first whitelisted entry, in iteration order, wins; with no whitelisted
/// entry the fixed generic message is returned regardless of what the
/// processor said.
pub fn error_for_client(errors: &[ErrorEntry]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    for entry in errors {
        if let Some((_, override_msg)) = ERROR_CODES_WHITELIST
            .iter()
            .find(|(code, _)| *code == entry.code)
        {
            if override_msg.is_empty() {
                return entry.message.clone();
            }
            return (*override_msg).to_string();
        }
    }
    GENERIC_PAYMENT_ERROR.to_string()
}
