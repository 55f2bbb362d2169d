use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or blank processor credentials. Fatal at client-build time;
    /// never retried and never folded into a `GatewayResponse`.
    #[error("Incorrectly configured payment gateway: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
