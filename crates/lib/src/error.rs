//! Error types for the messaging operations.

use crate::twilio::GatewayError;

/// Failure of one tool invocation. Always recovered into a failure envelope at the tool boundary.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// One or more required Twilio settings are absent or blank. Lists the setting names only.
    #[error("Missing Twilio credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    /// Tool input rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The remote call failed or its response could not be normalized.
    #[error("{0}")]
    GatewayRequest(#[from] GatewayError),
}
