use thiserror::Error;

/// Failures a reconciliation step can run into.
///
/// The `Display` text is what the operator ends up reading in the stack
/// event `Reason`, so every variant carries the underlying message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The queried resource, instance, or hosted zone does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The resource exists but the nested attribute has not been populated yet.
    #[error("{0}")]
    AttributeNotReady(String),

    /// The completion report could not be delivered to the callback URL.
    #[error("failed to deliver response: {0}")]
    Transport(String),

    /// Any other provider API failure, surfaced verbatim.
    #[error("{0}")]
    ProviderApi(String),

    #[error("invalid lifecycle event: {0}")]
    InvalidEvent(String),

    #[error("missing required resource property: {0}")]
    MissingProperty(String),

    /// The function's own environment is unusable; the event itself is fine.
    #[error("{0}")]
    Misconfigured(String),
}

impl ReconcileError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn attribute_not_ready(message: impl Into<String>) -> Self {
        Self::AttributeNotReady(message.into())
    }

    pub fn provider_api(message: impl Into<String>) -> Self {
        Self::ProviderApi(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AttributeNotReady(_) => "attribute_not_ready",
            Self::Transport(_) => "transport",
            Self::ProviderApi(_) => "provider_api",
            Self::InvalidEvent(_) => "invalid_event",
            Self::MissingProperty(_) => "missing_property",
            Self::Misconfigured(_) => "misconfigured",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_underlying_message() {
        let error = ReconcileError::not_found("No VPC found with the name headscale");
        assert_eq!(error.to_string(), "No VPC found with the name headscale");

        let error = ReconcileError::MissingProperty("InstanceId".to_string());
        assert!(error.to_string().contains("InstanceId"));

        let error = ReconcileError::Misconfigured("RECONCILER must be configured".to_string());
        assert_eq!(error.to_string(), "RECONCILER must be configured");
        assert_eq!(error.kind(), "misconfigured");
    }

    #[test]
    fn transport_errors_are_prefixed() {
        let error = ReconcileError::transport("connection reset");
        assert_eq!(
            error.to_string(),
            "failed to deliver response: connection reset"
        );
        assert_eq!(error.kind(), "transport");
    }
}
