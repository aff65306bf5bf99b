/// Failure of a call to the score service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Connection or transport failure, or a body that could not be decoded.
    Network(String),
    /// Non-2xx status or `success: false`. Carries the service's `error` text
    /// when it sent one.
    Service {
        status: u16,
        message: Option<String>,
    },
    /// Rejected locally before any request was made.
    Validation(String),
}

impl ClientError {
    /// The service's own error text, if any.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Self::Service { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(m) => write!(f, "network error: {m}"),
            Self::Service {
                status,
                message: Some(m),
            } => write!(f, "service error ({status}): {m}"),
            Self::Service {
                status,
                message: None,
            } => write!(f, "service error ({status})"),
            Self::Validation(m) => write!(f, "{m}"),
        }
    }
}

impl std::error::Error for ClientError {}
