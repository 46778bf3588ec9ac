//! Error types for identifier discovery

use std::fmt;

use xrd::XrdError;

/// Failure of a single discovery method.
///
/// `Transient` and `Permanent` failures move the lookup on to the next
/// method. `Forbidden` (an HTTP 403 from any fetch) aborts the whole lookup.
#[derive(Debug)]
pub enum DiscoveryError {
    Transient(String),
    Permanent(String),
    Forbidden(String),
    MalformedDescriptor(XrdError),
}

impl DiscoveryError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, DiscoveryError::Forbidden(_))
    }
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::Transient(msg) => write!(f, "Transient discovery failure: {}", msg),
            DiscoveryError::Permanent(msg) => write!(f, "Discovery failure: {}", msg),
            DiscoveryError::Forbidden(msg) => write!(f, "Discovery refused: {}", msg),
            DiscoveryError::MalformedDescriptor(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiscoveryError::MalformedDescriptor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<XrdError> for DiscoveryError {
    fn from(err: XrdError) -> Self {
        DiscoveryError::MalformedDescriptor(err)
    }
}

/// Failure of a whole `lookup`
#[derive(Debug)]
pub enum LookupError {
    MalformedIdentifier(String),
    Aborted { identifier: String, reason: String },
    Failed { identifier: String },
    Cancelled { identifier: String },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::MalformedIdentifier(raw) => {
                write!(f, "Malformed identifier: {:?}", raw)
            }
            LookupError::Aborted { identifier, reason } => {
                write!(f, "Discovery aborted for {}: {}", identifier, reason)
            }
            LookupError::Failed { identifier } => {
                write!(f, "Unable to find services for {}", identifier)
            }
            LookupError::Cancelled { identifier } => {
                write!(f, "Discovery cancelled for {}", identifier)
            }
        }
    }
}

impl std::error::Error for LookupError {}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
