use thiserror::Error;

/// Failures reported by the encoders. Every check happens before the first
/// event is emitted, so a handler never sees a partial symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The message violates the character set, length or checksum rules of
    /// the symbology.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The encoded message does not fit in any symbol allowed by the
    /// configuration.
    #[error("message too large for the selected symbol")]
    CapacityExceeded,
    /// The symbology does not support the requested operation.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// A symbology name could not be resolved.
    #[error("No known barcode configuration element found")]
    UnknownSymbology,
}

impl Error {
    pub(crate) fn message(msg: impl Into<String>) -> Self {
        Self::InvalidMessage(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_display() {
        assert_eq!(Error::UnknownSymbology.to_string(), "No known barcode configuration element found");
        assert_eq!(Error::message("'*' is reserved").to_string(), "invalid message: '*' is reserved");
    }
}
