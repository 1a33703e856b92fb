use thiserror::Error;
use uuid::Uuid;

pub type RewardsResult<T> = Result<T, RewardsError>;

#[derive(Error, Debug)]
pub enum RewardsError {
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("No items are included in the calculation")]
    NoIncludedItems,

    #[error("No tiers have been generated")]
    NoTiers,

    #[error("Tier {0} not found")]
    TierNotFound(u8),

    #[error("Item {0} not found")]
    ItemNotFound(Uuid),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RewardsError {
    /// Whether the session can carry on with its previous state intact.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RewardsError::Io(_) | RewardsError::Internal(_))
    }

    /// Empty preconditions are reported to the user as notices, not failures.
    pub fn is_empty_precondition(&self) -> bool {
        matches!(self, RewardsError::NoIncludedItems | RewardsError::NoTiers)
    }
}

impl From<config::ConfigError> for RewardsError {
    fn from(err: config::ConfigError) -> Self {
        RewardsError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_preconditions_are_recoverable() {
        assert!(RewardsError::NoIncludedItems.is_recoverable());
        assert!(RewardsError::NoTiers.is_empty_precondition());
        assert!(!RewardsError::TierNotFound(3).is_empty_precondition());
    }

    #[test]
    fn test_io_is_not_recoverable() {
        let err: RewardsError = std::io::Error::other("disk gone").into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_invalid_configuration_message() {
        let err = RewardsError::InvalidConfiguration {
            field: "payback_rate",
            reason: "must be greater than 0".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: payback_rate must be greater than 0"
        );
    }
}
