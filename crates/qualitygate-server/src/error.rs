//! Error types for the quality gate services and the startup lifecycle.

use qualitygate_storage::StorageError;

/// Error type for condition creation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    /// No metric is registered under the key.
    #[error("There is no metric with key={0}")]
    MetricNotFound(String),

    /// The condition breaks a rule of its metric (type, operator, thresholds, period).
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// The gate already has a condition on the same metric and period.
    #[error("Condition on metric '{metric_key}' already exists")]
    AlreadyExists { metric_key: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Error type for the startup lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to create built-in condition: {0}")]
    Condition(#[from] ConditionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_error_display() {
        let err = ConditionError::MetricNotFound("new_coverage".into());
        assert_eq!(err.to_string(), "There is no metric with key=new_coverage");

        let err = ConditionError::InvalidCondition("Operator LT is not allowed".into());
        assert_eq!(err.to_string(), "Invalid condition: Operator LT is not allowed");
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: ConditionError = StorageError::internal("boom").into();
        assert!(matches!(err, ConditionError::Storage(_)));
        assert_eq!(err.to_string(), StorageError::internal("boom").to_string());
    }

    #[test]
    fn test_startup_error_wraps_condition_error() {
        let err: StartupError = ConditionError::MetricNotFound("new_coverage".into()).into();
        assert!(matches!(err, StartupError::Condition(_)));
        assert!(err.to_string().contains("new_coverage"));
    }
}
