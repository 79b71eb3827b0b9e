//! Records persisted by the quality gate storage backends.
//!
//! Rows returned by a backend always carry their storage-assigned `id`.
//! The `New*` forms are what callers hand to the insert operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::StorageError;

// ==================== Quality gates ====================

/// A quality gate as stored in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityGate {
    /// Storage-assigned identifier.
    pub id: i64,
    /// Display name. Used as the lookup key for built-in gates.
    pub name: String,
    /// Whether this gate is provided by the system rather than a user.
    pub built_in: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Insert form of a [`QualityGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQualityGate {
    pub name: String,
    pub built_in: bool,
}

impl NewQualityGate {
    /// Creates a user-defined gate.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            built_in: false,
        }
    }

    /// Creates a gate flagged as built-in.
    #[must_use]
    pub fn built_in(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            built_in: true,
        }
    }
}

// ==================== Conditions ====================

/// Comparison operator of a gate condition.
///
/// A condition fails when `measure <operator> threshold` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "GT")]
    GreaterThan,
    #[serde(rename = "LT")]
    LessThan,
    #[serde(rename = "EQ")]
    Equals,
    #[serde(rename = "NE")]
    NotEquals,
}

impl Operator {
    /// Returns the code stored in the `operator` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => "GT",
            Self::LessThan => "LT",
            Self::Equals => "EQ",
            Self::NotEquals => "NE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GT" => Ok(Self::GreaterThan),
            "LT" => Ok(Self::LessThan),
            "EQ" => Ok(Self::Equals),
            "NE" => Ok(Self::NotEquals),
            other => Err(StorageError::invalid_data(format!(
                "Unknown condition operator '{other}'"
            ))),
        }
    }
}

/// A threshold condition owned by a quality gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    /// Owning gate.
    pub gate_id: i64,
    /// Internal id of the measured metric. May dangle if the metric was removed.
    pub metric_id: i64,
    /// `None` when the stored code is not a known operator.
    pub operator: Option<Operator>,
    pub warning_threshold: Option<String>,
    pub error_threshold: Option<String>,
    /// Period index, `None` for conditions on absolute values.
    pub period: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Insert form of a [`Condition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCondition {
    pub gate_id: i64,
    pub metric_id: i64,
    pub operator: Operator,
    pub warning_threshold: Option<String>,
    pub error_threshold: Option<String>,
    pub period: Option<i32>,
}

// ==================== Metrics ====================

/// Value type of a metric, as stored in the `val_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    Int,
    Float,
    Percent,
    Bool,
    String,
    Millisec,
    Data,
    Level,
    Distrib,
    Rating,
    WorkDur,
}

impl MetricType {
    /// Returns the code stored in the `val_type` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Percent => "PERCENT",
            Self::Bool => "BOOL",
            Self::String => "STRING",
            Self::Millisec => "MILLISEC",
            Self::Data => "DATA",
            Self::Level => "LEVEL",
            Self::Distrib => "DISTRIB",
            Self::Rating => "RATING",
            Self::WorkDur => "WORK_DUR",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "INT" => Self::Int,
            "FLOAT" => Self::Float,
            "PERCENT" => Self::Percent,
            "BOOL" => Self::Bool,
            "STRING" => Self::String,
            "MILLISEC" => Self::Millisec,
            "DATA" => Self::Data,
            "LEVEL" => Self::Level,
            "DISTRIB" => Self::Distrib,
            "RATING" => Self::Rating,
            "WORK_DUR" => Self::WorkDur,
            other => {
                return Err(StorageError::invalid_data(format!(
                    "Unknown metric value type '{other}'"
                )));
            }
        })
    }
}

/// A metric definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub id: i64,
    /// Human-readable unique key, e.g. `new_coverage`.
    pub key: String,
    pub short_name: String,
    pub value_type: MetricType,
    pub domain: Option<String>,
    /// Hidden metrics are internal and never exposed to users.
    pub hidden: bool,
    pub enabled: bool,
}

/// Insert form of a [`Metric`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMetric {
    pub key: String,
    pub short_name: String,
    pub value_type: MetricType,
    pub domain: Option<String>,
    pub hidden: bool,
}

impl NewMetric {
    /// Creates a visible metric in the given domain.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        short_name: impl Into<String>,
        value_type: MetricType,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            short_name: short_name.into(),
            value_type,
            domain: Some(domain.into()),
            hidden: false,
        }
    }

    /// Marks the metric as hidden.
    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_codes() {
        for op in [
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::Equals,
            Operator::NotEquals,
        ] {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
        assert!("GTE".parse::<Operator>().is_err());
    }

    #[test]
    fn test_operator_serde_uses_codes() {
        let json = serde_json::to_string(&Operator::LessThan).unwrap();
        assert_eq!(json, "\"LT\"");
    }

    #[test]
    fn test_metric_type_codes() {
        assert_eq!("WORK_DUR".parse::<MetricType>().unwrap(), MetricType::WorkDur);
        assert_eq!(MetricType::Rating.to_string(), "RATING");
        let err = "NUMBER".parse::<MetricType>().unwrap_err();
        assert!(err.to_string().contains("NUMBER"));
    }

    #[test]
    fn test_metric_type_serde_matches_column_codes() {
        let json = serde_json::to_string(&MetricType::WorkDur).unwrap();
        assert_eq!(json, "\"WORK_DUR\"");
    }

    #[test]
    fn test_new_quality_gate_constructors() {
        assert!(NewQualityGate::built_in("Sonar way").built_in);
        assert!(!NewQualityGate::new("Custom").built_in);
    }
}
