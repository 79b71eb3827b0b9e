//! Creation of quality gate conditions.
//!
//! Every condition goes through the same checks before it reaches storage:
//! the metric must exist and be usable in a gate, the operator must fit the
//! metric type, thresholds must parse, and a gate may hold at most one
//! condition per metric and period.

use qualitygate_storage::{
    Condition, ConditionDao, Metric, MetricDao, MetricType, NewCondition, Operator, Session,
};

use super::rating::Rating;
use crate::error::ConditionError;

/// Key of the metric holding the gate status itself.
const ALERT_STATUS_KEY: &str = "alert_status";

/// Prefix of metrics computed on the leak period.
const NEW_METRIC_PREFIX: &str = "new_";

/// The only period a condition can refer to.
const ALLOWED_PERIOD: i32 = 1;

const ALL_OPERATORS: &[Operator] = &[
    Operator::GreaterThan,
    Operator::LessThan,
    Operator::Equals,
    Operator::NotEquals,
];

/// Operators a condition on a metric of `value_type` may use.
///
/// Ratings only degrade upwards, so the only meaningful check is "worse than".
#[must_use]
pub fn allowed_operators(value_type: MetricType) -> &'static [Operator] {
    match value_type {
        MetricType::Rating => &[Operator::GreaterThan],
        _ => ALL_OPERATORS,
    }
}

/// Validates and creates gate conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionsUpdater;

impl ConditionsUpdater {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Creates a condition on `gate_id` for the metric registered as `metric_key`.
    ///
    /// Blank thresholds count as absent and are stored as `NULL`.
    ///
    /// # Errors
    ///
    /// - `MetricNotFound` if no metric has the key
    /// - `InvalidCondition` listing every rule the condition breaks
    /// - `AlreadyExists` if the gate has a condition on the same metric and period
    /// - `Storage` if the gate does not exist or the backend fails
    #[allow(clippy::too_many_arguments)]
    pub async fn create_condition(
        &self,
        session: &mut dyn Session,
        gate_id: i64,
        metric_key: &str,
        operator: Operator,
        warning_threshold: Option<&str>,
        error_threshold: Option<&str>,
        period: Option<i32>,
    ) -> Result<Condition, ConditionError> {
        let metric = session
            .select_metric_by_key(metric_key)
            .await?
            .ok_or_else(|| ConditionError::MetricNotFound(metric_key.to_string()))?;

        let warning_threshold = non_blank(warning_threshold);
        let error_threshold = non_blank(error_threshold);

        let mut errors = Vec::new();
        validate_metric(&metric, &mut errors);
        check_operator(&metric, operator, &mut errors);
        check_thresholds(&metric, warning_threshold, error_threshold, &mut errors);
        check_period(&metric, period, &mut errors);
        check_rating(&metric, operator, warning_threshold, error_threshold, &mut errors);
        if !errors.is_empty() {
            return Err(ConditionError::InvalidCondition(errors.join(", ")));
        }

        let existing = session.select_conditions_for_gate(gate_id).await?;
        if existing
            .iter()
            .any(|c| c.metric_id == metric.id && c.period == period)
        {
            return Err(ConditionError::AlreadyExists {
                metric_key: metric.key,
            });
        }

        let condition = session
            .insert_condition(&NewCondition {
                gate_id,
                metric_id: metric.id,
                operator,
                warning_threshold: warning_threshold.map(str::to_string),
                error_threshold: error_threshold.map(str::to_string),
                period,
            })
            .await?;

        tracing::debug!(
            gate_id,
            metric = %metric.key,
            operator = %operator,
            condition_id = condition.id,
            "Condition created"
        );

        Ok(condition)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_metric(metric: &Metric, errors: &mut Vec<String>) {
    let unusable_type = matches!(
        metric.value_type,
        MetricType::Data | MetricType::Distrib | MetricType::String | MetricType::Bool
    );
    if metric.hidden || unusable_type || metric.key == ALERT_STATUS_KEY {
        errors.push(format!(
            "Metric '{}' cannot be used to define a condition.",
            metric.key
        ));
    }
}

fn check_operator(metric: &Metric, operator: Operator, errors: &mut Vec<String>) {
    if !allowed_operators(metric.value_type).contains(&operator) {
        errors.push(format!(
            "Operator {} is not allowed for metric type {}.",
            operator, metric.value_type
        ));
    }
}

fn check_thresholds(
    metric: &Metric,
    warning_threshold: Option<&str>,
    error_threshold: Option<&str>,
    errors: &mut Vec<String>,
) {
    if warning_threshold.is_none() && error_threshold.is_none() {
        errors.push("At least one threshold (warning, error) must be set.".into());
        return;
    }
    for value in [warning_threshold, error_threshold].into_iter().flatten() {
        if !threshold_parses(metric.value_type, value) {
            errors.push(format!(
                "Invalid value '{}' for metric '{}'",
                value, metric.key
            ));
        }
    }
}

fn threshold_parses(value_type: MetricType, value: &str) -> bool {
    let value = value.trim();
    match value_type {
        MetricType::Int | MetricType::Millisec | MetricType::WorkDur => {
            value.parse::<i64>().is_ok()
        }
        MetricType::Float | MetricType::Percent => value.parse::<f64>().is_ok(),
        MetricType::Rating => Rating::from_threshold(value).is_some(),
        MetricType::Level => matches!(value, "OK" | "WARN" | "ERROR"),
        // Rejected by validate_metric.
        MetricType::Bool | MetricType::String | MetricType::Data | MetricType::Distrib => true,
    }
}

fn check_period(metric: &Metric, period: Option<i32>, errors: &mut Vec<String>) {
    match period {
        None if metric.key.starts_with(NEW_METRIC_PREFIX) => {
            errors.push("A period must be selected for differential metrics.".into());
        }
        Some(p) if p != ALLOWED_PERIOD => {
            errors.push(format!("The only allowed period is {ALLOWED_PERIOD}"));
        }
        _ => {}
    }
}

fn check_rating(
    metric: &Metric,
    operator: Operator,
    warning_threshold: Option<&str>,
    error_threshold: Option<&str>,
    errors: &mut Vec<String>,
) {
    if metric.value_type != MetricType::Rating || operator != Operator::GreaterThan {
        return;
    }
    let worst = [warning_threshold, error_threshold]
        .into_iter()
        .flatten()
        .any(|v| Rating::from_threshold(v) == Some(Rating::WORST));
    if worst {
        errors.push(format!(
            "There's no worse rating than {} ({})",
            Rating::WORST,
            Rating::WORST.index()
        ));
    }
}
