//! Registration of the built-in quality gate.
//!
//! On every startup the gate named [`BUILTIN_QUALITY_GATE`] is created if
//! missing, its conditions are brought in line with
//! [`QUALITY_GATE_CONDITIONS`], and it is made the only built-in gate. All of
//! it happens in one session: either everything is committed or nothing is.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use qualitygate_storage::{
    Condition, ConditionDao, DynGateStore, GateDao, GateStore, MetricDao, NewQualityGate,
    Operator, QualityGate, Session, StorageError,
};
use tracing::info;

use crate::error::StartupError;
use crate::qualitygate::{ConditionsUpdater, QualityGates};

/// Name of the built-in quality gate.
pub const BUILTIN_QUALITY_GATE: &str = "Sonar way";

/// Period the built-in conditions are evaluated on.
pub const LEAK_PERIOD: i32 = 1;

/// Stored value of an A rating.
pub const A_RATING: &str = "1";

/// A condition of the built-in gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltInCondition {
    pub metric_key: &'static str,
    pub operator: Operator,
    pub error_threshold: &'static str,
}

impl BuiltInCondition {
    const fn new(
        metric_key: &'static str,
        operator: Operator,
        error_threshold: &'static str,
    ) -> Self {
        Self {
            metric_key,
            operator,
            error_threshold,
        }
    }

    /// The condition as it should be found in storage.
    pub fn to_gate_condition(&self) -> GateCondition {
        GateCondition {
            id: None,
            metric_key: Some(self.metric_key.to_string()),
            operator: Some(self.operator),
            warning_threshold: None,
            error_threshold: Some(self.error_threshold.to_string()),
            period: Some(LEAK_PERIOD),
        }
    }
}

/// Conditions the built-in gate must own, and nothing else.
pub const QUALITY_GATE_CONDITIONS: [BuiltInCondition; 5] = [
    BuiltInCondition::new("new_security_rating", Operator::GreaterThan, A_RATING),
    BuiltInCondition::new("new_reliability_rating", Operator::GreaterThan, A_RATING),
    BuiltInCondition::new("new_maintainability_rating", Operator::GreaterThan, A_RATING),
    BuiltInCondition::new("new_coverage", Operator::LessThan, "80"),
    BuiltInCondition::new("new_duplicated_lines_density", Operator::GreaterThan, "3"),
];

/// A gate condition compared by value.
///
/// Equality and hashing cover the metric key, period, operator and both
/// thresholds. The id is ignored so stored rows compare equal to the
/// built-in definitions.
#[derive(Debug, Clone)]
pub struct GateCondition {
    pub id: Option<i64>,
    /// `None` when the condition points to a metric that no longer exists.
    pub metric_key: Option<String>,
    /// `None` for a stored operator code that is not recognised.
    pub operator: Option<Operator>,
    pub warning_threshold: Option<String>,
    pub error_threshold: Option<String>,
    pub period: Option<i32>,
}

impl GateCondition {
    pub fn from_condition(condition: &Condition, metric_key: Option<String>) -> Self {
        Self {
            id: Some(condition.id),
            metric_key,
            operator: condition.operator,
            warning_threshold: condition.warning_threshold.clone(),
            error_threshold: condition.error_threshold.clone(),
            period: condition.period,
        }
    }
}

impl PartialEq for GateCondition {
    fn eq(&self, other: &Self) -> bool {
        self.metric_key == other.metric_key
            && self.period == other.period
            && self.operator == other.operator
            && self.warning_threshold == other.warning_threshold
            && self.error_threshold == other.error_threshold
    }
}

impl Eq for GateCondition {}

impl Hash for GateCondition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.metric_key.hash(state);
        self.period.hash(state);
        self.operator.hash(state);
        self.warning_threshold.hash(state);
        self.error_threshold.hash(state);
    }
}

/// Outcome of a registration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterReport {
    pub gate_id: i64,
    pub gate_created: bool,
    pub default_set: bool,
    /// Conditions created
    pub created: usize,
    /// Conditions deleted
    pub deleted: usize,
}

impl RegisterReport {
    /// True when the run found the gate already in its expected state.
    pub fn is_unchanged(&self) -> bool {
        !self.gate_created && !self.default_set && self.created == 0 && self.deleted == 0
    }
}

/// Startup task registering the built-in quality gate.
pub struct RegisterQualityGates {
    store: DynGateStore,
    conditions_updater: ConditionsUpdater,
    quality_gates: QualityGates,
}

impl RegisterQualityGates {
    pub fn new(store: DynGateStore) -> Self {
        Self {
            store,
            conditions_updater: ConditionsUpdater::new(),
            quality_gates: QualityGates::new(),
        }
    }

    /// Runs the registration in a single session.
    ///
    /// # Errors
    ///
    /// Any storage or condition error aborts the run. The session is then
    /// dropped without commit and storage is left as it was.
    pub async fn start(&self) -> Result<RegisterReport, StartupError> {
        let mut session = self.store.begin().await?;

        let existing = session.select_gate_by_name(BUILTIN_QUALITY_GATE).await?;
        let (builtin, gate_created) = match existing {
            Some(gate) => (gate, false),
            None => {
                info!(name = BUILTIN_QUALITY_GATE, "Built-in quality gate created");
                let gate = session
                    .insert_gate(&NewQualityGate::built_in(BUILTIN_QUALITY_GATE))
                    .await?;
                (gate, true)
            }
        };

        let mut default_set = false;
        if gate_created
            && self
                .quality_gates
                .default_gate(session.as_mut())
                .await?
                .is_none()
        {
            self.quality_gates
                .set_default(session.as_mut(), builtin.id)
                .await?;
            default_set = true;
        }

        let (created, deleted) = self
            .update_conditions_if_required(session.as_mut(), &builtin)
            .await?;

        session.ensure_one_built_in_gate(BUILTIN_QUALITY_GATE).await?;

        session.commit().await?;

        let report = RegisterReport {
            gate_id: builtin.id,
            gate_created,
            default_set,
            created,
            deleted,
        };

        info!(
            gate_id = report.gate_id,
            gate_created = report.gate_created,
            default_set = report.default_set,
            created = report.created,
            deleted = report.deleted,
            "Built-in quality gate registered"
        );

        Ok(report)
    }

    /// Deletes conditions that are not built-in, creates the missing ones.
    ///
    /// Returns the numbers of created and deleted conditions.
    async fn update_conditions_if_required(
        &self,
        session: &mut dyn Session,
        builtin: &QualityGate,
    ) -> Result<(usize, usize), StartupError> {
        let current = load_conditions(session, builtin.id).await?;
        let expected: HashSet<GateCondition> = QUALITY_GATE_CONDITIONS
            .iter()
            .map(BuiltInCondition::to_gate_condition)
            .collect();

        // A row equal to one already kept is a duplicate and goes too.
        let mut kept: HashSet<GateCondition> = HashSet::new();
        let mut to_delete: Vec<i64> = Vec::new();
        for (id, condition) in current {
            if expected.contains(&condition) && !kept.contains(&condition) {
                kept.insert(condition);
            } else {
                to_delete.push(id);
            }
        }

        for id in &to_delete {
            session.delete_condition(*id).await?;
        }

        let mut created = 0;
        for condition in &QUALITY_GATE_CONDITIONS {
            if kept.contains(&condition.to_gate_condition()) {
                continue;
            }
            self.conditions_updater
                .create_condition(
                    session,
                    builtin.id,
                    condition.metric_key,
                    condition.operator,
                    None,
                    Some(condition.error_threshold),
                    Some(LEAK_PERIOD),
                )
                .await?;
            created += 1;
        }

        Ok((created, to_delete.len()))
    }
}

/// Loads the gate's conditions keyed by id, with metric ids resolved to keys.
async fn load_conditions(
    session: &mut dyn Session,
    gate_id: i64,
) -> Result<Vec<(i64, GateCondition)>, StorageError> {
    let conditions = session.select_conditions_for_gate(gate_id).await?;

    let mut metric_keys: HashMap<i64, Option<String>> = HashMap::new();
    let mut loaded = Vec::with_capacity(conditions.len());
    for condition in &conditions {
        let key = match metric_keys.get(&condition.metric_id) {
            Some(key) => key.clone(),
            None => {
                let key = session
                    .select_metric_by_id(condition.metric_id)
                    .await?
                    .map(|metric| metric.key);
                metric_keys.insert(condition.metric_id, key.clone());
                key
            }
        };
        loaded.push((condition.id, GateCondition::from_condition(condition, key)));
    }
    Ok(loaded)
}
