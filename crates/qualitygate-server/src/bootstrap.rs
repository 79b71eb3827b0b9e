//! Bootstrap module for registering the core metric catalog.
//!
//! The catalog is compiled into the binary. Registration inserts whatever is
//! missing by key and leaves existing metrics untouched, so it is safe to run
//! on every startup.

use qualitygate_storage::{MetricDao, MetricType, NewMetric, Session, StorageError};
use tracing::{debug, info};

/// A metric definition shipped with the server.
#[derive(Debug, Clone, Copy)]
pub struct CoreMetric {
    pub key: &'static str,
    pub short_name: &'static str,
    pub value_type: MetricType,
    pub domain: &'static str,
    pub hidden: bool,
}

impl CoreMetric {
    const fn visible(
        key: &'static str,
        short_name: &'static str,
        value_type: MetricType,
        domain: &'static str,
    ) -> Self {
        Self {
            key,
            short_name,
            value_type,
            domain,
            hidden: false,
        }
    }

    fn to_new_metric(self) -> NewMetric {
        NewMetric::new(self.key, self.short_name, self.value_type, self.domain)
            .with_hidden(self.hidden)
    }
}

/// Core metrics referenced by the built-in quality gate, plus the ones a
/// gate must never use.
pub const CORE_METRICS: &[CoreMetric] = &[
    CoreMetric::visible(
        "new_security_rating",
        "Security Rating on New Code",
        MetricType::Rating,
        "Security",
    ),
    CoreMetric::visible(
        "new_reliability_rating",
        "Reliability Rating on New Code",
        MetricType::Rating,
        "Reliability",
    ),
    CoreMetric::visible(
        "new_maintainability_rating",
        "Maintainability Rating on New Code",
        MetricType::Rating,
        "Maintainability",
    ),
    CoreMetric::visible(
        "new_coverage",
        "Coverage on New Code",
        MetricType::Percent,
        "Coverage",
    ),
    CoreMetric::visible(
        "new_duplicated_lines_density",
        "Duplicated Lines on New Code (%)",
        MetricType::Percent,
        "Duplications",
    ),
    CoreMetric::visible(
        "new_security_remediation_effort",
        "Security Remediation Effort on New Code",
        MetricType::WorkDur,
        "Security",
    ),
    CoreMetric::visible("coverage", "Coverage", MetricType::Percent, "Coverage"),
    CoreMetric::visible(
        "duplicated_lines_density",
        "Duplicated Lines (%)",
        MetricType::Percent,
        "Duplications",
    ),
    CoreMetric::visible(
        "alert_status",
        "Quality Gate Status",
        MetricType::Level,
        "Releasability",
    ),
    CoreMetric {
        key: "ncloc_data",
        short_name: "ncloc_data",
        value_type: MetricType::Data,
        domain: "Size",
        hidden: true,
    },
];

/// Registers every catalog metric that is not in storage yet.
///
/// Runs inside the caller's session; nothing is committed here.
///
/// # Errors
///
/// Returns an error if a storage operation fails.
pub async fn register_metrics(session: &mut dyn Session) -> Result<BootstrapStats, StorageError> {
    info!(
        catalog_size = CORE_METRICS.len(),
        "Registering core metrics"
    );

    let mut stats = BootstrapStats::default();

    for metric in CORE_METRICS {
        if session.select_metric_by_key(metric.key).await?.is_some() {
            stats.existing += 1;
            continue;
        }
        let inserted = session.insert_metric(&metric.to_new_metric()).await?;
        debug!(key = %inserted.key, id = inserted.id, "Registered metric");
        stats.inserted += 1;
    }

    info!(
        inserted = stats.inserted,
        existing = stats.existing,
        total = stats.total(),
        "Core metric registration completed"
    );

    Ok(stats)
}

/// Statistics about the bootstrap operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapStats {
    pub inserted: usize,
    pub existing: usize,
}

impl BootstrapStats {
    /// Returns the number of catalog entries processed.
    pub fn total(&self) -> usize {
        self.inserted + self.existing
    }
}
