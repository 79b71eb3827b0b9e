use qualitygate_storage::{GateDao, PropertyDao, QualityGate, Session, StorageError};

/// Global property holding the id of the default quality gate.
pub const DEFAULT_GATE_PROPERTY: &str = "sonar.qualitygate";

/// Access to the default quality gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityGates;

impl QualityGates {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the id stored in the default gate property, if any.
    ///
    /// A value that is not an id is logged and treated as unset.
    pub async fn default_gate_id(
        &self,
        session: &mut dyn Session,
    ) -> Result<Option<i64>, StorageError> {
        let Some(value) = session.select_property(DEFAULT_GATE_PROPERTY).await? else {
            return Ok(None);
        };
        match value.trim().parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                tracing::warn!(
                    property = DEFAULT_GATE_PROPERTY,
                    value = %value,
                    "Default quality gate property is not an id, ignoring"
                );
                Ok(None)
            }
        }
    }

    /// Returns the default gate.
    ///
    /// `None` when the property is unset or points to a gate that no longer
    /// exists.
    pub async fn default_gate(
        &self,
        session: &mut dyn Session,
    ) -> Result<Option<QualityGate>, StorageError> {
        let Some(id) = self.default_gate_id(session).await? else {
            return Ok(None);
        };
        let gates = session.select_all_gates().await?;
        Ok(gates.into_iter().find(|gate| gate.id == id))
    }

    /// Makes `gate_id` the default gate.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the gate does not exist.
    pub async fn set_default(
        &self,
        session: &mut dyn Session,
        gate_id: i64,
    ) -> Result<(), StorageError> {
        let exists = session
            .select_all_gates()
            .await?
            .iter()
            .any(|gate| gate.id == gate_id);
        if !exists {
            return Err(StorageError::not_found("QualityGate", gate_id));
        }

        session
            .set_property(DEFAULT_GATE_PROPERTY, &gate_id.to_string())
            .await?;
        tracing::info!(gate_id, "Default quality gate set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qualitygate_db_memory::InMemoryGateStore;
    use qualitygate_storage::prelude::*;

    #[tokio::test]
    async fn test_no_default_on_empty_store() {
        let store = InMemoryGateStore::new();
        let mut session = store.begin().await.unwrap();
        let gates = QualityGates::new();

        assert_eq!(gates.default_gate_id(session.as_mut()).await.unwrap(), None);
        assert!(gates.default_gate(session.as_mut()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_default() {
        let store = InMemoryGateStore::new();
        let mut session = store.begin().await.unwrap();
        let gates = QualityGates::new();
        let gate = session
            .insert_gate(&NewQualityGate::built_in("Sonar way"))
            .await
            .unwrap();

        gates.set_default(session.as_mut(), gate.id).await.unwrap();

        assert_eq!(
            session
                .select_property(DEFAULT_GATE_PROPERTY)
                .await
                .unwrap()
                .as_deref(),
            Some(gate.id.to_string().as_str())
        );
        let default = gates.default_gate(session.as_mut()).await.unwrap();
        assert_eq!(default.map(|g| g.id), Some(gate.id));
    }

    #[tokio::test]
    async fn test_set_default_to_missing_gate() {
        let store = InMemoryGateStore::new();
        let mut session = store.begin().await.unwrap();
        let err = QualityGates::new()
            .set_default(session.as_mut(), 42)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_dangling_or_garbage_property_means_no_default() {
        let store = InMemoryGateStore::new();
        let mut session = store.begin().await.unwrap();
        let gates = QualityGates::new();

        session
            .set_property(DEFAULT_GATE_PROPERTY, "17")
            .await
            .unwrap();
        assert_eq!(
            gates.default_gate_id(session.as_mut()).await.unwrap(),
            Some(17)
        );
        assert!(gates.default_gate(session.as_mut()).await.unwrap().is_none());

        session
            .set_property(DEFAULT_GATE_PROPERTY, "Sonar way")
            .await
            .unwrap();
        assert_eq!(gates.default_gate_id(session.as_mut()).await.unwrap(), None);
    }
}
