//! Orchestrator: coordinates the record store and the plan generator.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use spotplan_core::{Error, Result, Spot, SpotDraft};
use spotplan_planner::PlanGenerator;
use spotplan_store::SqliteStore;

use crate::types::*;

/// Stateless coordinator for spot requests. The store is the only shared state.
pub struct Orchestrator {
    store: Arc<SqliteStore>,
    planner: Arc<dyn PlanGenerator>,
}

impl Orchestrator {
    pub fn new(store: Arc<SqliteStore>, planner: Arc<dyn PlanGenerator>) -> Self {
        Self { store, planner }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Create a spot, then try to attach a plan.
    ///
    /// The store write finishes before the first await point, so dropping
    /// this future can only abandon the plan request, never the write.
    pub async fn create(&self, payload: Value) -> Result<SpotCreated> {
        debug!(stage = ?CreateStage::Received, "create spot");
        let draft = SpotDraft::from_json(&payload)?;
        debug!(stage = ?CreateStage::Validated, name = %draft.name);

        let spot = self.store.create(&draft)?;
        debug!(stage = ?CreateStage::Persisted, spot_id = %spot.id);

        // The generator sees exactly what the client submitted.
        debug!(stage = ?CreateStage::PlanRequested, spot_id = %spot.id);
        let (itinerary, plan_status) = match self.planner.generate(&payload).await {
            Ok(plan) => {
                debug!(stage = ?CreateStage::PlanAttached, spot_id = %spot.id);
                (plan.into_text(), PlanStatus::Attached)
            }
            Err(reason) => {
                warn!(
                    stage = ?CreateStage::PlanSkipped,
                    spot_id = %spot.id,
                    "No plan for new spot: {}",
                    reason
                );
                (String::new(), PlanStatus::Skipped(reason))
            }
        };

        info!(
            stage = ?CreateStage::Responded,
            spot_id = %spot.id,
            "Created spot {} in {}",
            spot.fields.name,
            spot.fields.city
        );
        Ok(SpotCreated {
            spot,
            itinerary,
            plan_status,
        })
    }

    /// Replace a spot's fields. No plan is requested on update.
    pub fn update(&self, id: &str, payload: &Value) -> Result<Spot> {
        let draft = SpotDraft::from_json(payload)?;
        let spot = self.store.update(id, &draft)?;
        info!("Updated spot {}", id);
        Ok(spot)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id)?;
        info!("Deleted spot {}", id);
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Spot>> {
        self.store.list()
    }

    pub fn get(&self, id: &str) -> Result<Spot> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::spot_not_found(id))
    }

    /// Store every valid element of a JSON array; report the rest.
    ///
    /// Elements are validated independently. Valid ones are inserted in a
    /// single transaction, so a storage failure stores none of them.
    pub fn bulk_create(&self, payload: &Value) -> Result<BulkReport> {
        let Value::Array(items) = payload else {
            return Err(Error::Validation("bulk payload must be a JSON array".into()));
        };

        let mut drafts = Vec::with_capacity(items.len());
        let mut rejected = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match SpotDraft::from_json(item) {
                Ok(draft) => drafts.push(draft),
                Err(e) => rejected.push(BulkRejection {
                    index,
                    error: e.to_string(),
                }),
            }
        }

        let inserted = self.store.bulk_create(&drafts)?;
        if rejected.is_empty() {
            info!("Bulk insert: {} spots", inserted);
        } else {
            warn!(
                "Bulk insert: {} spots stored, {} rejected",
                inserted,
                rejected.len()
            );
        }
        Ok(BulkReport { inserted, rejected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use spotplan_planner::{Plan, PlanUnavailable};
    use tempfile::TempDir;

    /// Always returns the same plan and records every request.
    struct FixedPlan {
        text: String,
        calls: Mutex<Vec<Value>>,
    }

    impl FixedPlan {
        fn new(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: text.to_string(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Value> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PlanGenerator for FixedPlan {
        async fn generate(&self, attributes: &Value) -> std::result::Result<Plan, PlanUnavailable> {
            self.calls.lock().unwrap().push(attributes.clone());
            Ok(Plan::new(self.text.clone()))
        }
    }

    struct Unavailable(PlanUnavailable);

    #[async_trait]
    impl PlanGenerator for Unavailable {
        async fn generate(&self, _: &Value) -> std::result::Result<Plan, PlanUnavailable> {
            Err(self.0.clone())
        }
    }

    /// Never answers.
    struct Hanging;

    #[async_trait]
    impl PlanGenerator for Hanging {
        async fn generate(&self, _: &Value) -> std::result::Result<Plan, PlanUnavailable> {
            std::future::pending().await
        }
    }

    /// Reads the store while "generating", which would deadlock if the
    /// orchestrator still held the store lock.
    struct CountingStore(Arc<SqliteStore>);

    #[async_trait]
    impl PlanGenerator for CountingStore {
        async fn generate(&self, _: &Value) -> std::result::Result<Plan, PlanUnavailable> {
            let count = self.0.count().map_err(|e| PlanUnavailable::Network(e.to_string()))?;
            Ok(Plan::new(format!("{} spots known", count)))
        }
    }

    fn test_store() -> (Arc<SqliteStore>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::open(dir.path()).unwrap());
        (store, dir)
    }

    fn red_fort() -> Value {
        json!({
            "name": "Red Fort",
            "city": "Delhi",
            "type": "Heritage",
            "recommendedTimeHours": 2,
            "email": "a@b.com"
        })
    }

    #[tokio::test]
    async fn test_create_attaches_plan_verbatim() {
        let (store, _dir) = test_store();
        let planner = FixedPlan::new("Day 1:\n  Red Fort at 09:00 ");
        let orch = Orchestrator::new(store.clone(), planner.clone());

        let created = orch.create(red_fort()).await.unwrap();
        assert_eq!(created.itinerary, "Day 1:\n  Red Fort at 09:00 ");
        assert_eq!(created.plan_status, PlanStatus::Attached);
        assert!(!created.spot.id.is_empty());
        assert_eq!(created.spot.fields.name, "Red Fort");

        let stored = store.get(&created.spot.id).unwrap().unwrap();
        assert_eq!(stored, created.spot);
    }

    #[tokio::test]
    async fn test_generator_receives_original_payload() {
        let (store, _dir) = test_store();
        let planner = FixedPlan::new("plan");
        let orch = Orchestrator::new(store, planner.clone());

        let mut payload = red_fort();
        payload["startTime"] = json!("");
        payload["clientHint"] = json!("weekend");
        orch.create(payload.clone()).await.unwrap();

        assert_eq!(planner.calls(), vec![payload]);
    }

    #[tokio::test]
    async fn test_create_survives_unavailable_plan() {
        for reason in [
            PlanUnavailable::Timeout,
            PlanUnavailable::NotConfigured,
            PlanUnavailable::Status(502),
            PlanUnavailable::Network("connection refused".into()),
            PlanUnavailable::MalformedBody("missing `plan` field".into()),
        ] {
            let (store, _dir) = test_store();
            let orch = Orchestrator::new(store.clone(), Arc::new(Unavailable(reason.clone())));

            let created = orch.create(red_fort()).await.unwrap();
            assert_eq!(created.itinerary, "");
            assert_eq!(created.plan_status, PlanStatus::Skipped(reason));
            assert!(store.get(&created.spot.id).unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_invalid_create_persists_nothing() {
        let (store, _dir) = test_store();
        let planner = FixedPlan::new("plan");
        let orch = Orchestrator::new(store.clone(), planner.clone());

        let mut payload = red_fort();
        payload["type"] = json!("Museum");
        let result = orch.create(payload).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(store.count().unwrap(), 0);
        assert!(planner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_skips_plan() {
        let (store, dir) = test_store();
        let planner = FixedPlan::new("plan");
        let orch = Orchestrator::new(store, planner.clone());

        let conn = rusqlite::Connection::open(dir.path().join("spots.db")).unwrap();
        conn.execute_batch("DROP TABLE spots;").unwrap();

        let result = orch.create(red_fort()).await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(planner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_create_keeps_spot() {
        let (store, _dir) = test_store();
        let orch = Orchestrator::new(store.clone(), Arc::new(Hanging));

        let outcome = tokio::time::timeout(Duration::from_millis(100), orch.create(red_fort())).await;
        assert!(outcome.is_err());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_unlocked_during_plan_request() {
        let (store, _dir) = test_store();
        let orch = Orchestrator::new(store.clone(), Arc::new(CountingStore(store.clone())));

        let created = orch.create(red_fort()).await.unwrap();
        assert_eq!(created.itinerary, "1 spots known");
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_unique_ids() {
        let (store, _dir) = test_store();
        let orch = Orchestrator::new(store.clone(), FixedPlan::new("plan"));

        let results = futures::future::join_all((0..10).map(|i| {
            let mut payload = red_fort();
            payload["name"] = json!(format!("Spot {}", i));
            orch.create(payload)
        }))
        .await;

        let mut ids: Vec<String> = results.into_iter().map(|r| r.unwrap().spot.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
        assert_eq!(store.count().unwrap(), 10);
    }

    #[tokio::test]
    async fn test_update_replaces_without_plan() {
        let (store, _dir) = test_store();
        let planner = FixedPlan::new("plan");
        let orch = Orchestrator::new(store, planner.clone());

        let mut original = red_fort();
        original["description"] = json!("Mughal fort");
        original["tags"] = json!(["unesco"]);
        original["location"] = json!({"lat": 28.6562, "lng": 77.241});
        let created = orch.create(original).await.unwrap();

        let replacement = json!({
            "name": "Lal Qila",
            "city": "New Delhi",
            "type": "cultural",
            "recommendedTimeHours": 1.5,
            "email": "b@c.org"
        });
        let updated = orch.update(&created.spot.id, &replacement).unwrap();
        assert_eq!(updated.id, created.spot.id);
        assert_eq!(updated.fields, SpotDraft::from_json(&replacement).unwrap());
        assert!(updated.fields.description.is_none());
        assert!(updated.fields.tags.is_empty());
        assert!(updated.fields.location.is_none());

        assert_eq!(orch.get(&created.spot.id).unwrap().fields, updated.fields);
        assert_eq!(planner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let (store, _dir) = test_store();
        let orch = Orchestrator::new(store, FixedPlan::new("plan"));

        assert!(matches!(
            orch.update("missing", &red_fort()),
            Err(Error::NotFound(_))
        ));

        let created = orch.create(red_fort()).await.unwrap();
        let result = orch.update(&created.spot.id, &json!({"name": "Only a name"}));
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(orch.get(&created.spot.id).unwrap(), created.spot);
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, _dir) = test_store();
        let orch = Orchestrator::new(store.clone(), FixedPlan::new("plan"));
        let created = orch.create(red_fort()).await.unwrap();

        assert!(matches!(orch.delete("missing"), Err(Error::NotFound(_))));
        assert_eq!(store.count().unwrap(), 1);

        orch.delete(&created.spot.id).unwrap();
        assert!(matches!(orch.get(&created.spot.id), Err(Error::NotFound(_))));
        assert!(orch.list().unwrap().is_empty());
    }

    #[test]
    fn test_bulk_create_rejects_only_bad_elements() {
        let (store, _dir) = test_store();
        let planner = FixedPlan::new("plan");
        let orch = Orchestrator::new(store.clone(), planner.clone());

        let batch = json!([
            red_fort(),
            {"name": "Nameless City", "type": "Heritage", "recommendedTimeHours": 1, "email": "a@b.com"},
            {"name": "Gateway of India", "city": "Mumbai", "type": "heritage", "recommendedTime": 1, "email": "m@b.com"},
            "not a spot"
        ]);

        let report = orch.bulk_create(&batch).unwrap();
        assert_eq!(report.inserted, 2);
        let indexes: Vec<usize> = report.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![1, 3]);
        assert!(report.rejected[0].error.contains("city"));
        assert_eq!(store.count().unwrap(), 2);
        assert!(planner.calls().is_empty());

        // Same batch, same split.
        let again = orch.bulk_create(&batch).unwrap();
        assert_eq!(again.inserted, 2);
        assert_eq!(again.rejected, report.rejected);
    }

    #[test]
    fn test_bulk_create_requires_array() {
        let (store, _dir) = test_store();
        let orch = Orchestrator::new(store.clone(), FixedPlan::new("plan"));

        assert!(matches!(
            orch.bulk_create(&red_fort()),
            Err(Error::Validation(_))
        ));
        assert_eq!(store.count().unwrap(), 0);

        let report = orch.bulk_create(&json!([])).unwrap();
        assert_eq!(report.inserted, 0);
        assert!(report.rejected.is_empty());
    }
}
