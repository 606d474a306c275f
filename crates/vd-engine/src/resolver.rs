//! Which kind of controller does an id refer to

use tracing::trace;
use vd_core::{ControllerReference, UniqueId};
use vd_store::{Store, StoreResult};

/// Resolve an opaque unique id to its controller kind and record.
///
/// Candidate kinds are checked in fixed priority order: Conditional,
/// Function, Input, Display, Math, PID, Trigger. The first kind with a
/// record wins and the rest are not checked. Ids are assumed unique
/// across all kinds; that invariant is the surrounding system's to
/// guarantee, and when it is violated the priority order is the defined
/// tie-break. No match resolves to `Ok(None)`, never an error.
pub async fn resolve_controller(
    store: &dyn Store,
    unique_id: &UniqueId,
) -> StoreResult<Option<ControllerReference>> {
    if let Some(record) = store.conditional(unique_id).await? {
        trace!(id = %unique_id.short(), "Resolved as Conditional");
        return Ok(Some(ControllerReference::Conditional(record)));
    }
    if let Some(record) = store.function(unique_id).await? {
        return Ok(Some(ControllerReference::Function(record)));
    }
    if let Some(record) = store.input(unique_id).await? {
        return Ok(Some(ControllerReference::Input(record)));
    }
    if let Some(record) = store.display(unique_id).await? {
        return Ok(Some(ControllerReference::Display(record)));
    }
    if let Some(record) = store.math(unique_id).await? {
        return Ok(Some(ControllerReference::Math(record)));
    }
    if let Some(record) = store.pid(unique_id).await? {
        return Ok(Some(ControllerReference::Pid(record)));
    }
    if let Some(record) = store.trigger(unique_id).await? {
        return Ok(Some(ControllerReference::Trigger(record)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vd_core::{ConditionalRecord, ControllerKind, InputRecord, PidRecord};
    use vd_store::MemoryStore;

    #[tokio::test]
    async fn test_resolves_single_kind() {
        let store = MemoryStore::new();
        let id = UniqueId::new();
        store.insert_input(InputRecord {
            unique_id: id.clone(),
            name: "DHT22".into(),
            device: "dht22".into(),
            is_activated: true,
        });

        let resolved = resolve_controller(&store, &id).await.unwrap().unwrap();
        assert_eq!(resolved.kind(), ControllerKind::Input);
    }

    #[tokio::test]
    async fn test_priority_order_is_tie_break() {
        // An id present under two kinds violates the uniqueness invariant;
        // the defined behavior is that the earlier kind wins.
        let store = MemoryStore::new();
        let id = UniqueId::new();
        store.insert_input(InputRecord {
            unique_id: id.clone(),
            name: "DHT22".into(),
            device: "dht22".into(),
            is_activated: true,
        });
        store.insert_conditional(ConditionalRecord {
            unique_id: id.clone(),
            name: "Temp check".into(),
        });

        let resolved = resolve_controller(&store, &id).await.unwrap().unwrap();
        assert_eq!(resolved.kind(), ControllerKind::Conditional);
    }

    #[tokio::test]
    async fn test_no_match_is_none() {
        let store = MemoryStore::new();
        store.insert_pid(PidRecord {
            unique_id: UniqueId::new(),
            name: "Heater PID".into(),
            is_activated: true,
        });

        let resolved = resolve_controller(&store, &UniqueId::new()).await.unwrap();
        assert!(resolved.is_none());
    }
}
