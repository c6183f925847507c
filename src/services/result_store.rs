//! Bounded in-memory store for asynchronously delivered approval results.
//!
//! Results live for the process lifetime only. The store never exceeds its
//! capacity: on overflow the oldest-*inserted* key is evicted. Overwriting
//! an existing key does not renew its eviction priority; eviction order is
//! strictly insertion order, not last-write order.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{ApiError, Result};
use crate::models::ApprovalResult;

/// Maximum number of retained results
pub const MAX_RESULTS: usize = 100;

struct StoreInner {
    map: HashMap<String, ApprovalResult>,
    /// Keys in insertion order; front is next to evict
    order: VecDeque<String>,
}

/// Inbound result store, shared across request handlers
#[derive(Clone)]
pub struct ResultStore {
    inner: Arc<Mutex<StoreInner>>,
    capacity: usize,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_RESULTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            })),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a pushed result, stamped with the receipt time.
    ///
    /// Requires `documentId` and `decision`; anything else in the payload is
    /// preserved verbatim. A repeat delivery for the same document overwrites
    /// the stored entry in place without changing size accounting or its
    /// position in the eviction queue. Insert and evict happen under one
    /// lock guard, so no partial state is ever observable.
    pub fn receive(&self, payload: Map<String, Value>) -> Result<ApprovalResult> {
        let document_id = required_string_field(&payload, "documentId")?;
        let decision = required_string_field(&payload, "decision")?;

        let now = Utc::now();
        let mut extra = payload;
        extra.remove("documentId");
        extra.remove("decision");
        let comment = take_string_field(&mut extra, "comment");
        let approval_url = take_string_field(&mut extra, "approvalUrl");

        let result = ApprovalResult {
            document_id: document_id.clone(),
            decision,
            comment,
            approval_url,
            received_at: now.to_rfc3339(),
            received_timestamp: now.timestamp_millis(),
            extra,
        };

        let mut inner = self.lock()?;
        if inner.map.insert(document_id.clone(), result.clone()).is_none() {
            inner.order.push_back(document_id.clone());
        }

        while inner.map.len() > self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.map.remove(&oldest);
            debug!(document_id = %oldest, "evicted oldest stored result");
        }

        info!(
            document_id = %document_id,
            decision = %result.decision,
            total = inner.map.len(),
            "approval result stored"
        );

        Ok(result)
    }

    /// All stored results, most recently received first.
    pub fn query(&self) -> Result<Vec<ApprovalResult>> {
        let inner = self.lock()?;
        let mut results: Vec<ApprovalResult> = inner.map.values().cloned().collect();
        results.sort_by(|a, b| b.received_timestamp.cmp(&a.received_timestamp));
        Ok(results)
    }

    /// Remove a stored result. Deleting an absent key is a client error.
    pub fn delete(&self, document_id: &str) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.map.remove(document_id).is_none() {
            return Err(ApiError::NotFound(format!(
                "no stored result for document {}",
                document_id
            )));
        }
        inner.order.retain(|key| key != document_id);

        info!(document_id = %document_id, "stored result deleted");
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.map.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.map.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| ApiError::Internal("result store lock poisoned".to_string()))
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

fn required_string_field(payload: &Map<String, Value>, field: &str) -> Result<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation(format!("missing required field: {}", field)))
}

fn take_string_field(payload: &mut Map<String, Value>, field: &str) -> Option<String> {
    let value = payload.remove(field)?;
    match value {
        Value::String(s) => Some(s),
        // Preserve non-string values where they were
        other => {
            payload.insert(field.to_string(), other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(document_id: &str, decision: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("documentId".to_string(), json!(document_id));
        map.insert("decision".to_string(), json!(decision));
        map
    }

    #[test]
    fn receive_requires_document_id_and_decision() {
        let store = ResultStore::new();

        let mut missing_decision = Map::new();
        missing_decision.insert("documentId".to_string(), json!("D1"));
        let err = store.receive(missing_decision).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("decision")));

        let mut missing_id = Map::new();
        missing_id.insert("decision".to_string(), json!("approve"));
        let err = store.receive(missing_id).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("documentId")));

        // Rejected payloads must not mutate the store
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn second_receive_overwrites_without_growing() {
        let store = ResultStore::new();
        store.receive(payload("D1", "approve")).unwrap();
        store.receive(payload("D1", "reject")).unwrap();

        let results = store.query().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, "D1");
        assert_eq!(results[0].decision, "reject");
    }

    #[test]
    fn extra_fields_survive_storage() {
        let store = ResultStore::new();
        let mut map = payload("D1", "approve");
        map.insert("comment".to_string(), json!("looks good"));
        map.insert("approvalUrl".to_string(), json!("https://a/b"));
        map.insert("custom".to_string(), json!({"k": 1}));
        store.receive(map).unwrap();

        let results = store.query().unwrap();
        assert_eq!(results[0].comment.as_deref(), Some("looks good"));
        assert_eq!(results[0].approval_url.as_deref(), Some("https://a/b"));
        assert_eq!(results[0].extra["custom"], json!({"k": 1}));
    }

    #[test]
    fn capacity_overflow_evicts_oldest_inserted() {
        let store = ResultStore::with_capacity(100);
        for i in 1..=101 {
            store.receive(payload(&format!("D{}", i), "approve")).unwrap();
        }

        assert_eq!(store.len().unwrap(), 100);
        let results = store.query().unwrap();
        assert!(!results.iter().any(|r| r.document_id == "D1"));
        for i in 2..=101 {
            let id = format!("D{}", i);
            assert!(results.iter().any(|r| r.document_id == id), "{} missing", id);
        }
    }

    #[test]
    fn overwrite_does_not_renew_eviction_priority() {
        let store = ResultStore::with_capacity(2);
        store.receive(payload("D1", "approve")).unwrap();
        store.receive(payload("D2", "approve")).unwrap();
        // Updating D1 must not move it to the back of the eviction queue
        store.receive(payload("D1", "reject")).unwrap();
        store.receive(payload("D3", "approve")).unwrap();

        let results = store.query().unwrap();
        assert_eq!(results.len(), 2);
        assert!(!results.iter().any(|r| r.document_id == "D1"));
        assert!(results.iter().any(|r| r.document_id == "D2"));
        assert!(results.iter().any(|r| r.document_id == "D3"));
    }

    #[test]
    fn query_orders_newest_first() {
        let store = ResultStore::new();
        for id in ["D1", "D2", "D3"] {
            store.receive(payload(id, "approve")).unwrap();
            // Distinct millisecond stamps
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let results = store.query().unwrap();
        assert_eq!(results[0].document_id, "D3");
        assert_eq!(results[2].document_id, "D1");
    }

    #[test]
    fn delete_absent_key_is_not_found_and_leaves_size_unchanged() {
        let store = ResultStore::new();
        store.receive(payload("D1", "approve")).unwrap();

        let err = store.delete("missing").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(store.len().unwrap(), 1);

        store.delete("D1").unwrap();
        assert!(store.is_empty().unwrap());
    }
}
