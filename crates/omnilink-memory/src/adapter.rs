// In-memory storage adapter — HashMap-based store implementing the core
// Adapter trait.
//
// Stores records in `HashMap<String, Vec<serde_json::Value>>` keyed by model
// name, thread-safe via `tokio::sync::RwLock`. Uniqueness constraints are
// enforced at insert time under the write lock, so concurrent creates on the
// same key cannot both succeed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use omnilink_core::db::adapter::{
    Adapter, AdapterResult, Connector, FindManyQuery, Operator, WhereClause,
};
use omnilink_core::db::model_names;
use omnilink_core::error::OmnilinkError;

/// Type alias for the in-memory store.
type Store = HashMap<String, Vec<serde_json::Value>>;

/// In-memory storage adapter.
///
/// All data lives in a `HashMap` behind an `Arc<RwLock<...>>`; data is lost
/// when the adapter is dropped. `MemoryAdapter::new` registers the
/// `(providerId, externalUserId)` uniqueness constraint for identity links.
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    store: Arc<RwLock<Store>>,
    /// model -> list of unique field tuples
    unique_indexes: HashMap<String, Vec<Vec<String>>>,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdapter {
    /// Create a new empty adapter with the standard uniqueness constraints.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            unique_indexes: HashMap::new(),
        }
        .with_unique_index(
            model_names::IDENTITY_LINK,
            &["providerId", "externalUserId"],
        )
        .with_unique_index(model_names::ACCOUNT, &["email"])
    }

    /// Register a uniqueness constraint on `fields` for `model`.
    pub fn with_unique_index(mut self, model: &str, fields: &[&str]) -> Self {
        self.unique_indexes
            .entry(model.to_string())
            .or_default()
            .push(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Get a snapshot of all data (for debugging/testing).
    pub async fn snapshot(&self) -> Store {
        self.store.read().await.clone()
    }

    /// Clear all data.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Record count for a specific model.
    pub async fn model_count(&self, model: &str) -> usize {
        self.store
            .read()
            .await
            .get(model)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    /// Whether `data` collides with an existing record on any unique index.
    fn violates_unique(
        &self,
        model: &str,
        records: &[serde_json::Value],
        data: &serde_json::Value,
    ) -> Option<String> {
        let indexes = self.unique_indexes.get(model)?;
        for fields in indexes {
            let collision = records.iter().any(|existing| {
                fields.iter().all(|f| {
                    let new_val = data.get(f);
                    new_val.is_some() && new_val == existing.get(f.as_str())
                })
            });
            if collision {
                return Some(format!("{} ({})", model, fields.join(", ")));
            }
        }
        None
    }
}

/// Check if a record matches a set of WHERE clauses.
fn matches_where(record: &serde_json::Value, clauses: &[WhereClause]) -> bool {
    if clauses.is_empty() {
        return true;
    }

    let mut result = true;
    let mut pending_or = false;

    for clause in clauses {
        let field_val = record
            .get(&clause.field)
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        let clause_match = match_operator(&field_val, &clause.value, &clause.operator);

        if pending_or {
            result = result || clause_match;
        } else {
            result = result && clause_match;
        }

        pending_or = matches!(clause.connector, Some(Connector::Or));
    }

    result
}

/// Match a single operator condition.
fn match_operator(
    field_val: &serde_json::Value,
    target: &serde_json::Value,
    op: &Operator,
) -> bool {
    match op {
        Operator::Eq => field_val == target,
        Operator::Ne => field_val != target,
        Operator::In => {
            if let serde_json::Value::Array(arr) = target {
                arr.contains(field_val)
            } else {
                false
            }
        }
        Operator::Contains => {
            let fs = field_val.as_str().unwrap_or("");
            let ts = target.as_str().unwrap_or("");
            fs.contains(ts)
        }
    }
}

/// Apply sort, pagination and field selection to matched records.
fn apply_query(mut records: Vec<serde_json::Value>, query: &FindManyQuery) -> Vec<serde_json::Value> {
    if let Some(ref sort) = query.sort_by {
        records.sort_by(|a, b| {
            let av = a.get(&sort.field).map(value_sort_key).unwrap_or_default();
            let bv = b.get(&sort.field).map(value_sort_key).unwrap_or_default();
            let cmp = av.cmp(&bv);
            match sort.direction {
                omnilink_core::db::adapter::SortDirection::Asc => cmp,
                omnilink_core::db::adapter::SortDirection::Desc => cmp.reverse(),
            }
        });
    }

    let offset = query.offset.unwrap_or(0).max(0) as usize;
    let records: Vec<_> = records.into_iter().skip(offset).collect();

    let records: Vec<_> = match query.limit {
        Some(limit) if limit >= 0 => records.into_iter().take(limit as usize).collect(),
        _ => records,
    };

    match &query.select {
        Some(fields) if !fields.is_empty() => records
            .iter()
            .map(|record| {
                let mut out = serde_json::Map::new();
                for f in fields {
                    if let Some(v) = record.get(f) {
                        out.insert(f.clone(), v.clone());
                    }
                }
                serde_json::Value::Object(out)
            })
            .collect(),
        _ => records,
    }
}

/// Sortable key for a JSON value (strings sort lexically, numbers by value).
fn value_sort_key(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Number(n) => format!("{:>24}", n),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn create(
        &self,
        model: &str,
        data: serde_json::Value,
    ) -> AdapterResult<serde_json::Value> {
        let mut store = self.store.write().await;
        let records = store.entry(model.to_string()).or_default();

        if let Some(index) = self.violates_unique(model, records, &data) {
            return Err(OmnilinkError::Conflict(format!(
                "duplicate record for unique index {index}"
            )));
        }

        records.push(data.clone());
        Ok(data)
    }

    async fn find_one(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<Option<serde_json::Value>> {
        let store = self.store.read().await;
        Ok(store
            .get(model)
            .and_then(|records| records.iter().find(|r| matches_where(r, where_clauses)))
            .cloned())
    }

    async fn find_many(
        &self,
        model: &str,
        query: FindManyQuery,
    ) -> AdapterResult<Vec<serde_json::Value>> {
        let store = self.store.read().await;
        let matched: Vec<_> = store
            .get(model)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches_where(r, &query.where_clauses))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(apply_query(matched, &query))
    }

    async fn count(&self, model: &str, where_clauses: &[WhereClause]) -> AdapterResult<i64> {
        let store = self.store.read().await;
        Ok(store
            .get(model)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches_where(r, where_clauses))
                    .count() as i64
            })
            .unwrap_or(0))
    }

    async fn update(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        data: serde_json::Value,
    ) -> AdapterResult<Option<serde_json::Value>> {
        let mut store = self.store.write().await;
        let records = match store.get_mut(model) {
            Some(r) => r,
            None => return Ok(None),
        };

        for record in records.iter_mut() {
            if matches_where(record, where_clauses) {
                if let (Some(obj), Some(patch)) = (record.as_object_mut(), data.as_object()) {
                    for (k, v) in patch {
                        obj.insert(k.clone(), v.clone());
                    }
                }
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, model: &str, where_clauses: &[WhereClause]) -> AdapterResult<()> {
        let mut store = self.store.write().await;
        if let Some(records) = store.get_mut(model) {
            if let Some(pos) = records.iter().position(|r| matches_where(r, where_clauses)) {
                records.remove(pos);
            }
        }
        Ok(())
    }

    async fn delete_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<i64> {
        let mut store = self.store.write().await;
        let records = match store.get_mut(model) {
            Some(r) => r,
            None => return Ok(0),
        };
        let before = records.len();
        records.retain(|r| !matches_where(r, where_clauses));
        Ok((before - records.len()) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_find_one() {
        let adapter = MemoryAdapter::new();
        adapter
            .create("account", json!({"id": "a1", "email": "a@example.com"}))
            .await
            .unwrap();

        let found = adapter
            .find_one("account", &[WhereClause::eq("email", "a@example.com")])
            .await
            .unwrap();
        assert_eq!(found.unwrap()["id"], "a1");

        let missing = adapter
            .find_one("account", &[WhereClause::eq("email", "b@example.com")])
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicate_link() {
        let adapter = MemoryAdapter::new();
        let link = json!({"id": "l1", "providerId": "google", "externalUserId": "123", "userId": "u1"});
        adapter.create("identityLink", link).await.unwrap();

        let dup = json!({"id": "l2", "providerId": "google", "externalUserId": "123", "userId": "u2"});
        let err = adapter.create("identityLink", dup).await.unwrap_err();
        assert!(matches!(err, OmnilinkError::Conflict(_)));
        assert_eq!(adapter.model_count("identityLink").await, 1);
    }

    #[tokio::test]
    async fn test_same_provider_different_uid_is_allowed() {
        let adapter = MemoryAdapter::new();
        adapter
            .create("identityLink", json!({"providerId": "google", "externalUserId": "123"}))
            .await
            .unwrap();
        adapter
            .create("identityLink", json!({"providerId": "google", "externalUserId": "456"}))
            .await
            .unwrap();
        assert_eq!(adapter.model_count("identityLink").await, 2);
    }

    #[tokio::test]
    async fn test_find_many_with_filter_and_limit() {
        let adapter = MemoryAdapter::new();
        for i in 0..5 {
            adapter
                .create("session", json!({"id": format!("s{i}"), "userId": "u1"}))
                .await
                .unwrap();
        }
        adapter
            .create("session", json!({"id": "other", "userId": "u2"}))
            .await
            .unwrap();

        let query = FindManyQuery {
            where_clauses: vec![WhereClause::eq("userId", "u1")],
            limit: Some(3),
            ..Default::default()
        };
        let found = adapter.find_many("session", query).await.unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|r| r["userId"] == "u1"));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let adapter = MemoryAdapter::new();
        adapter
            .create("account", json!({"id": "a1", "email": "a@example.com", "name": "A"}))
            .await
            .unwrap();

        let updated = adapter
            .update(
                "account",
                &[WhereClause::eq("id", "a1")],
                json!({"name": "B"}),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["name"], "B");
        assert_eq!(updated["email"], "a@example.com");
    }

    #[tokio::test]
    async fn test_delete_many() {
        let adapter = MemoryAdapter::new();
        for i in 0..3 {
            adapter
                .create("session", json!({"id": format!("s{i}"), "userId": "u1"}))
                .await
                .unwrap();
        }
        let deleted = adapter
            .delete_many("session", &[WhereClause::eq("userId", "u1")])
            .await
            .unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(adapter.model_count("session").await, 0);
    }

    #[tokio::test]
    async fn test_count() {
        let adapter = MemoryAdapter::new();
        adapter
            .create("identityLink", json!({"providerId": "github", "externalUserId": "1", "userId": "u1"}))
            .await
            .unwrap();
        let count = adapter
            .count("identityLink", &[WhereClause::eq("userId", "u1")])
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_matches_where_or_connector() {
        let record = json!({"providerId": "github"});
        let clauses = vec![
            WhereClause::eq("providerId", "google").or(),
            WhereClause::eq("providerId", "github"),
        ];
        assert!(matches_where(&record, &clauses));
    }
}
