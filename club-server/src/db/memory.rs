//! 内存存储
//!
//! 每张表一个 `RwLock<Vec<T>>`，按插入顺序保存。单表操作在锁内完成，
//! 跨表没有事务。

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Record, RepoError, RepoResult, Repository};

/// In-memory table for one record type
pub struct MemoryTable<T: Record> {
    rows: RwLock<Vec<T>>,
}

impl<T: Record> MemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// First unique key of `record` already held by another row
    fn conflicting_key(rows: &[T], record: &T) -> Option<&'static str> {
        let keys = record.unique_keys();
        rows.iter()
            .filter(|row| row.id() != record.id())
            .find_map(|row| {
                let taken = row.unique_keys();
                keys.iter()
                    .find(|(field, value)| taken.iter().any(|(f, v)| f == field && v == value))
                    .map(|(field, _)| *field)
            })
    }
}

impl<T: Record> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryTable<T> {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<T>> {
        Ok(self.rows.read().iter().find(|r| r.id() == id).cloned())
    }

    async fn find_many(&self, filter: &T::Filter) -> RepoResult<Vec<T>> {
        // Newest insertion first, then a stable sort keeps that order for equal timestamps
        let mut found: Vec<T> = self
            .rows
            .read()
            .iter()
            .rev()
            .filter(|r| r.matches(filter))
            .cloned()
            .collect();
        found.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        Ok(found)
    }

    async fn insert(&self, record: T) -> RepoResult<T> {
        let mut rows = self.rows.write();
        if rows.iter().any(|r| r.id() == record.id()) {
            return Err(RepoError::Duplicate("id".to_string()));
        }
        if let Some(field) = Self::conflicting_key(&rows, &record) {
            return Err(RepoError::Duplicate(field.to_string()));
        }
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, record: T) -> RepoResult<T> {
        let mut rows = self.rows.write();
        let idx = rows
            .iter()
            .position(|r| r.id() == record.id())
            .ok_or_else(|| RepoError::NotFound(format!("{} {}", T::RESOURCE, record.id())))?;
        if let Some(field) = Self::conflicting_key(&rows, &record) {
            return Err(RepoError::Duplicate(field.to_string()));
        }
        rows[idx] = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let mut rows = self.rows.write();
        let idx = rows
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| RepoError::NotFound(format!("{} {}", T::RESOURCE, id)))?;
        rows.remove(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{BillingCycle, SubscriptionPlan};

    fn plan(id: &str, code: &str, created_at: i64) -> SubscriptionPlan {
        SubscriptionPlan {
            id: id.to_string(),
            name: "Dues".to_string(),
            code: code.to_string(),
            amount: 50.0,
            currency: "GHS".to_string(),
            billing_cycle: BillingCycle::Monthly,
            active: true,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_newest_first() {
        let table = MemoryTable::<SubscriptionPlan>::new();
        table.insert(plan("p1", "A", 1)).await.unwrap();
        table.insert(plan("p2", "B", 3)).await.unwrap();
        table.insert(plan("p3", "C", 3)).await.unwrap();

        let ids: Vec<String> = table
            .find_many(&())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["p3", "p2", "p1"]);
    }

    #[tokio::test]
    async fn test_unique_key_violation() {
        let table = MemoryTable::<SubscriptionPlan>::new();
        table.insert(plan("p1", "DUES", 1)).await.unwrap();

        let err = table.insert(plan("p2", "DUES", 2)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(ref f) if f == "code"));

        let err = table.insert(plan("p1", "OTHER", 2)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(ref f) if f == "id"));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_own_keys_and_rejects_others() {
        let table = MemoryTable::<SubscriptionPlan>::new();
        table.insert(plan("p1", "A", 1)).await.unwrap();
        table.insert(plan("p2", "B", 2)).await.unwrap();

        let mut p1 = plan("p1", "A", 1);
        p1.amount = 75.0;
        assert_eq!(table.update(p1).await.unwrap().amount, 75.0);

        let err = table.update(plan("p1", "B", 1)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let err = table.update(plan("p9", "Z", 1)).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_leaves_table_unchanged() {
        let table = MemoryTable::<SubscriptionPlan>::new();
        table.insert(plan("p1", "A", 1)).await.unwrap();

        assert!(matches!(
            table.delete("nope").await,
            Err(RepoError::NotFound(_))
        ));
        assert_eq!(table.len(), 1);

        table.delete("p1").await.unwrap();
        assert!(table.is_empty());
        assert!(table.find_by_id("p1").await.unwrap().is_none());
    }
}
