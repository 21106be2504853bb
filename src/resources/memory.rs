use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::{OwnedStore, Resource};
use crate::error::StoreError;

struct Rows<R> {
    next_id: i64,
    rows: Vec<R>,
}

/// In-process [`OwnedStore`] behind `APP_STORE=memory` and the tests.
pub struct MemoryOwnedStore<R> {
    inner: Mutex<Rows<R>>,
}

impl<R> Default for MemoryOwnedStore<R> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Rows {
                next_id: 1,
                rows: Vec::new(),
            }),
        }
    }
}

#[async_trait]
impl<R: Resource> OwnedStore<R> for MemoryOwnedStore<R> {
    async fn create(&self, owner: i64, input: &R::Create) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .rows
            .push(R::from_create(id, owner, input, OffsetDateTime::now_utc()));
        Ok(id)
    }

    async fn list(&self, owner: i64, limit: i64) -> Result<Vec<R>, StoreError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<R> = inner
            .rows
            .iter()
            .filter(|r| r.owner() == owner)
            .cloned()
            .collect();
        rows.sort_by_key(|r| std::cmp::Reverse(r.id()));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn get(&self, owner: i64, id: i64) -> Result<Option<R>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .iter()
            .find(|r| r.id() == id && r.owner() == owner)
            .cloned())
    }

    async fn update(&self, owner: i64, id: i64, patch: &R::Patch) -> Result<bool, StoreError> {
        if R::patch_values(patch).is_empty() {
            return Ok(false);
        }
        let mut inner = self.inner.lock().await;
        match inner
            .rows
            .iter_mut()
            .find(|r| r.id() == id && r.owner() == owner)
        {
            Some(row) => {
                row.apply_patch(patch, OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, owner: i64, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.rows.len();
        inner.rows.retain(|r| !(r.id() == id && r.owner() == owner));
        Ok(inner.rows.len() != before)
    }
}
