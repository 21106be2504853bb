use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{ColumnValue, Resource};
use crate::error::StoreError;

/// Capability set every owned resource gets. All calls are scoped by `owner`.
#[async_trait]
pub trait OwnedStore<R: Resource>: Send + Sync {
    async fn create(&self, owner: i64, input: &R::Create) -> Result<i64, StoreError>;
    /// Caller's rows, newest id first, at most `limit`.
    async fn list(&self, owner: i64, limit: i64) -> Result<Vec<R>, StoreError>;
    async fn get(&self, owner: i64, id: i64) -> Result<Option<R>, StoreError>;
    /// Returns whether a row matched `id` and `owner`.
    async fn update(&self, owner: i64, id: i64, patch: &R::Patch) -> Result<bool, StoreError>;
    /// Returns whether a row matched `id` and `owner`.
    async fn delete(&self, owner: i64, id: i64) -> Result<bool, StoreError>;
}

pub struct PgOwnedRepo<R> {
    db: PgPool,
    _resource: PhantomData<fn() -> R>,
}

impl<R> PgOwnedRepo<R> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _resource: PhantomData,
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: ColumnValue) {
    match value {
        ColumnValue::Text(v) => qb.push_bind(v),
        ColumnValue::Int(v) => qb.push_bind(v),
        ColumnValue::BigInt(v) => qb.push_bind(v),
        ColumnValue::Date(v) => qb.push_bind(v),
        ColumnValue::DateTime(v) => qb.push_bind(v),
    };
}

/// `INSERT INTO <table> (user_id, ...) VALUES ($1, ...) RETURNING id`
pub(crate) fn insert_query<R: Resource>(owner: i64, input: &R::Create) -> QueryBuilder<'static, Postgres> {
    let values = R::insert_values(input);
    let mut qb = QueryBuilder::new(format!("INSERT INTO {} (user_id", R::TABLE));
    for (column, _) in &values {
        qb.push(", ").push(column);
    }
    qb.push(") VALUES (").push_bind(owner);
    for (_, value) in values {
        qb.push(", ");
        push_value(&mut qb, value);
    }
    qb.push(") RETURNING id");
    qb
}

/// Single-statement partial update; `None` when the patch names no column.
pub(crate) fn update_query<R: Resource>(
    owner: i64,
    id: i64,
    patch: &R::Patch,
) -> Option<QueryBuilder<'static, Postgres>> {
    let values = R::patch_values(patch);
    if values.is_empty() {
        return None;
    }
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", R::TABLE));
    for (i, (column, value)) in values.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(column).push(" = ");
        push_value(&mut qb, value);
    }
    if R::HAS_UPDATED_AT {
        qb.push(", updated_at = now()");
    }
    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(owner);
    Some(qb)
}

#[async_trait]
impl<R: Resource> OwnedStore<R> for PgOwnedRepo<R> {
    async fn create(&self, owner: i64, input: &R::Create) -> Result<i64, StoreError> {
        let mut qb = insert_query::<R>(owner, input);
        let id = qb.build_query_scalar::<i64>().fetch_one(&self.db).await?;
        Ok(id)
    }

    async fn list(&self, owner: i64, limit: i64) -> Result<Vec<R>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 ORDER BY id DESC LIMIT $2",
            R::COLUMNS,
            R::TABLE
        );
        let rows = sqlx::query_as::<_, R>(&sql)
            .bind(owner)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn get(&self, owner: i64, id: i64) -> Result<Option<R>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1 AND user_id = $2",
            R::COLUMNS,
            R::TABLE
        );
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn update(&self, owner: i64, id: i64, patch: &R::Patch) -> Result<bool, StoreError> {
        let Some(mut qb) = update_query::<R>(owner, id, patch) else {
            return Ok(false);
        };
        let res = qb.build().execute(&self.db).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, owner: i64, id: i64) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", R::TABLE);
        let res = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
