//! Ownership-scoped CRUD shared by every user-owned resource.
//!
//! A resource describes its table and how its request payloads map onto
//! columns; [`OwnedStore`], [`ResourceService`] and the handlers in
//! [`handlers`] are written once against that description. Every read and
//! write is filtered by both the row id and the owner, so a row owned by
//! someone else behaves exactly like a missing row.

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use validator::Validate;

pub mod handlers;
pub mod memory;
pub mod repo;
pub mod service;

pub use memory::MemoryOwnedStore;
pub use repo::{OwnedStore, PgOwnedRepo};
pub use service::ResourceService;

/// A value bound into an INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(Option<String>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Date(Option<Date>),
    DateTime(Option<PrimitiveDateTime>),
}

/// `column = value` pair.
pub type Assignment = (&'static str, ColumnValue);

pub trait Resource:
    for<'r> FromRow<'r, PgRow> + Serialize + Clone + Send + Sync + Unpin + 'static
{
    /// Body of `POST /<resource>`.
    type Create: DeserializeOwned + Validate + Send + Sync + 'static;
    /// Body of `PATCH /<resource>/:id`; absent fields are left untouched.
    type Patch: DeserializeOwned + Validate + Send + Sync + 'static;

    const TABLE: &'static str;
    /// Select list, always including `id` and `user_id`.
    const COLUMNS: &'static str;
    /// Used in messages: "<noun> not found".
    const NOUN: &'static str;
    /// Upper bound on rows returned by list.
    const LIST_LIMIT: i64;
    /// Whether the table carries an `updated_at` column to refresh on update.
    const HAS_UPDATED_AT: bool;

    /// Every insertable column, including the ones left NULL.
    fn insert_values(input: &Self::Create) -> Vec<Assignment>;
    /// Only the columns present in the patch.
    fn patch_values(patch: &Self::Patch) -> Vec<Assignment>;

    fn id(&self) -> i64;
    fn owner(&self) -> i64;

    /// Row as the store would return it right after insert.
    fn from_create(id: i64, owner: i64, input: &Self::Create, now: OffsetDateTime) -> Self;
    fn apply_patch(&mut self, patch: &Self::Patch, now: OffsetDateTime);
}
