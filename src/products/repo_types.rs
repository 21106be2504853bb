use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use super::dto::{CreateProductRequest, UpdateProductRequest};
use crate::resources::{Assignment, ColumnValue, Resource};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub price: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Resource for Product {
    type Create = CreateProductRequest;
    type Patch = UpdateProductRequest;

    const TABLE: &'static str = "products";
    const COLUMNS: &'static str = "id, user_id, name, price, created_at, updated_at";
    const NOUN: &'static str = "product";
    const LIST_LIMIT: i64 = 50;
    const HAS_UPDATED_AT: bool = true;

    fn insert_values(input: &CreateProductRequest) -> Vec<Assignment> {
        vec![
            ("name", ColumnValue::Text(Some(input.name.clone()))),
            ("price", ColumnValue::BigInt(Some(input.price))),
        ]
    }

    fn patch_values(patch: &UpdateProductRequest) -> Vec<Assignment> {
        let mut sets = Vec::new();
        if let Some(name) = &patch.name {
            sets.push(("name", ColumnValue::Text(Some(name.clone()))));
        }
        if let Some(price) = patch.price {
            sets.push(("price", ColumnValue::BigInt(Some(price))));
        }
        sets
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn owner(&self) -> i64 {
        self.user_id
    }

    fn from_create(id: i64, owner: i64, input: &CreateProductRequest, now: OffsetDateTime) -> Self {
        Self {
            id,
            user_id: owner,
            name: input.name.clone(),
            price: input.price,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &UpdateProductRequest, now: OffsetDateTime) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        self.updated_at = now;
    }
}
