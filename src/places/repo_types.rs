use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use super::dto::{CreateCategoryRequest, PlaceInput, UpdateCategoryRequest};
use crate::{
    resources::{Assignment, ColumnValue, Resource},
    timefmt,
};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Place {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub link: Option<String>,
    pub link_type: Option<i32>,
    pub description: Option<String>,
    #[serde(with = "timefmt::option_date")]
    pub go_at: Option<Date>,
    #[serde(with = "timefmt::option_datetime")]
    pub go_at_time: Option<PrimitiveDateTime>,
    pub status: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn place_columns(input: &PlaceInput) -> [Assignment; 7] {
    [
        ("name", ColumnValue::Text(input.name.clone())),
        ("link", ColumnValue::Text(input.link.clone())),
        ("link_type", ColumnValue::Int(input.link_type)),
        ("description", ColumnValue::Text(input.description.clone())),
        ("go_at", ColumnValue::Date(input.go_at)),
        ("go_at_time", ColumnValue::DateTime(input.go_at_time)),
        ("status", ColumnValue::Int(input.status)),
    ]
}

fn is_set(value: &ColumnValue) -> bool {
    match value {
        ColumnValue::Text(v) => v.is_some(),
        ColumnValue::Int(v) => v.is_some(),
        ColumnValue::BigInt(v) => v.is_some(),
        ColumnValue::Date(v) => v.is_some(),
        ColumnValue::DateTime(v) => v.is_some(),
    }
}

impl Resource for Place {
    type Create = PlaceInput;
    type Patch = PlaceInput;

    const TABLE: &'static str = "place";
    const COLUMNS: &'static str = "id, user_id, name, link, link_type, description, go_at, \
                                   go_at_time, status, created_at, updated_at";
    const NOUN: &'static str = "place";
    const LIST_LIMIT: i64 = 100;
    const HAS_UPDATED_AT: bool = true;

    fn insert_values(input: &PlaceInput) -> Vec<Assignment> {
        place_columns(input).into()
    }

    fn patch_values(patch: &PlaceInput) -> Vec<Assignment> {
        place_columns(patch)
            .into_iter()
            .filter(|(_, v)| is_set(v))
            .collect()
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn owner(&self) -> i64 {
        self.user_id
    }

    fn from_create(id: i64, owner: i64, input: &PlaceInput, now: OffsetDateTime) -> Self {
        Self {
            id,
            user_id: owner,
            name: input.name.clone(),
            link: input.link.clone(),
            link_type: input.link_type,
            description: input.description.clone(),
            go_at: input.go_at,
            go_at_time: input.go_at_time,
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &PlaceInput, now: OffsetDateTime) {
        if patch.name.is_some() {
            self.name = patch.name.clone();
        }
        if patch.link.is_some() {
            self.link = patch.link.clone();
        }
        if patch.link_type.is_some() {
            self.link_type = patch.link_type;
        }
        if patch.description.is_some() {
            self.description = patch.description.clone();
        }
        if patch.go_at.is_some() {
            self.go_at = patch.go_at;
        }
        if patch.go_at_time.is_some() {
            self.go_at_time = patch.go_at_time;
        }
        if patch.status.is_some() {
            self.status = patch.status;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlaceCategory {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

impl Resource for PlaceCategory {
    type Create = CreateCategoryRequest;
    type Patch = UpdateCategoryRequest;

    const TABLE: &'static str = "place_category";
    const COLUMNS: &'static str = "id, user_id, name";
    const NOUN: &'static str = "category";
    const LIST_LIMIT: i64 = 100;
    const HAS_UPDATED_AT: bool = false;

    fn insert_values(input: &CreateCategoryRequest) -> Vec<Assignment> {
        vec![("name", ColumnValue::Text(Some(input.name.clone())))]
    }

    fn patch_values(patch: &UpdateCategoryRequest) -> Vec<Assignment> {
        patch
            .name
            .iter()
            .map(|name| ("name", ColumnValue::Text(Some(name.clone()))))
            .collect()
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn owner(&self) -> i64 {
        self.user_id
    }

    fn from_create(id: i64, owner: i64, input: &CreateCategoryRequest, _now: OffsetDateTime) -> Self {
        Self {
            id,
            user_id: owner,
            name: input.name.clone(),
        }
    }

    fn apply_patch(&mut self, patch: &UpdateCategoryRequest, _now: OffsetDateTime) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn patch_values_skip_absent_fields() {
        let patch = PlaceInput {
            status: Some(2),
            go_at: Some(date!(2024 - 06 - 01)),
            ..Default::default()
        };
        let cols: Vec<&str> = Place::patch_values(&patch).iter().map(|(c, _)| *c).collect();
        assert_eq!(cols, vec!["go_at", "status"]);
        assert!(Place::patch_values(&PlaceInput::default()).is_empty());
    }

    #[test]
    fn place_serializes_wire_formats() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let input: PlaceInput = serde_json::from_str(
            r#"{"name":"Cafe","go_at":"2024-06-01","go_at_time":"2024-06-01T19:30:00"}"#,
        )
        .unwrap();
        let place = Place::from_create(3, 9, &input, now);
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["go_at"], "2024-06-01");
        assert_eq!(json["go_at_time"], "2024-06-01 19:30:00");
        assert_eq!(json["link"], serde_json::Value::Null);
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
        assert_eq!(json["user_id"], 9);
    }

    #[test]
    fn category_patch_without_name_is_empty() {
        assert!(PlaceCategory::patch_values(&UpdateCategoryRequest::default()).is_empty());
    }
}
