use serde::Deserialize;
use time::{Date, PrimitiveDateTime};
use validator::Validate;

use crate::timefmt;

/// Body for both create and patch: every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PlaceInput {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub link: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub link_type: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "timefmt::option_date")]
    pub go_at: Option<Date>,
    #[serde(default, with = "timefmt::option_datetime")]
    pub go_at_time: Option<PrimitiveDateTime>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub status: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
}
