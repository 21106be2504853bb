use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(range(min = 0, max = 2_000_000_000))]
    pub price: i64,
}

/// Absent and `null` fields are both left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[serde(default)]
    #[validate(length(min = 2, max = 120))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = 2_000_000_000))]
    pub price: Option<i64>,
}
