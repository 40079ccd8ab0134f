use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod db;

pub const NAME_MAX_CHARS: usize = 100;

/// A class as returned by the API. `student_count` is computed on read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub student_count: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClassCreateData {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ClassUpdateData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
