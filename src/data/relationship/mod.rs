use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod db;

pub const TYPE_MAX_CHARS: usize = 20;

/// A directed, typed link from `student_id` to `friend_id`.
///
/// At most one exists per ordered pair; `(a, b)` and `(b, a)` are separate records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Relationship {
    pub id: i64,
    pub student_id: i64,
    pub friend_id: i64,
    #[schema(example = "friend")]
    pub relationship_type: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RelationshipUpsertData {
    pub student_id: i64,
    pub friend_id: i64,
    #[schema(example = "friend")]
    pub relationship_type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub students: usize,
    pub relationships: usize,
}
