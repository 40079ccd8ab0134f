use crate::data::relationship::{Relationship, RelationshipUpsertData};
use crate::data::Storage;
use crate::resp::problem::Problem;
use crate::route::{parse_body, Body};
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const RESET_MESSAGE: &str = "All students in the class have been reset.";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub message: String,
}

/// List relationships touching any student of a class
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Relationships with an initiator or target in the class", body = Vec<Relationship>),
    )
)]
#[get("/classes/<id>/relationships")]
#[tracing::instrument(skip(db))]
pub async fn class_relationships(
    id: i64,
    db: &State<Storage>,
) -> Result<Json<Vec<Relationship>>, Problem> {
    Ok(Json(db.list_class_relationships(id).await?))
}

/// Create or update the relationship for an ordered student pair
#[utoipa::path(
    request_body = RelationshipUpsertData,
    responses(
        (status = 200, description = "The created or updated relationship", body = Relationship),
        (status = 400, description = "Missing fields or unknown students", body = Problem),
    )
)]
#[post("/relationships", data = "<data>")]
#[tracing::instrument(skip(db))]
pub async fn relationship_upsert(
    data: Body,
    db: &State<Storage>,
) -> Result<Json<Relationship>, Problem> {
    let data: RelationshipUpsertData = parse_body(data)?;
    Ok(Json(db.upsert_relationship(data).await?))
}

/// Remove every student of a class together with their relationships
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Class was reset", body = ResetResponse),
    )
)]
#[post("/classes/<id>/reset")]
#[tracing::instrument(skip(db))]
pub async fn class_reset(id: i64, db: &State<Storage>) -> Result<Json<ResetResponse>, Problem> {
    db.reset_class(id).await?;
    Ok(Json(ResetResponse {
        message: RESET_MESSAGE.to_string(),
    }))
}

///////////////////////
//       TESTS
///////////////////////
